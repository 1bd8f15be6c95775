//! 发布编排 - 编排层
//!
//! 严格串行：一个会话按输入顺序逐个发布产品。
//! 任何单个产品的异常都在记录边界被捕获并转换为
//! "跳过本条、恢复导航、继续下一条"，绝不终止整个运行

use anyhow::{bail, Result};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::product::ProductRecord;
use crate::orchestrator::preparation;
use crate::services::navigator::{NavOutcome, Navigator, PageTarget};
use crate::services::product_form::{ProductForm, WpProductForm};
use crate::services::report_writer::ReportWriter;
use crate::session::SessionDriver;
use crate::workflow::publish_ctx::PublishAttempt;
use crate::workflow::publish_flow::{PublishFlow, RecordOutcome, RunStats};

/// 应用主结构
pub struct App {
    config: Config,
    records: Vec<ProductRecord>,
    report: ReportWriter,
}

impl App {
    /// 初始化应用：报告文件、准备流程（含人工确认）
    ///
    /// 返回 Ok(None) 表示用户取消，正常退出
    pub async fn initialize(mut config: Config) -> Result<Option<Self>> {
        let report = ReportWriter::new(config.report_file.clone());
        report.init()?;

        log_startup(&config);

        let Some(records) = preparation::prepare(&mut config)? else {
            return Ok(None);
        };

        Ok(Some(Self {
            config,
            records,
            report,
        }))
    }

    /// 运行发布主逻辑
    ///
    /// 会话在所有退出路径上都会被释放（正常完成、记录内异常、顶层错误）
    pub async fn run(self) -> Result<()> {
        let App {
            mut config,
            records,
            report,
        } = self;

        let session = SessionDriver::establish(&config).await?;
        // 后续页面目标统一使用规范化后的站点地址
        config.site_url = session.site_url().to_string();

        let run_result = run_records(&session, &config, &records, &report).await;
        let shutdown_result = session.shutdown().await;

        let stats = run_result?;
        shutdown_result?;

        print_final_stats(&stats, &config);
        if let Err(e) = report.finish(&stats) {
            warn!("写入报告统计失败: {}", e);
        }

        Ok(())
    }
}

/// 登录后进入产品管理页，然后逐条发布
async fn run_records(
    session: &SessionDriver,
    config: &Config,
    records: &[ProductRecord],
    report: &ReportWriter,
) -> Result<RunStats> {
    // 先导航到产品管理页面，确保完全进入后台
    info!("导航到WordPress产品管理页面...");
    let navigator = Navigator::new(config.page_wait_secs, config.settle_ms);
    let product_list = PageTarget::product_list(&config.site_url);
    if navigator.goto(&product_list, session.dom()).await == NavOutcome::Failed {
        bail!("无法进入产品管理页面，会话可能未正确建立");
    }

    log_records_loaded(records.len());

    let flow = PublishFlow::new();
    let form = WpProductForm::new(session.dom(), config);
    let mut stats = RunStats {
        total: records.len(),
        ..Default::default()
    };

    for (idx, record) in records.iter().enumerate() {
        let record_index = idx + 1;
        log_record_start(record_index, records.len(), record);

        // 详细日志（如果启用）
        if config.verbose_logging {
            log_record_detail(record);
        }

        let outcome = process_record(&flow, &form, record, record_index, report).await;
        stats.absorb(&outcome);
    }

    info!("成功上传 {} 个产品", stats.uploaded);

    Ok(stats)
}

/// 发布单个产品，并在记录边界完成异常捕获、报告与恢复导航
pub async fn process_record(
    flow: &PublishFlow,
    form: &dyn ProductForm,
    record: &ProductRecord,
    record_index: usize,
    report: &ReportWriter,
) -> RecordOutcome {
    let mut attempt = PublishAttempt::new(record_index, record.label());

    match flow.run(form, record, &mut attempt).await {
        Ok(outcome) => {
            match &outcome {
                RecordOutcome::Published { confirmed: false } => {
                    report_line(report, &attempt, "发布结果未确认");
                }
                RecordOutcome::Failed { .. } => {
                    let reason = attempt.last_error.clone().unwrap_or_else(|| "步骤失败".to_string());
                    report_line(report, &attempt, &reason);
                }
                _ => {}
            }
            if needs_advance(&outcome) {
                advance(form, record_index).await;
            }
            outcome
        }
        Err(e) => {
            error!(
                "[产品 {}] ❌ 处理过程中发生错误: {}",
                record_index, e
            );
            error!(
                "[产品 {}] 出错时正在处理的产品: {} | 正在执行的操作: {}",
                record_index, attempt.record_label, attempt.current_step
            );
            info!("[产品 {}] 跳过当前产品，继续下一个", record_index);

            report_line(report, &attempt, &format!("未预期的错误: {}", e));
            // 确保即使出错也能回到添加产品页面
            advance(form, record_index).await;

            RecordOutcome::Failed {
                step: attempt.current_step,
            }
        }
    }
}

/// 跳过的记录从未离开已知页面，无需恢复导航
fn needs_advance(outcome: &RecordOutcome) -> bool {
    !matches!(
        outcome,
        RecordOutcome::SkippedExistingImage | RecordOutcome::SkippedNoTranslation
    )
}

/// 无条件回到添加新产品页面，为下一个产品重置上下文；失败只告警
async fn advance(form: &dyn ProductForm, record_index: usize) {
    info!(
        "[产品 {}] 导航到添加新产品页面准备上传下一个产品...",
        record_index
    );
    match form.open_entry_page().await {
        Ok(NavOutcome::Arrived) => {}
        Ok(NavOutcome::Failed) => {
            warn!(
                "[产品 {}] 无法导航回添加产品页面，尝试继续...",
                record_index
            );
        }
        Err(e) => {
            warn!(
                "[产品 {}] 恢复导航时出错: {}，尝试继续...",
                record_index, e
            );
        }
    }
}

/// 报告写入失败不影响运行
fn report_line(report: &ReportWriter, attempt: &PublishAttempt, reason: &str) {
    if let Err(e) = report.record_line(
        &attempt.record_label,
        &attempt.current_step.to_string(),
        reason,
    ) {
        warn!("写入报告失败: {}", e);
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - WordPress 产品上传模式");
    info!("📄 产品表: {}", config.excel_file);
    info!("🗂️ 映射表: {}", config.mapping_file);
    info!("{}", "=".repeat(60));
}

fn log_records_loaded(total: usize) {
    info!("✓ 共 {} 个产品待处理", total);
    info!("💡 将按输入顺序逐个发布\n");
}

fn log_record_start(index: usize, total: usize, record: &ProductRecord) {
    info!("\n{}", "─".repeat(60));
    info!("📦 处理产品 {}/{}: {}", index, total, record.label());
    info!("{}", "─".repeat(60));
}

fn log_record_detail(record: &ProductRecord) {
    info!("  Excel行号: {}", record.row);
    info!("  品牌: {} | 型号: {}", record.brand, record.model);
    info!(
        "  价格: {}",
        record.price.as_deref().unwrap_or("(空)")
    );
    info!("  图片路径: {}", record.image_path.display());
}

fn print_final_stats(stats: &RunStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已上传: {}/{}", stats.uploaded, stats.total);
    info!("❓ 其中未确认: {}", stats.unconfirmed);
    info!(
        "⏭️ 跳过: {} (已有图片: {}，无英文名: {})",
        stats.skipped(),
        stats.skipped_image,
        stats.skipped_translation
    );
    info!("❌ 失败: {}", stats.failed);
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", config.report_file);
}
