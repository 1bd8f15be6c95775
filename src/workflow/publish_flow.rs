//! 产品发布流程 - 流程层
//!
//! 核心职责：定义"一个产品"的完整发布状态机
//!
//! 状态顺序：
//! 入口守卫（有图片 / 无英文名 → 终态跳过）
//! → 导航 → 标题 → 价格 → 分类 → 品牌
//! → 最终检查 → 等待可发布 → 提交 → 确认 →（由编排层回到添加页）
//!
//! 每个原语返回 Outcome 枚举而不是异常；升级策略集中在一张
//! (状态, 结果) → 处置 的决策表里，而不是散落的错误处理

use anyhow::Result;
use tracing::{error, info, warn};

use crate::models::product::ProductRecord;
use crate::services::field_setter::SetOutcome;
use crate::services::navigator::NavOutcome;
use crate::services::product_form::{ProductForm, PublishSignal, SubmitOutcome};
use crate::services::taxonomy::ResolveOutcome;
use crate::workflow::publish_ctx::{PublishAttempt, Step};

/// 一步操作的归一化结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Ok,
    /// 软失败：该步未达成，但记录可以继续
    SoftFail,
    /// 硬失败：该步彻底失败
    HardFail,
}

/// 决策表给出的处置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    Proceed,
    WarnAndProceed,
    AbortRecord,
}

/// 失败处置决策表：导航失败和提交硬失败中止当前记录，其余一律告警后继续
pub fn step_policy(step: Step, result: StepResult) -> Escalation {
    match (step, result) {
        (_, StepResult::Ok) => Escalation::Proceed,
        (Step::Navigate, _) => Escalation::AbortRecord,
        (Step::Submit, StepResult::HardFail) => Escalation::AbortRecord,
        (_, _) => Escalation::WarnAndProceed,
    }
}

impl NavOutcome {
    pub fn step_result(&self) -> StepResult {
        match self {
            NavOutcome::Arrived => StepResult::Ok,
            NavOutcome::Failed => StepResult::HardFail,
        }
    }
}

impl SetOutcome {
    pub fn step_result(&self) -> StepResult {
        match self {
            SetOutcome::Set | SetOutcome::SetViaFallback => StepResult::Ok,
            SetOutcome::Failed => StepResult::SoftFail,
        }
    }
}

impl ResolveOutcome {
    pub fn step_result(&self) -> StepResult {
        match self {
            ResolveOutcome::Selected
            | ResolveOutcome::CreatedSelected
            | ResolveOutcome::SkippedEmpty => StepResult::Ok,
            ResolveOutcome::Failed => StepResult::SoftFail,
        }
    }
}

impl SubmitOutcome {
    pub fn step_result(&self) -> StepResult {
        match self {
            SubmitOutcome::Clicked { .. } => StepResult::Ok,
            SubmitOutcome::Failed => StepResult::HardFail,
        }
    }
}

/// 单个产品的发布结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// 已提交发布；confirmed 表示是否观测到成功信号
    Published { confirmed: bool },
    /// 本地已有图片，按约定跳过
    SkippedExistingImage,
    /// 映射表中没有英文名，跳过
    SkippedNoTranslation,
    /// 在某个状态中止
    Failed { step: Step },
}

/// 整个运行的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub uploaded: usize,
    /// 已提交但未观测到成功信号的数量（包含在 uploaded 内）
    pub unconfirmed: usize,
    pub skipped_image: usize,
    pub skipped_translation: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn absorb(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Published { confirmed } => {
                self.uploaded += 1;
                if !confirmed {
                    self.unconfirmed += 1;
                }
            }
            RecordOutcome::SkippedExistingImage => self.skipped_image += 1,
            RecordOutcome::SkippedNoTranslation => self.skipped_translation += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_image + self.skipped_translation
    }
}

/// 产品发布状态机
///
/// - 编排单个产品的完整发布步骤
/// - 不持有任何资源（page）
/// - 只依赖 `ProductForm` 接口，测试时可注入假实现
pub struct PublishFlow;

impl PublishFlow {
    pub fn new() -> Self {
        Self
    }

    /// 发布一个产品
    ///
    /// 返回 Err 表示该记录内发生了未归类的异常，由编排层在记录
    /// 边界捕获（记录标识 + `attempt.current_step`），绝不终止整个运行
    pub async fn run(
        &self,
        form: &dyn ProductForm,
        record: &ProductRecord,
        attempt: &mut PublishAttempt,
    ) -> Result<RecordOutcome> {
        // ========== 入口守卫：跳过不是错误 ==========
        if record.has_image {
            info!("跳过已有图片的产品: {}", record.source_name);
            return Ok(RecordOutcome::SkippedExistingImage);
        }
        let Some(target_name) = record.resolved_target_name().map(str::to_string) else {
            warn!(
                "⚠️ 产品 '{}' 没有对应的英文名，跳过上传",
                record.source_name
            );
            return Ok(RecordOutcome::SkippedNoTranslation);
        };

        info!(
            "正在上传产品: {} (原名: {})",
            target_name, record.source_name
        );

        attempt.enter(Step::Navigate);
        let nav = form.open_entry_page().await?;
        if let Some(outcome) = self.escalate(attempt, nav.step_result(), "无法进入添加新产品页面")
        {
            return Ok(outcome);
        }

        attempt.enter(Step::SetTitle);
        let title = record.display_title();
        let set = form.set_title(&title).await?;
        if let Some(outcome) = self.escalate(attempt, set.step_result(), "产品标题未能写入") {
            return Ok(outcome);
        }

        attempt.enter(Step::SetPrice);
        match record.price.as_deref() {
            Some(price) if !price.is_empty() => {
                let set = form.set_price(price).await?;
                if let Some(outcome) =
                    self.escalate(attempt, set.step_result(), "产品价格未能写入")
                {
                    return Ok(outcome);
                }
            }
            _ => info!("无法获取价格信息，将使用空值"),
        }

        attempt.enter(Step::ResolveCategory);
        let resolved = form.resolve_category(&target_name).await?;
        if let Some(outcome) =
            self.escalate(attempt, resolved.step_result(), "产品分类可能未正确设置")
        {
            return Ok(outcome);
        }

        attempt.enter(Step::ResolveBrand);
        let resolved = form.resolve_brand(&record.brand).await?;
        if let Some(outcome) = self.escalate(attempt, resolved.step_result(), "品牌可能未正确设置")
        {
            return Ok(outcome);
        }

        attempt.enter(Step::FinalCheck);
        self.final_check(form, record, &title, attempt).await?;

        attempt.enter(Step::AwaitPublishable);
        if !form.await_publishable().await? {
            // 超出等待上限不中止：点击尝试本身才是权威动作
            attempt.note_soft_failure("发布按钮未确认可点击");
        }

        attempt.enter(Step::Submit);
        let submitted = form.submit().await?;
        if let Some(outcome) =
            self.escalate(attempt, submitted.step_result(), "无法发布产品")
        {
            return Ok(outcome);
        }

        attempt.enter(Step::VerifyPublished);
        let signal = form.verify_published().await?;
        let confirmed = signal != PublishSignal::Unconfirmed;
        if !confirmed {
            warn!("⚠️ 无法确认发布是否成功，但将继续处理");
        }

        info!("产品已尝试上传: {}", target_name);
        Ok(RecordOutcome::Published { confirmed })
    }

    /// 最终检查：重读标题/价格并确认至少一个分类被勾选，
    /// 缺失项各做一次纠正性重试；检查本身从不阻止继续发布
    async fn final_check(
        &self,
        form: &dyn ProductForm,
        record: &ProductRecord,
        title: &str,
        attempt: &mut PublishAttempt,
    ) -> Result<()> {
        let current = form.read_title().await?.unwrap_or_default();
        if current.is_empty() {
            warn!("警告: 产品标题为空，尝试重新填写");
            attempt.note_retry();
            form.set_title(title).await?;
        }

        if let Some(price) = record.price.as_deref().filter(|p| !p.is_empty()) {
            let current = form.read_price().await?.unwrap_or_default();
            if current.is_empty() {
                warn!("警告: 产品价格为空，尝试重新填写");
                attempt.note_retry();
                form.set_price(price).await?;
            }
        }

        if !form.category_selected().await? {
            if let Some(target_name) = record.resolved_target_name() {
                warn!("警告: 产品分类未选择，尝试重新选择");
                attempt.note_retry();
                form.resolve_category(target_name).await?;
            }
        }

        Ok(())
    }

    /// 按决策表处置一步的结果；返回 Some 表示中止当前记录
    fn escalate(
        &self,
        attempt: &mut PublishAttempt,
        result: StepResult,
        detail: &str,
    ) -> Option<RecordOutcome> {
        match step_policy(attempt.current_step, result) {
            Escalation::Proceed => None,
            Escalation::WarnAndProceed => {
                warn!("⚠️ {} {}", attempt, detail);
                attempt.note_soft_failure(detail);
                None
            }
            Escalation::AbortRecord => {
                error!("❌ {} {}", attempt, detail);
                Some(RecordOutcome::Failed {
                    step: attempt.current_step,
                })
            }
        }
    }
}

impl Default for PublishFlow {
    fn default() -> Self {
        Self::new()
    }
}
