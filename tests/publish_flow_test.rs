//! 发布状态机的无浏览器测试
//!
//! 用脚本化的假 `ProductForm` 驱动真实的 `PublishFlow` 与记录边界
//! 处理逻辑，覆盖跳过守卫、故障收容、统计口径等性质

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use wp_product_uploader::models::product::ProductRecord;
use wp_product_uploader::orchestrator::process_record;
use wp_product_uploader::services::field_setter::SetOutcome;
use wp_product_uploader::services::navigator::NavOutcome;
use wp_product_uploader::services::product_form::{ProductForm, PublishSignal, SubmitOutcome};
use wp_product_uploader::services::report_writer::ReportWriter;
use wp_product_uploader::services::taxonomy::{resolution_plan, ChecklistEntry, ResolutionPlan, ResolveOutcome};
use wp_product_uploader::workflow::publish_ctx::{PublishAttempt, Step};
use wp_product_uploader::workflow::publish_flow::{PublishFlow, RecordOutcome, RunStats};

#[derive(Default)]
struct FakeState {
    navigations: usize,
    title: Option<String>,
    price: Option<String>,
    categories: Vec<String>,
    brand_entries: Vec<ChecklistEntry>,
    brands_created: Vec<String>,
    submits: usize,
}

/// 脚本化的假产品表单
struct FakeForm {
    state: Mutex<FakeState>,
    /// 第一次 set_price 抛出异常（模拟记录内故障）
    fail_price_once: AtomicBool,
    /// await_publishable 的返回值
    publish_ready: bool,
    /// verify_published 的观测信号
    signal: PublishSignal,
}

impl FakeForm {
    fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            fail_price_once: AtomicBool::new(false),
            publish_ready: true,
            signal: PublishSignal::Banner,
        }
    }

    fn with_existing_brands(brands: &[&str]) -> Self {
        let form = Self::new();
        {
            let mut state = form.state.lock().unwrap();
            state.brand_entries = brands
                .iter()
                .enumerate()
                .map(|(index, text)| ChecklistEntry {
                    index,
                    text: text.to_string(),
                    checked: false,
                })
                .collect();
        }
        form
    }

    fn navigations(&self) -> usize {
        self.state.lock().unwrap().navigations
    }

    fn submits(&self) -> usize {
        self.state.lock().unwrap().submits
    }

    fn last_title(&self) -> Option<String> {
        self.state.lock().unwrap().title.clone()
    }

    fn brands_created(&self) -> Vec<String> {
        self.state.lock().unwrap().brands_created.clone()
    }
}

#[async_trait]
impl ProductForm for FakeForm {
    async fn open_entry_page(&self) -> Result<NavOutcome> {
        self.state.lock().unwrap().navigations += 1;
        Ok(NavOutcome::Arrived)
    }

    async fn set_title(&self, text: &str) -> Result<SetOutcome> {
        self.state.lock().unwrap().title = Some(text.to_string());
        Ok(SetOutcome::Set)
    }

    async fn set_price(&self, text: &str) -> Result<SetOutcome> {
        if self.fail_price_once.swap(false, Ordering::SeqCst) {
            anyhow::bail!("模拟的页面异常");
        }
        self.state.lock().unwrap().price = Some(text.to_string());
        Ok(SetOutcome::Set)
    }

    async fn resolve_category(&self, label: &str) -> Result<ResolveOutcome> {
        self.state.lock().unwrap().categories.push(label.to_string());
        Ok(ResolveOutcome::Selected)
    }

    async fn resolve_brand(&self, label: &str) -> Result<ResolveOutcome> {
        let mut state = self.state.lock().unwrap();
        match resolution_plan(&state.brand_entries, label) {
            ResolutionPlan::SkipEmpty => Ok(ResolveOutcome::SkippedEmpty),
            ResolutionPlan::AlreadySelected(_) => Ok(ResolveOutcome::Selected),
            ResolutionPlan::Select(index) => {
                state.brand_entries[index].checked = true;
                Ok(ResolveOutcome::Selected)
            }
            ResolutionPlan::Create => {
                let index = state.brand_entries.len();
                state.brand_entries.push(ChecklistEntry {
                    index,
                    text: label.to_string(),
                    checked: true,
                });
                state.brands_created.push(label.to_string());
                Ok(ResolveOutcome::CreatedSelected)
            }
        }
    }

    async fn read_title(&self) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().title.clone())
    }

    async fn read_price(&self) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().price.clone())
    }

    async fn category_selected(&self) -> Result<bool> {
        Ok(!self.state.lock().unwrap().categories.is_empty())
    }

    async fn await_publishable(&self) -> Result<bool> {
        Ok(self.publish_ready)
    }

    async fn submit(&self) -> Result<SubmitOutcome> {
        self.state.lock().unwrap().submits += 1;
        Ok(SubmitOutcome::Clicked { method: 1 })
    }

    async fn verify_published(&self) -> Result<PublishSignal> {
        Ok(self.signal)
    }
}

fn record(
    brand: &str,
    model: &str,
    source: &str,
    target: Option<&str>,
    price: Option<&str>,
    has_image: bool,
) -> ProductRecord {
    ProductRecord {
        brand: brand.to_string(),
        model: model.to_string(),
        source_name: source.to_string(),
        target_name: target.map(|s| s.to_string()),
        price: price.map(|s| s.to_string()),
        image_path: PathBuf::from(format!("product_images/{}-{}-{}.jpg", brand, model, source)),
        has_image,
        row: 2,
    }
}

fn report_in(dir: &tempfile::TempDir) -> ReportWriter {
    let path = dir.path().join("report.txt");
    let writer = ReportWriter::new(path.to_string_lossy().to_string());
    writer.init().unwrap();
    writer
}

#[tokio::test]
async fn test_record_with_image_never_navigates_or_submits() {
    let form = FakeForm::new();
    let flow = PublishFlow::new();
    let mut attempt = PublishAttempt::new(1, "水壶".to_string());

    let rec = record("Acme", "X1", "水壶", Some("Kettle"), Some("25"), true);
    let outcome = flow.run(&form, &rec, &mut attempt).await.unwrap();

    assert_eq!(outcome, RecordOutcome::SkippedExistingImage);
    assert_eq!(form.navigations(), 0);
    assert_eq!(form.submits(), 0);
}

#[tokio::test]
async fn test_record_without_translation_is_skipped() {
    let form = FakeForm::new();
    let flow = PublishFlow::new();
    let mut attempt = PublishAttempt::new(1, "茶杯".to_string());

    let rec = record("Acme", "X2", "茶杯", Some(""), None, false);
    let outcome = flow.run(&form, &rec, &mut attempt).await.unwrap();

    assert_eq!(outcome, RecordOutcome::SkippedNoTranslation);
    assert_eq!(form.navigations(), 0);
    assert_eq!(form.submits(), 0);
}

#[tokio::test]
async fn test_valid_record_composes_title_and_publishes() {
    let form = FakeForm::new();
    let flow = PublishFlow::new();
    let mut attempt = PublishAttempt::new(1, "水壶".to_string());

    let rec = record("Acme", "X1", "水壶", Some("Widget"), Some("25.5"), false);
    let outcome = flow.run(&form, &rec, &mut attempt).await.unwrap();

    assert_eq!(outcome, RecordOutcome::Published { confirmed: true });
    assert_eq!(form.last_title().as_deref(), Some("Acme X1 Widget"));
    assert_eq!(form.submits(), 1);
}

#[tokio::test]
async fn test_brand_find_or_create_is_idempotent() {
    let form = FakeForm::with_existing_brands(&["Premium Widgets"]);
    let flow = PublishFlow::new();

    // 第一条：品牌不存在 => 新建
    let rec = record("Acme", "X1", "水壶", Some("Kettle"), None, false);
    let mut attempt = PublishAttempt::new(1, rec.label());
    flow.run(&form, &rec, &mut attempt).await.unwrap();
    assert_eq!(form.brands_created(), vec!["Acme".to_string()]);

    // 第二条同品牌：列表中已存在 => 不再新建
    let rec2 = record("Acme", "X2", "茶杯", Some("Cup"), None, false);
    let mut attempt2 = PublishAttempt::new(2, rec2.label());
    flow.run(&form, &rec2, &mut attempt2).await.unwrap();
    assert_eq!(form.brands_created().len(), 1);
}

#[tokio::test]
async fn test_case_insensitive_brand_match_avoids_create() {
    let form = FakeForm::with_existing_brands(&["Premium Widgets"]);
    let flow = PublishFlow::new();

    // "widget" 小写且只是子串，仍应命中已有条目
    let rec = record("widget", "X1", "水壶", Some("Kettle"), None, false);
    let mut attempt = PublishAttempt::new(1, rec.label());
    let outcome = flow.run(&form, &rec, &mut attempt).await.unwrap();

    assert_eq!(outcome, RecordOutcome::Published { confirmed: true });
    assert!(form.brands_created().is_empty());
}

#[tokio::test]
async fn test_await_timeout_still_submits_and_counts_unconfirmed() {
    let mut form = FakeForm::new();
    form.publish_ready = false;
    form.signal = PublishSignal::Unconfirmed;

    let flow = PublishFlow::new();
    let rec = record("Acme", "X1", "水壶", Some("Kettle"), Some("25"), false);
    let mut attempt = PublishAttempt::new(1, rec.label());
    let outcome = flow.run(&form, &rec, &mut attempt).await.unwrap();

    // 等待超限不阻止提交；未确认仍计入已上传
    assert_eq!(outcome, RecordOutcome::Published { confirmed: false });
    assert_eq!(form.submits(), 1);

    let mut stats = RunStats::default();
    stats.absorb(&outcome);
    assert_eq!(stats.uploaded, 1);
    assert_eq!(stats.unconfirmed, 1);
}

#[tokio::test]
async fn test_fault_at_one_record_does_not_stop_the_next() {
    let dir = tempfile::tempdir().unwrap();
    let report = report_in(&dir);

    let form = FakeForm::new();
    form.fail_price_once.store(true, Ordering::SeqCst);
    let flow = PublishFlow::new();

    let rec1 = record("Acme", "X1", "水壶", Some("Kettle"), Some("25"), false);
    let rec2 = record("Acme", "X2", "茶杯", Some("Cup"), Some("9"), false);

    let outcome1 = process_record(&flow, &form, &rec1, 1, &report).await;
    let outcome2 = process_record(&flow, &form, &rec2, 2, &report).await;

    // 第一条在 SetPrice 状态被收容，并做了恢复导航
    assert_eq!(outcome1, RecordOutcome::Failed { step: Step::SetPrice });
    // 第二条从全新的导航开始并成功发布
    assert_eq!(outcome2, RecordOutcome::Published { confirmed: true });
    // 导航：记录1 进入 + 恢复，记录2 进入 + 前进 = 4
    assert_eq!(form.navigations(), 4);

    let content = std::fs::read_to_string(dir.path().join("report.txt")).unwrap();
    assert!(content.contains("未预期的错误"));
}

#[tokio::test]
async fn test_end_to_end_three_records_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let report = report_in(&dir);

    let form = FakeForm::with_existing_brands(&["OldBrand"]);
    let flow = PublishFlow::new();

    let records = vec![
        // 已有图片 => 跳过，且绝不导航
        record("Acme", "X1", "水壶", Some("Kettle"), Some("25"), true),
        // 没有英文名 => 跳过
        record("Acme", "X2", "茶杯", None, Some("9"), false),
        // 有效记录，品牌不在列表中 => 新建并选中
        record("NewBrand", "X3", "盘子", Some("Plate"), Some("12"), false),
    ];

    let mut stats = RunStats {
        total: records.len(),
        ..Default::default()
    };
    for (idx, rec) in records.iter().enumerate() {
        let outcome = process_record(&flow, &form, rec, idx + 1, &report).await;
        stats.absorb(&outcome);
    }

    assert_eq!(stats.uploaded, 1);
    assert_eq!(stats.skipped(), 2);
    assert_eq!(stats.skipped_image, 1);
    assert_eq!(stats.skipped_translation, 1);
    assert_eq!(stats.failed, 0);

    // 品牌走了新建分支
    assert_eq!(form.brands_created(), vec!["NewBrand".to_string()]);
    // 只有有效记录导航（进入 + 前进）
    assert_eq!(form.navigations(), 2);
    assert_eq!(form.submits(), 1);
    assert_eq!(form.last_title().as_deref(), Some("NewBrand X3 Plate"));
}
