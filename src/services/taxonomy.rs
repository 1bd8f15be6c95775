//! 分类/品牌解析服务 - 业务能力层
//!
//! 在勾选列表中查找已有条目，不存在则新建后再选中（find-or-create，幂等）

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::infrastructure::{js_string, DomDriver};

/// 一个勾选列表式的分类维度（产品分类、品牌）
#[derive(Debug, Clone)]
pub struct TaxonomyTarget {
    pub name: String,
    /// 勾选列表容器
    pub checklist: String,
    /// "添加新条目"展开链接
    pub add_toggle: String,
    /// 新条目名称输入框
    pub add_input: String,
    /// 新条目提交按钮
    pub add_submit: String,
}

impl TaxonomyTarget {
    /// 产品分类
    pub fn category() -> Self {
        Self {
            name: "产品分类".to_string(),
            checklist: "#product_catchecklist".to_string(),
            add_toggle: "#product_cat-add-toggle".to_string(),
            add_input: "#newproduct_cat".to_string(),
            add_submit: "#product_cat-add-submit".to_string(),
        }
    }

    /// 品牌
    pub fn brand() -> Self {
        Self {
            name: "品牌".to_string(),
            checklist: "#product_brandchecklist".to_string(),
            add_toggle: "#product_brand-add-toggle".to_string(),
            add_input: "#newproduct_brand".to_string(),
            add_submit: "#product_brand-add-submit".to_string(),
        }
    }

    /// 列表条目（label 元素）的选择器
    fn items_selector(&self) -> String {
        format!("{} li label", self.checklist)
    }
}

/// 勾选列表中的一个条目
#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistEntry {
    pub index: usize,
    pub text: String,
    pub checked: bool,
}

/// 解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// 已有条目被选中（或本就处于选中状态）
    Selected,
    /// 新建条目并选中
    CreatedSelected,
    /// 名称为空，跳过解析（不算失败）
    SkippedEmpty,
    /// 解析失败（记录仍会继续发布，只是该分类未设置）
    Failed,
}

/// 纯匹配决策，便于脱离浏览器做单元测试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPlan {
    /// 名称为空，无需处理
    SkipEmpty,
    /// 匹配条目已被勾选
    AlreadySelected(usize),
    /// 匹配到未勾选的条目，需要勾选
    Select(usize),
    /// 没有匹配条目，需要新建
    Create,
}

/// 对列表条目做大小写不敏感的子串匹配，首个命中生效
///
/// 子串而非全等是有意的宽松：容忍已有条目带后缀限定词
pub fn resolution_plan(entries: &[ChecklistEntry], label: &str) -> ResolutionPlan {
    let label = label.trim();
    if label.is_empty() {
        return ResolutionPlan::SkipEmpty;
    }

    let needle = label.to_lowercase();
    for entry in entries {
        if entry.text.to_lowercase().contains(&needle) {
            return if entry.checked {
                ResolutionPlan::AlreadySelected(entry.index)
            } else {
                ResolutionPlan::Select(entry.index)
            };
        }
    }

    ResolutionPlan::Create
}

/// 分类解析服务
pub struct TaxonomyResolver {
    /// 勾选列表容器的等待上限（秒）
    element_wait_secs: u64,
    /// 新建条目后的稳定等待（毫秒）
    settle_ms: u64,
}

impl TaxonomyResolver {
    pub fn new(element_wait_secs: u64, settle_ms: u64) -> Self {
        Self {
            element_wait_secs,
            settle_ms,
        }
    }

    /// 查找或新建条目并确保选中
    ///
    /// 内部错误一律转换为 Failed；Failed 不会中止记录的发布
    pub async fn resolve(
        &self,
        target: &TaxonomyTarget,
        label: &str,
        dom: &DomDriver,
    ) -> ResolveOutcome {
        if label.trim().is_empty() {
            return ResolveOutcome::SkippedEmpty;
        }

        match self.try_resolve(target, label, dom).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("⚠️ 处理{}时出错: {}", target.name, e);
                warn!("继续上传产品，但{}可能未正确设置", target.name);
                ResolveOutcome::Failed
            }
        }
    }

    async fn try_resolve(
        &self,
        target: &TaxonomyTarget,
        label: &str,
        dom: &DomDriver,
    ) -> Result<ResolveOutcome> {
        dom.scroll_to_center(&target.checklist).await?;

        if !dom.wait_for(&target.checklist, self.element_wait_secs).await? {
            warn!("⚠️ {}面板未出现，跳过设置", target.name);
            return Ok(ResolveOutcome::Failed);
        }

        info!("查找{}: {}", target.name, label);
        let entries = self.list_entries(target, dom).await?;

        match resolution_plan(&entries, label) {
            ResolutionPlan::SkipEmpty => Ok(ResolveOutcome::SkippedEmpty),
            ResolutionPlan::AlreadySelected(index) => {
                info!("{}已被选中: {}", target.name, entries[index].text);
                Ok(ResolveOutcome::Selected)
            }
            ResolutionPlan::Select(index) => {
                info!("找到匹配的{}: {}", target.name, entries[index].text);
                self.check_entry(target, index, dom).await?;
                info!("已选择{}: {}", target.name, entries[index].text);
                Ok(ResolveOutcome::Selected)
            }
            ResolutionPlan::Create => {
                info!("未找到{}: {}，将添加新{}", target.name, label, target.name);
                self.create_and_select(target, label, dom).await
            }
        }
    }

    /// 新建条目，等待列表刷新，再次匹配并确保选中
    async fn create_and_select(
        &self,
        target: &TaxonomyTarget,
        label: &str,
        dom: &DomDriver,
    ) -> Result<ResolveOutcome> {
        if !dom.wait_for(&target.add_toggle, 5).await? {
            warn!("⚠️ 找不到添加新{}的入口", target.name);
            return Ok(ResolveOutcome::Failed);
        }
        dom.js_click(&target.add_toggle).await?;
        sleep(Duration::from_secs(1)).await;

        if !dom.wait_for(&target.add_input, 5).await? {
            warn!("⚠️ 新{}输入框未出现", target.name);
            return Ok(ResolveOutcome::Failed);
        }
        dom.type_into(&target.add_input, label).await?;
        dom.js_click(&target.add_submit).await?;

        // 等待远端创建条目并刷新列表
        sleep(Duration::from_millis(self.settle_ms)).await;

        let entries = self.list_entries(target, dom).await?;
        match resolution_plan(&entries, label) {
            ResolutionPlan::AlreadySelected(_) => {
                info!("已添加并选择新{}: {}", target.name, label);
                Ok(ResolveOutcome::CreatedSelected)
            }
            ResolutionPlan::Select(index) => {
                self.check_entry(target, index, dom).await?;
                info!("已添加并选择新{}: {}", target.name, label);
                Ok(ResolveOutcome::CreatedSelected)
            }
            _ => {
                warn!("⚠️ 新建{}后列表中仍未找到: {}", target.name, label);
                Ok(ResolveOutcome::Failed)
            }
        }
    }

    /// 枚举勾选列表的所有条目（文本与勾选状态）
    async fn list_entries(
        &self,
        target: &TaxonomyTarget,
        dom: &DomDriver,
    ) -> Result<Vec<ChecklistEntry>> {
        let js = format!(
            r#"Array.from(document.querySelectorAll({items})).map((label, index) => {{
                const box = label.querySelector("input[type='checkbox']");
                return {{
                    index: index,
                    text: label.textContent.trim(),
                    checked: box ? box.checked : false,
                }};
            }})"#,
            items = js_string(&target.items_selector())
        );
        dom.eval_as(js).await
    }

    /// 勾选第 index 个条目的复选框（脚本点击，绕过遮挡问题；已勾选则不动）
    async fn check_entry(&self, target: &TaxonomyTarget, index: usize, dom: &DomDriver) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const labels = document.querySelectorAll({items});
                const label = labels[{index}];
                if (!label) return false;
                const box = label.querySelector("input[type='checkbox']");
                if (!box) return false;
                if (!box.checked) box.click();
                return true;
            }})()"#,
            items = js_string(&target.items_selector()),
            index = index
        );
        let ok: bool = dom.eval_as(js).await?;
        if !ok {
            anyhow::bail!("{}列表条目 {} 不存在或没有复选框", target.name, index);
        }
        Ok(())
    }
}
