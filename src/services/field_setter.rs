//! 表单字段写入服务 - 业务能力层
//!
//! 按序尝试多种定位策略，写入后读回确认，最后退路是脚本直接赋值

use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::infrastructure::{js_string, DomDriver};

/// 元素定位策略，按声明顺序尝试
#[derive(Debug, Clone)]
pub enum Locator {
    /// 直接 CSS 选择器
    Css(String),
    /// 按 label 文本包含查找关联的输入框
    LabelContains(String),
    /// 在容器面板内查找输入框
    WithinPanel { panel: String, inner: String },
}

/// 字段写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// 主定位策略命中并确认写入
    Set,
    /// 备选策略命中并确认写入
    SetViaFallback,
    /// 所有策略均未能定位或确认
    Failed,
}

/// 一个可写入的表单字段：名称加有序定位策略列表
#[derive(Debug, Clone)]
pub struct FieldTarget {
    pub name: String,
    pub locators: Vec<Locator>,
}

impl FieldTarget {
    /// 产品标题字段
    pub fn title() -> Self {
        Self {
            name: "产品标题".to_string(),
            locators: vec![Locator::Css("#title".to_string())],
        }
    }

    /// 常规售价字段
    pub fn regular_price() -> Self {
        Self {
            name: "产品价格".to_string(),
            locators: vec![
                Locator::Css("#_regular_price".to_string()),
                Locator::LabelContains("常规售价".to_string()),
                Locator::LabelContains("Regular price".to_string()),
                Locator::WithinPanel {
                    panel: "#product_data".to_string(),
                    inner: "input[name='_regular_price']".to_string(),
                },
            ],
        }
    }
}

/// 表单字段写入服务
pub struct FieldSetter {
    /// 元素等待上限（秒）
    element_wait_secs: u64,
}

impl FieldSetter {
    pub fn new(element_wait_secs: u64) -> Self {
        Self { element_wait_secs }
    }

    /// 写入字段值
    ///
    /// 内部错误一律转换为 Failed，由调用方决定严重程度
    pub async fn set(&self, target: &FieldTarget, text: &str, dom: &DomDriver) -> SetOutcome {
        match self.try_set(target, text, dom).await {
            Ok(Some(0)) => {
                info!("已填写{}: {}", target.name, text);
                SetOutcome::Set
            }
            Ok(Some(strategy)) => {
                info!("已通过备选策略 {} 填写{}: {}", strategy + 1, target.name, text);
                SetOutcome::SetViaFallback
            }
            Ok(None) => {
                warn!("⚠️ 无法填写{}，所有定位策略均失败", target.name);
                SetOutcome::Failed
            }
            Err(e) => {
                warn!("⚠️ 填写{}时出错: {}", target.name, e);
                SetOutcome::Failed
            }
        }
    }

    /// 读回字段当前值（任何策略命中即读取；全部失败返回 None）
    pub async fn read(&self, target: &FieldTarget, dom: &DomDriver) -> Option<String> {
        for locator in &target.locators {
            match self.resolve_locator(locator, dom).await {
                Ok(Some(selector)) => match dom.read_value(&selector).await {
                    Ok(value) => return value,
                    Err(e) => {
                        debug!("读取{}失败: {}", target.name, e);
                        return None;
                    }
                },
                Ok(None) => continue,
                Err(e) => {
                    debug!("定位{}失败: {}", target.name, e);
                    continue;
                }
            }
        }
        None
    }

    /// 返回命中的策略序号（0 为主策略），全部失败返回 None
    async fn try_set(
        &self,
        target: &FieldTarget,
        text: &str,
        dom: &DomDriver,
    ) -> Result<Option<usize>> {
        // 主策略允许有界等待元素出现，备选策略只做即时探测
        if let Some(Locator::Css(selector)) = target.locators.first() {
            dom.wait_for(selector, self.element_wait_secs).await?;
        }

        for (index, locator) in target.locators.iter().enumerate() {
            let Some(selector) = self.resolve_locator(locator, dom).await? else {
                continue;
            };

            dom.scroll_to_center(&selector).await?;
            sleep(Duration::from_millis(300)).await;

            if self.write_and_confirm(&selector, text, dom).await? {
                return Ok(Some(index));
            }
            debug!(
                "策略 {} 定位到 {} 但写入未确认，尝试下一策略",
                index + 1,
                selector
            );
        }

        Ok(None)
    }

    /// 清空、键入、读回确认；读回为空时用脚本赋值再试一次
    async fn write_and_confirm(&self, selector: &str, text: &str, dom: &DomDriver) -> Result<bool> {
        dom.type_into(selector, text).await?;

        let value = dom.read_value(selector).await?.unwrap_or_default();
        if !value.is_empty() || text.is_empty() {
            return Ok(true);
        }

        // 最后退路：脚本直接赋值
        debug!("读回为空，通过脚本直接赋值: {}", selector);
        dom.set_value_js(selector, text).await?;
        let value = dom.read_value(selector).await?.unwrap_or_default();
        Ok(!value.is_empty())
    }

    /// 把定位策略解析为具体的 CSS 选择器（元素不存在返回 None）
    async fn resolve_locator(&self, locator: &Locator, dom: &DomDriver) -> Result<Option<String>> {
        match locator {
            Locator::Css(selector) => {
                if dom.exists(selector).await? {
                    Ok(Some(selector.clone()))
                } else {
                    Ok(None)
                }
            }
            Locator::LabelContains(needle) => {
                let js = format!(
                    r#"(() => {{
                        const labels = Array.from(document.querySelectorAll('label'));
                        const label = labels.find(l => l.textContent.includes({needle}));
                        if (!label) return null;
                        if (label.htmlFor) return '#' + CSS.escape(label.htmlFor);
                        const input = label.querySelector('input, textarea');
                        if (!input) return null;
                        if (!input.id) input.id = 'wpu_field_' + Math.random().toString(36).slice(2);
                        return '#' + CSS.escape(input.id);
                    }})()"#,
                    needle = js_string(needle)
                );
                dom.eval_as(js).await
            }
            Locator::WithinPanel { panel, inner } => {
                let js = format!(
                    r#"(() => {{
                        const panel = document.querySelector({panel});
                        if (!panel) return null;
                        const input = panel.querySelector({inner});
                        if (!input) return null;
                        if (!input.id) input.id = 'wpu_field_' + Math.random().toString(36).slice(2);
                        return '#' + CSS.escape(input.id);
                    }})()"#,
                    panel = js_string(panel),
                    inner = js_string(inner)
                );
                dom.eval_as(js).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_field_locator_order() {
        let target = FieldTarget::regular_price();
        assert!(matches!(&target.locators[0], Locator::Css(s) if s == "#_regular_price"));
        assert!(matches!(&target.locators[1], Locator::LabelContains(_)));
        assert!(matches!(
            target.locators.last(),
            Some(Locator::WithinPanel { .. })
        ));
    }
}
