//! DOM 驱动器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"读写页面"的能力

use anyhow::{bail, Result};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

/// DOM 驱动器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval / 等待 / 读写 / 点击能力
/// - 不认识 Record / 发布流程
pub struct DomDriver {
    page: Page,
}

/// 将 Rust 字符串编码为 JS 字符串字面量
pub fn js_string(s: &str) -> String {
    JsonValue::String(s.to_string()).to_string()
}

impl DomDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于元素级交互）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 导航到指定 URL
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    /// 刷新当前页面
    pub async fn reload(&self) -> Result<()> {
        debug!("刷新当前页面");
        self.page.reload().await?;
        Ok(())
    }

    /// 获取当前页面地址
    pub async fn current_url(&self) -> Result<String> {
        let url = self.page.url().await?.unwrap_or_default();
        Ok(url)
    }

    /// 检查元素是否存在
    pub async fn exists(&self, selector: &str) -> Result<bool> {
        let js = format!("document.querySelector({}) !== null", js_string(selector));
        self.eval_as(js).await
    }

    /// 统计匹配元素的数量
    pub async fn count(&self, selector: &str) -> Result<usize> {
        let js = format!(
            "document.querySelectorAll({}).length",
            js_string(selector)
        );
        self.eval_as(js).await
    }

    /// 有界轮询等待元素出现
    ///
    /// 返回元素是否在超时前出现（超时不是错误）
    pub async fn wait_for(&self, selector: &str, timeout_secs: u64) -> Result<bool> {
        let deadline = Instant::now() + Duration::from_secs(timeout_secs);
        loop {
            if self.exists(selector).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                debug!("等待元素超时 ({}s): {}", timeout_secs, selector);
                return Ok(false);
            }
            sleep(Duration::from_millis(500)).await;
        }
    }

    /// 读取表单元素的 value（元素不存在返回 None）
    pub async fn read_value(&self, selector: &str) -> Result<Option<String>> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return null;
                return el.value !== undefined ? String(el.value) : el.textContent;
            }})()"#,
            sel = js_string(selector)
        );
        self.eval_as(js).await
    }

    /// 通过脚本直接写入 value 并派发 input/change 事件
    pub async fn set_value_js(&self, selector: &str, text: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.value = {val};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = js_string(selector),
            val = js_string(text)
        );
        let ok: bool = self.eval_as(js).await?;
        if !ok {
            bail!("元素不存在，无法写入: {}", selector);
        }
        Ok(())
    }

    /// 清空元素的 value
    pub async fn clear_value(&self, selector: &str) -> Result<()> {
        self.set_value_js(selector, "").await
    }

    /// 通过真实输入交互键入文本（聚焦后逐字键入）
    pub async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.focus().await?;
        self.clear_value(selector).await?;
        element.type_str(text).await?;
        Ok(())
    }

    /// 平滑滚动到元素（居中）；元素不存在时退回通用滚动
    pub async fn scroll_to_center(&self, selector: &str) -> Result<bool> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (el) {{
                    el.scrollIntoView({{ behavior: 'smooth', block: 'center' }});
                    return true;
                }}
                window.scrollBy(0, 500);
                return false;
            }})()"#,
            sel = js_string(selector)
        );
        self.eval_as(js).await
    }

    /// 元素级鼠标点击（真实交互，经由 CDP 派发鼠标事件）
    pub async fn mouse_click(&self, selector: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.scroll_into_view().await?;
        element.click().await?;
        Ok(())
    }

    /// 脚本点击（绕过遮挡/可见性问题）
    pub async fn js_click(&self, selector: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.click();
                return true;
            }})()"#,
            sel = js_string(selector)
        );
        let ok: bool = self.eval_as(js).await?;
        if !ok {
            bail!("元素不存在，无法点击: {}", selector);
        }
        Ok(())
    }

    /// 模拟指针移动加点击（派发合成鼠标事件序列）
    pub async fn pointer_click(&self, selector: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                const rect = el.getBoundingClientRect();
                const opts = {{
                    bubbles: true,
                    cancelable: true,
                    clientX: rect.left + rect.width / 2,
                    clientY: rect.top + rect.height / 2,
                }};
                for (const type of ['mouseover', 'mousemove', 'mousedown', 'mouseup', 'click']) {{
                    el.dispatchEvent(new MouseEvent(type, opts));
                }}
                return true;
            }})()"#,
            sel = js_string(selector)
        );
        let ok: bool = self.eval_as(js).await?;
        if !ok {
            bail!("元素不存在，无法模拟点击: {}", selector);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(js_string("#title"), r##""#title""##);
        assert_eq!(js_string(r#"a"b"#), r#""a\"b""#);
    }
}
