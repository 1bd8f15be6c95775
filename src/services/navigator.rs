//! 页面导航服务 - 业务能力层
//!
//! 请求目标页面 → 等待就绪标记 → 校验地址 → 失败时刷新重试一次

use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::infrastructure::DomDriver;

/// 导航结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// 已到达目标页面
    Arrived,
    /// 重试后仍未到达
    Failed,
}

/// 导航目标页面
///
/// `ready_selector` 是只在该页面上出现的就绪标记元素；
/// `url_must_contain` 的所有片段都必须出现在到达后的地址中
#[derive(Debug, Clone)]
pub struct PageTarget {
    pub name: String,
    pub url: String,
    pub ready_selector: String,
    pub url_must_contain: Vec<String>,
}

impl PageTarget {
    /// WordPress 登录页
    pub fn login(site_url: &str) -> Self {
        Self {
            name: "登录页面".to_string(),
            url: format!("{}/wp-login.php", site_url),
            ready_selector: "#user_login".to_string(),
            url_must_contain: vec!["wp-login.php".to_string()],
        }
    }

    /// 产品管理列表页
    pub fn product_list(site_url: &str) -> Self {
        Self {
            name: "产品管理页面".to_string(),
            url: format!("{}/wp-admin/edit.php?post_type=product", site_url),
            ready_selector: "a.page-title-action".to_string(),
            url_must_contain: vec!["edit.php".to_string(), "post_type=product".to_string()],
        }
    }

    /// 添加新产品页
    pub fn new_product(site_url: &str) -> Self {
        Self {
            name: "添加新产品页面".to_string(),
            url: format!("{}/wp-admin/post-new.php?post_type=product", site_url),
            ready_selector: "#title".to_string(),
            url_must_contain: vec!["post-new.php".to_string(), "post_type=product".to_string()],
        }
    }

    /// 当前地址是否匹配目标页面
    pub fn url_matches(&self, current_url: &str) -> bool {
        self.url_must_contain
            .iter()
            .all(|fragment| current_url.contains(fragment))
    }
}

/// 页面导航服务
pub struct Navigator {
    /// 就绪标记的等待上限（秒）
    page_wait_secs: u64,
    /// 到达后的稳定等待（毫秒）
    settle_ms: u64,
    /// 最大尝试次数（首次请求 + 刷新重试）
    max_attempts: u32,
}

impl Navigator {
    pub fn new(page_wait_secs: u64, settle_ms: u64) -> Self {
        Self {
            page_wait_secs,
            settle_ms,
            max_attempts: 2,
        }
    }

    /// 导航到目标页面
    ///
    /// 内部错误一律转换为 Failed，由调用方决定严重程度
    pub async fn goto(&self, target: &PageTarget, dom: &DomDriver) -> NavOutcome {
        match self.try_goto(target, dom).await {
            Ok(true) => {
                info!("已确认进入{}", target.name);
                NavOutcome::Arrived
            }
            Ok(false) => {
                warn!("⚠️ 无法进入{}", target.name);
                NavOutcome::Failed
            }
            Err(e) => {
                warn!("⚠️ 导航到{}时出错: {}", target.name, e);
                NavOutcome::Failed
            }
        }
    }

    async fn try_goto(&self, target: &PageTarget, dom: &DomDriver) -> Result<bool> {
        dom.goto(&target.url).await?;

        for attempt in 1..=self.max_attempts {
            let ready = dom.wait_for(&target.ready_selector, self.page_wait_secs).await?;
            let current_url = dom.current_url().await?;
            let url_ok = target.url_matches(&current_url);

            if ready && url_ok {
                sleep(Duration::from_millis(self.settle_ms)).await;
                return Ok(true);
            }

            if attempt < self.max_attempts {
                if !url_ok {
                    warn!(
                        "当前URL: {}，不是{}，重新尝试...",
                        current_url, target.name
                    );
                    dom.goto(&target.url).await?;
                } else {
                    warn!("{}就绪标记未出现，尝试刷新页面...", target.name);
                    dom.reload().await?;
                }
                sleep(Duration::from_secs(3)).await;
            } else {
                debug!(
                    "导航失败: ready={}, url={} (目标: {})",
                    ready, current_url, target.url
                );
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_matches_requires_all_fragments() {
        let target = PageTarget::new_product("https://shop.example.com");
        assert!(target.url_matches(
            "https://shop.example.com/wp-admin/post-new.php?post_type=product"
        ));
        assert!(!target.url_matches("https://shop.example.com/wp-admin/post-new.php"));
        assert!(!target.url_matches("https://shop.example.com/wp-login.php"));
    }

    #[test]
    fn test_page_target_urls() {
        let site = "https://shop.example.com";
        assert_eq!(
            PageTarget::login(site).url,
            "https://shop.example.com/wp-login.php"
        );
        assert_eq!(
            PageTarget::product_list(site).url,
            "https://shop.example.com/wp-admin/edit.php?post_type=product"
        );
    }
}
