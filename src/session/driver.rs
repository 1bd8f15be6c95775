//! 浏览器会话驱动 - 会话层
//!
//! 独占持有浏览器连接与登录态；无论运行正常结束、部分失败还是
//! 顶层出错，会话资源都必须且只会被释放一次（shutdown 消耗 self）

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::SessionError;
use crate::infrastructure::DomDriver;
use crate::services::navigator::PageTarget;

/// 规范化站点地址：补全协议（本地地址用 http，其余用 https），
/// 去掉末尾的 /wp-admin 及其后的一切
pub fn normalize_site_url(raw: &str) -> String {
    let mut url = raw.trim().trim_end_matches('/').to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{}", url);
        } else {
            url = format!("https://{}", url);
        }
    }

    if let Some(stripped) = url.strip_suffix("/wp-admin") {
        url = stripped.to_string();
    } else if let Some(pos) = url.find("/wp-admin/") {
        url.truncate(pos);
    }

    url
}

/// 已认证的浏览器会话
pub struct SessionDriver {
    browser: Browser,
    dom: DomDriver,
    site_url: String,
    /// 浏览器是否由本程序启动（启动的才在退出时关闭）
    owned: bool,
}

impl SessionDriver {
    /// 建立会话：启动/连接浏览器并完成登录
    ///
    /// 登录失败时浏览器在返回前释放；该错误是会话级致命错误
    pub async fn establish(config: &Config) -> Result<Self> {
        let site_url = normalize_site_url(&config.site_url);
        info!("使用的WordPress网址: {}", site_url);

        let (browser, page, owned) = match config.browser_debug_port {
            Some(port) => {
                let (browser, page) = browser::connect_to_browser_and_page(port, &site_url)
                    .await
                    .map_err(|e| SessionError::Connect {
                        port,
                        reason: e.to_string(),
                    })?;
                (browser, page, false)
            }
            None => {
                let (browser, page) =
                    browser::launch_browser(config.headless, config.chrome_path.as_deref())
                        .await
                        .map_err(|e| SessionError::Launch {
                            reason: e.to_string(),
                        })?;
                (browser, page, true)
            }
        };

        let driver = Self {
            browser,
            dom: DomDriver::new(page),
            site_url,
            owned,
        };

        match driver.login(config).await {
            Ok(()) => Ok(driver),
            Err(e) => {
                // 失败路径同样释放会话资源
                if let Err(close_err) = driver.shutdown().await {
                    warn!("登录失败后关闭浏览器时出错: {}", close_err);
                }
                Err(e)
            }
        }
    }

    pub fn dom(&self) -> &DomDriver {
        &self.dom
    }

    /// 规范化后的站点地址
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// 登录 WordPress 后台
    async fn login(&self, config: &Config) -> Result<()> {
        let login = PageTarget::login(&self.site_url);
        info!("正在登录WordPress...");
        info!("访问登录页面: {}", login.url);
        self.dom.goto(&login.url).await?;

        if !self.dom.wait_for(&login.ready_selector, 10).await? {
            // 已登录的会话不会出现登录表单，而是直接进入后台
            if self.dom.exists("#wpadminbar").await? {
                info!("✓ 检测到已登录的会话，跳过登录");
                return Ok(());
            }
            let current = self.dom.current_url().await?;
            warn!("无法加载登录页面，当前URL: {}", current);
            return Err(SessionError::LoginFormTimeout { url: login.url }.into());
        }

        self.dom.type_into("#user_login", &config.username).await?;
        self.dom.type_into("#user_pass", &config.password).await?;
        self.dom.mouse_click("#wp-submit").await?;

        if !self.dom.wait_for("#wpadminbar", 10).await? {
            return Err(SessionError::LoginRejected {
                username: config.username.clone(),
            }
            .into());
        }

        info!("登录成功");
        Ok(())
    }

    /// 释放会话（消耗 self，重复释放无法通过编译）
    pub async fn shutdown(mut self) -> Result<()> {
        if self.owned {
            self.browser.close().await?;
            self.browser.wait().await?;
            info!("浏览器会话已关闭");
        } else {
            // 连接模式下浏览器属于用户，只断开连接
            info!("已断开与浏览器的连接");
        }
        Ok(())
    }
}
