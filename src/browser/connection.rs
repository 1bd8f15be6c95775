use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 连接到已运行的浏览器（调试端口）并获取页面
///
/// 如果已有页面的地址包含站点域名，则复用该页面，否则创建新页面
pub async fn connect_to_browser_and_page(port: u16, site_url: &str) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        e
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    // 查找已经打开站点的页面
    for p in pages.iter() {
        if let Ok(Some(url)) = p.url().await {
            debug!("检查页面地址: {}", url);
            if url.contains(site_url) {
                info!("✓ 复用已打开的站点页面: {}", url);
                return Ok((browser, p.clone()));
            }
        }
    }

    debug!("未找到已打开的站点页面，创建空白页面");
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        e
    })?;

    Ok((browser, page))
}
