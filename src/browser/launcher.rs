use std::path::Path;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 启动自有浏览器实例
///
/// 默认有界面运行（发布过程需要人工可见），可选无头模式和自定义浏览器路径
pub async fn launch_browser(headless: bool, chrome_path: Option<&str>) -> Result<(Browser, Page)> {
    info!("🚀 正在启动浏览器...");

    let mut builder = BrowserConfig::builder().args(vec![
        "--start-maximized",       // 最大化窗口
        "--disable-extensions",    // 禁用扩展
        "--disable-gpu",           // 禁用 GPU 加速
        "--no-sandbox",            // 禁用沙盒模式
        "--disable-dev-shm-usage", // 防止共享内存不足
    ]);

    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };

    if let Some(path) = chrome_path {
        debug!("使用自定义浏览器路径: {}", path);
        builder = builder.chrome_executable(Path::new(path));
    }

    let config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        anyhow::anyhow!("配置浏览器失败: {}", e)
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        anyhow::anyhow!("启动浏览器失败: {}", e)
    })?;
    debug!("浏览器启动成功");

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

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        anyhow::anyhow!("创建页面失败: {}", e)
    })?;

    info!("✅ 浏览器已就绪");

    Ok((browser, page))
}
