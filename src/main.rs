use anyhow::Result;
use tracing::info;
use wp_product_uploader::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    wp_product_uploader::logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用（准备阶段被取消时正常退出）
    match App::initialize(config).await? {
        Some(app) => app.run().await?,
        None => return Ok(()),
    }

    info!("所有操作已完成");

    Ok(())
}
