//! 真实浏览器集成测试
//!
//! 需要一个可访问的 WordPress 站点和对应的环境变量配置

use wp_product_uploader::config::Config;
use wp_product_uploader::logger;
use wp_product_uploader::services::navigator::{NavOutcome, Navigator, PageTarget};
use wp_product_uploader::services::product_form::{ProductForm, WpProductForm};
use wp_product_uploader::session::SessionDriver;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_session_login_and_release() {
    // 初始化日志
    logger::init();

    // 加载配置（需要 WP_SITE_URL / WP_USERNAME / WP_PASSWORD）
    let config = Config::from_env();

    // 建立会话
    let session = SessionDriver::establish(&config)
        .await
        .expect("建立会话失败");

    // 释放会话
    session.shutdown().await.expect("释放会话失败");
}

#[tokio::test]
#[ignore]
async fn test_navigate_to_new_product_page() {
    logger::init();

    let config = Config::from_env();

    let session = SessionDriver::establish(&config)
        .await
        .expect("建立会话失败");

    let navigator = Navigator::new(config.page_wait_secs, config.settle_ms);
    let target = PageTarget::new_product(session.site_url());
    let outcome = navigator.goto(&target, session.dom()).await;

    session.shutdown().await.expect("释放会话失败");

    assert_eq!(outcome, NavOutcome::Arrived, "应该能进入添加新产品页面");
}

#[tokio::test]
#[ignore]
async fn test_fill_title_on_live_form() {
    logger::init();

    let mut config = Config::from_env();

    let session = SessionDriver::establish(&config)
        .await
        .expect("建立会话失败");
    config.site_url = session.site_url().to_string();

    let form = WpProductForm::new(session.dom(), &config);

    form.open_entry_page().await.expect("导航失败");
    form.set_title("Acme X1 Widget 测试产品")
        .await
        .expect("填写标题失败");

    let title = form.read_title().await.expect("读取标题失败");
    session.shutdown().await.expect("释放会话失败");

    assert_eq!(title.as_deref(), Some("Acme X1 Widget 测试产品"));
}
