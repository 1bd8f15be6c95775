/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// WordPress 站点地址
    pub site_url: String,
    /// 登录用户名
    pub username: String,
    /// 登录密码
    pub password: String,
    /// 产品表 Excel 文件
    pub excel_file: String,
    /// 本地产品图片目录
    pub image_folder: String,
    /// 中英文品名映射表文件
    pub mapping_file: String,
    /// 浏览器调试端口（设置后连接已运行的浏览器，否则自行启动）
    pub browser_debug_port: Option<u16>,
    /// 自定义浏览器可执行文件路径
    pub chrome_path: Option<String>,
    /// 是否无头运行
    pub headless: bool,
    /// 跳过所有交互确认（无人值守运行）
    pub skip_confirm: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行报告文件
    pub report_file: String,
    /// 页面就绪标记的等待上限（秒）
    pub page_wait_secs: u64,
    /// 单个元素的等待上限（秒）
    pub element_wait_secs: u64,
    /// 发布按钮可点击的等待上限（秒）
    pub publish_wait_secs: u64,
    /// 异步页面行为后的稳定等待（毫秒）
    pub settle_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            username: String::new(),
            password: String::new(),
            excel_file: "a.xlsx".to_string(),
            image_folder: "product_images".to_string(),
            mapping_file: "name_mapping_new.csv".to_string(),
            browser_debug_port: None,
            chrome_path: None,
            headless: false,
            skip_confirm: false,
            verbose_logging: false,
            report_file: "upload_report.txt".to_string(),
            page_wait_secs: 15,
            element_wait_secs: 10,
            publish_wait_secs: 30,
            settle_ms: 2000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            site_url: std::env::var("WP_SITE_URL").unwrap_or(default.site_url),
            username: std::env::var("WP_USERNAME").unwrap_or(default.username),
            password: std::env::var("WP_PASSWORD").unwrap_or(default.password),
            excel_file: std::env::var("EXCEL_FILE").unwrap_or(default.excel_file),
            image_folder: std::env::var("IMAGE_FOLDER").unwrap_or(default.image_folder),
            mapping_file: std::env::var("MAPPING_FILE").unwrap_or(default.mapping_file),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()),
            chrome_path: std::env::var("CHROME_PATH").ok(),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            skip_confirm: std::env::var("SKIP_CONFIRM").ok().and_then(|v| v.parse().ok()).unwrap_or(default.skip_confirm),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            report_file: std::env::var("REPORT_FILE").unwrap_or(default.report_file),
            page_wait_secs: std::env::var("PAGE_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.page_wait_secs),
            element_wait_secs: std::env::var("ELEMENT_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.element_wait_secs),
            publish_wait_secs: std::env::var("PUBLISH_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.publish_wait_secs),
            settle_ms: std::env::var("SETTLE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_ms),
        }
    }
}
