//! # WP Product Uploader
//!
//! 一个驱动 WordPress/WooCommerce 后台逐个发布产品的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `DomDriver` - 唯一的 page owner，提供 eval / 等待 / 读写 / 点击能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个动作
//! - `Navigator` - 页面导航（就绪标记 + 地址校验 + 刷新重试）
//! - `FieldSetter` - 多策略定位的字段写入与读回确认
//! - `TaxonomyResolver` - 分类/品牌的查找或新建（幂等）
//! - `ReportWriter` - 写运行报告能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个产品"的完整发布状态机
//! - `PublishAttempt` - 上下文封装（产品序号 + 当前步骤）
//! - `PublishFlow` - 状态编排（导航 → 填写 → 分类 → 提交 → 确认）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/preparation` - 读表、推导图片、映射表、人工确认
//! - `orchestrator/publisher` - 串行遍历记录，记录边界故障收容
//!
//! 会话层（`session/`）独占浏览器资源，保证所有退出路径都释放会话

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::SessionError;
pub use infrastructure::DomDriver;
pub use models::{ProductRecord, TranslationMap};
pub use orchestrator::App;
pub use services::{ProductForm, WpProductForm};
pub use session::SessionDriver;
pub use workflow::{PublishAttempt, PublishFlow, RecordOutcome, RunStats, Step};
