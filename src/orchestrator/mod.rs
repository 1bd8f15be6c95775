//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责准备输入和调度发布流程，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `preparation` - 准备阶段
//! - 读取产品 Excel 表
//! - 按命名约定推导图片路径、检查本地图片
//! - 创建/读取中英文品名映射表
//! - 交互补齐登录信息并取得发布确认
//!
//! ### `publisher` - 发布编排
//! - 管理应用生命周期（初始化、运行、释放会话）
//! - 串行遍历产品记录（Vec<ProductRecord>）
//! - 在记录边界捕获异常并做恢复导航
//! - 输出全局统计信息和运行报告
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::publisher (处理 Vec<ProductRecord>)
//!     ↓
//! workflow::PublishFlow (处理单个 ProductRecord 的状态机)
//!     ↓
//! services (能力层：navigator / field_setter / taxonomy / report)
//!     ↓
//! infrastructure (基础设施：DomDriver)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：preparation 管输入，publisher 管发布
//! 2. **资源隔离**：只有会话层持有 Browser，编排层借用 DomDriver
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **故障收容**：单条记录的任何异常都止步于记录边界

pub mod preparation;
pub mod publisher;

pub use preparation::{derive_image_name, prepare, PrepStats};
pub use publisher::{process_record, App};
