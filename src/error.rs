//! 会话级致命错误
//!
//! 记录内的失败全部以 Outcome 枚举在本地消化；只有建立会话
//! 失败（连接、启动、登录）才会作为类型化错误向上传播并终止运行

use thiserror::Error;

/// 会话建立与登录阶段的致命错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("无法连接到浏览器 (端口: {port}): {reason}")]
    Connect { port: u16, reason: String },

    #[error("启动浏览器失败: {reason}")]
    Launch { reason: String },

    #[error("登录页面加载失败: {url}")]
    LoginFormTimeout { url: String },

    #[error("登录失败，用户名或密码可能不正确 (用户: {username})")]
    LoginRejected { username: String },
}
