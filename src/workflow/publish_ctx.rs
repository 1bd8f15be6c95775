//! 发布上下文
//!
//! 封装"我正在发布第几个产品、走到了哪一步"这一信息

use std::fmt::Display;

/// 发布状态机的状态，按执行顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Navigate,
    SetTitle,
    SetPrice,
    ResolveCategory,
    ResolveBrand,
    FinalCheck,
    AwaitPublishable,
    Submit,
    VerifyPublished,
    Advance,
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Navigate => "导航到添加产品页面",
            Step::SetTitle => "填写产品标题",
            Step::SetPrice => "设置产品价格",
            Step::ResolveCategory => "处理产品分类",
            Step::ResolveBrand => "处理品牌",
            Step::FinalCheck => "发布前的最终检查",
            Step::AwaitPublishable => "等待发布按钮可点击",
            Step::Submit => "点击发布按钮",
            Step::VerifyPublished => "确认发布结果",
            Step::Advance => "返回添加产品页面",
        };
        write!(f, "{}", name)
    }
}

/// 单个产品的发布执行上下文
///
/// 记录开始时创建，成功或终态跳过后丢弃；
/// 只用于诊断和决定是否需要恢复导航
#[derive(Debug, Clone)]
pub struct PublishAttempt {
    /// 产品序号（从 1 开始，仅用于日志）
    pub record_index: usize,
    /// 产品标识（仅用于日志）
    pub record_label: String,
    /// 当前所处的状态
    pub current_step: Step,
    /// 最终检查等环节触发的纠正次数
    pub retries_used: u32,
    /// 最近一次软失败的描述
    pub last_error: Option<String>,
}

impl PublishAttempt {
    pub fn new(record_index: usize, record_label: String) -> Self {
        Self {
            record_index,
            record_label,
            current_step: Step::Navigate,
            retries_used: 0,
            last_error: None,
        }
    }

    /// 进入新状态
    pub fn enter(&mut self, step: Step) {
        self.current_step = step;
    }

    /// 记录一次软失败
    pub fn note_soft_failure(&mut self, detail: impl Into<String>) {
        self.last_error = Some(detail.into());
    }

    /// 记录一次纠正性重试
    pub fn note_retry(&mut self) {
        self.retries_used += 1;
    }
}

impl Display for PublishAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[产品 #{} {} 步骤: {}]",
            self.record_index, self.record_label, self.current_step
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_tracks_step_and_retries() {
        let mut attempt = PublishAttempt::new(3, "水壶".to_string());
        assert_eq!(attempt.current_step, Step::Navigate);

        attempt.enter(Step::SetPrice);
        attempt.note_retry();
        attempt.note_soft_failure("价格未能写入");

        assert_eq!(attempt.current_step, Step::SetPrice);
        assert_eq!(attempt.retries_used, 1);
        assert_eq!(attempt.last_error.as_deref(), Some("价格未能写入"));
    }
}
