pub mod publish_ctx;
pub mod publish_flow;

pub use publish_ctx::{PublishAttempt, Step};
pub use publish_flow::{step_policy, Escalation, PublishFlow, RecordOutcome, RunStats, StepResult};
