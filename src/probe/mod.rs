//! 探测模块
//!
//! 提供HTTP探测执行、结果分类、统计计算和采样调度功能

pub mod executor;
pub mod outcome;
pub mod scheduler;
pub mod stats;

// 重新导出主要类型
pub use executor::{HttpProber, Prober};
pub use outcome::{FailureKind, Outcome};
pub use scheduler::{RunOutput, RunPlan, SamplingScheduler, SchedulerState};
pub use stats::{percentile, summarize, RunStatistics};
