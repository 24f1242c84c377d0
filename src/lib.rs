//! Stability Probe - 串行HTTP可用性与延迟探测工具
//!
//! 在固定时长内按固定间隔对目标地址发起探测，支持：
//! - 状态码与响应内容校验
//! - 最近秩百分位延迟统计
//! - JSON报告输出
//! - 控制台与文件双路日志
//! - 运行结束后采集容器日志

pub mod app;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod probe;
pub mod report;

// 重新导出主要类型
pub use config::{Config, ProbeSettings};
pub use error::StabilityProbeError;
pub use probe::{HttpProber, Outcome, Prober, RunPlan, SamplingScheduler};
pub use report::{assemble_report, ProbeReport, RunSummary};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
