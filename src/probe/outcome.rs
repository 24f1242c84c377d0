//! 探测结果数据结构
//!
//! 每次探测产生一个不可变的 [`Outcome`]。字段私有，只能通过三个构造函数创建，
//! 因此 `success == true` 时必然没有错误信息且状态码在 [200,300) 内。

use chrono::{DateTime, SubsecRound, Utc};
use std::time::Duration;

/// 失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 收到响应，但响应体缺少期望内容
    ContentMismatch,
    /// 收到响应，但状态码不在 [200,300)
    Status,
    /// 没有拿到完整响应（超时、连接失败、DNS、协议错误）
    Transport,
}

/// 单次探测结果
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    timestamp: DateTime<Utc>,
    status_code: Option<u16>,
    latency_ms: Option<f64>,
    failure: Option<(FailureKind, String)>,
}

impl Outcome {
    /// 成功结果
    pub fn success(timestamp: DateTime<Utc>, status_code: u16, latency: Duration) -> Self {
        debug_assert!((200..300).contains(&status_code));
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            status_code: Some(status_code),
            latency_ms: Some(duration_to_ms(latency)),
            failure: None,
        }
    }

    /// 收到响应但校验失败的结果
    pub fn failure(
        timestamp: DateTime<Utc>,
        kind: FailureKind,
        status_code: u16,
        latency: Duration,
        error: String,
    ) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            status_code: Some(status_code),
            latency_ms: Some(duration_to_ms(latency)),
            failure: Some((kind, error)),
        }
    }

    /// 未收到响应的结果
    pub fn transport_failure(timestamp: DateTime<Utc>, latency: Duration, error: String) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            status_code: None,
            latency_ms: Some(duration_to_ms(latency)),
            failure: Some((FailureKind::Transport, error)),
        }
    }

    /// 探测开始时间（UTC，秒精度）
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// 是否成功
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// HTTP状态码，传输失败时为空
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// 耗时（毫秒，完整精度）
    pub fn latency_ms(&self) -> Option<f64> {
        self.latency_ms
    }

    /// 失败原因
    pub fn error(&self) -> Option<&str> {
        self.failure.as_ref().map(|(_, message)| message.as_str())
    }

    /// 失败类型
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(|(kind, _)| *kind)
    }
}

fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
