//! 报告组装模块
//!
//! 将调度器的计时信息、统计结果和原始探测日志组装成JSON报告并写入文件

use crate::error::ReportError;
use crate::probe::outcome::Outcome;
use crate::probe::stats::RunStatistics;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Serialize, Serializer};
use std::path::Path;
use std::time::Duration;

/// 一次运行的计时信息
#[derive(Debug, Clone, PartialEq)]
pub struct RunTiming {
    /// 开始时间（墙上时钟）
    pub start: DateTime<Utc>,
    /// 结束时间（墙上时钟）
    pub end: DateTime<Utc>,
    /// 实际运行时长（单调时钟）
    pub elapsed: Duration,
}

/// 运行汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub url: String,
    #[serde(serialize_with = "serialize_ts")]
    pub start_ts_utc: DateTime<Utc>,
    #[serde(serialize_with = "serialize_ts")]
    pub end_ts_utc: DateTime<Utc>,
    pub duration_s: f64,
    pub total_requests: usize,
    pub ok_requests: usize,
    pub fail_requests: usize,
    pub availability_pct: f64,
    pub p50_latency_ms: Option<f64>,
    pub p95_latency_ms: Option<f64>,
    pub min_latency_ms: Option<f64>,
    pub max_latency_ms: Option<f64>,
}

impl RunSummary {
    /// 由计时和统计结果构建汇总，在这里统一取整
    pub fn new(url: &str, timing: &RunTiming, stats: &RunStatistics) -> Self {
        Self {
            url: url.to_string(),
            start_ts_utc: timing.start.trunc_subsecs(0),
            end_ts_utc: timing.end.trunc_subsecs(0),
            duration_s: round_to(timing.elapsed.as_secs_f64(), 3),
            total_requests: stats.total,
            ok_requests: stats.ok,
            fail_requests: stats.failed,
            availability_pct: round_to(stats.availability_pct, 2),
            p50_latency_ms: stats.p50_latency_ms.map(|v| round_to(v, 2)),
            p95_latency_ms: stats.p95_latency_ms.map(|v| round_to(v, 2)),
            min_latency_ms: stats.min_latency_ms.map(|v| round_to(v, 2)),
            max_latency_ms: stats.max_latency_ms.map(|v| round_to(v, 2)),
        }
    }
}

/// 报告元信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMeta {
    pub tool: String,
    pub version: String,
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self {
            tool: crate::APP_NAME.to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// 报告中的单条探测记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    #[serde(serialize_with = "serialize_ts")]
    pub ts_utc: DateTime<Utc>,
    pub ok: bool,
    pub status_code: Option<u16>,
    pub latency_ms: Option<f64>,
    pub error: Option<String>,
}

impl From<&Outcome> for ResultEntry {
    fn from(outcome: &Outcome) -> Self {
        Self {
            ts_utc: outcome.timestamp(),
            ok: outcome.is_success(),
            status_code: outcome.status_code(),
            latency_ms: outcome.latency_ms().map(|v| round_to(v, 2)),
            error: outcome.error().map(str::to_string),
        }
    }
}

/// 完整报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub meta: ReportMeta,
    pub summary: RunSummary,
    pub results: Vec<ResultEntry>,
}

/// 组装报告，`results` 保持探测执行顺序
pub fn assemble_report(summary: RunSummary, outcomes: &[Outcome]) -> ProbeReport {
    ProbeReport {
        meta: ReportMeta::default(),
        summary,
        results: outcomes.iter().map(ResultEntry::from).collect(),
    }
}

impl ProbeReport {
    /// 转换为格式化的JSON字符串
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 写入报告文件，必要时创建父目录
    pub async fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        let write_error = |source: std::io::Error| ReportError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }
        tokio::fs::write(path, json).await.map_err(write_error)?;

        tracing::info!("报告已写入: {}", path.display());
        Ok(())
    }
}

/// 保留指定位数的小数，恰好一半时取偶
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round_ties_even() / factor
}

/// 以秒精度的 ISO-8601 格式序列化时间，例如 `2024-05-01T12:00:00+00:00`
fn serialize_ts<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, false))
}
