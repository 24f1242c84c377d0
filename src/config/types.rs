//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 主配置结构，包含探测参数、输出配置和诊断配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// 探测参数
    #[serde(default)]
    pub probe: ProbeSettings,
    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,
    /// 容器日志采集配置（可选）
    pub diagnostics: Option<DiagnosticsConfig>,
}

/// 探测参数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeSettings {
    /// 目标URL
    pub url: Option<String>,
    /// 运行时长（秒），不足1按1处理
    #[serde(default = "default_duration")]
    pub duration_seconds: i64,
    /// 探测间隔（秒），负数按0处理
    #[serde(default = "default_interval")]
    pub interval_seconds: f64,
    /// 单次请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// 响应体中必须包含的字符串（区分大小写）
    pub expect: Option<String>,
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// JSON报告路径
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: Option<PathBuf>,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 控制台日志是否使用JSON格式
    #[serde(default)]
    pub json_logs: bool,
}

/// 容器日志采集配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticsConfig {
    /// 容器名称
    pub docker_container: String,
    /// 采集最近的日志行数
    #[serde(default = "default_tail_lines")]
    pub tail_lines: u32,
    /// 采集命令超时时间（秒）
    #[serde(default = "default_capture_timeout")]
    pub timeout_seconds: u64,
    /// 日志输出文件
    #[serde(default = "default_docker_log_out")]
    pub output_path: PathBuf,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            url: None,
            duration_seconds: default_duration(),
            interval_seconds: default_interval(),
            timeout_seconds: default_timeout(),
            expect: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            log_file: default_log_file(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

impl DiagnosticsConfig {
    /// 使用默认参数创建容器日志采集配置
    pub fn for_container(docker_container: String) -> Self {
        Self {
            docker_container,
            tail_lines: default_tail_lines(),
            timeout_seconds: default_capture_timeout(),
            output_path: default_docker_log_out(),
        }
    }
}

impl ProbeSettings {
    /// 实际使用的运行时长，不足1秒按1秒计
    pub fn effective_duration(&self) -> Duration {
        floor_duration_secs(self.duration_seconds)
    }

    /// 实际使用的探测间隔，负数按0处理
    pub fn effective_interval(&self) -> Duration {
        saturating_secs(self.interval_seconds)
    }

    /// 单次请求超时时间，超出 `Duration` 表示范围时取最大值
    pub fn timeout(&self) -> Duration {
        saturating_secs(self.timeout_seconds)
    }
}

/// 秒数转换为运行时长，不足1秒按1秒计
pub fn floor_duration_secs(seconds: i64) -> Duration {
    Duration::from_secs(seconds.max(1).unsigned_abs())
}

/// 浮点秒数转换为 `Duration`：负数和 NaN 取0，溢出取 `Duration::MAX`
pub fn saturating_secs(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX)
}

// 默认值函数
fn default_duration() -> i64 {
    60
}
fn default_interval() -> f64 {
    1.0
}
fn default_timeout() -> f64 {
    2.0
}
fn default_report_path() -> PathBuf {
    PathBuf::from("report.json")
}
fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from("qa_test.log"))
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_tail_lines() -> u32 {
    200
}
fn default_capture_timeout() -> u64 {
    10
}
fn default_docker_log_out() -> PathBuf {
    PathBuf::from("docker_logs.txt")
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    let probe = &config.probe;

    // 验证目标URL
    let url = match probe.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return Err("必须指定目标URL".to_string()),
    };
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("目标URL格式无效: {url}"));
    }

    if !probe.timeout_seconds.is_finite() || probe.timeout_seconds <= 0.0 {
        return Err(format!("请求超时时间必须大于0: {}", probe.timeout_seconds));
    }
    if Duration::try_from_secs_f64(probe.timeout_seconds).is_err() {
        return Err(format!("请求超时时间过大: {}", probe.timeout_seconds));
    }

    // 负的间隔按0处理，只拒绝无法表示的值
    if !probe.interval_seconds.is_finite()
        || Duration::try_from_secs_f64(probe.interval_seconds.max(0.0)).is_err()
    {
        return Err(format!("探测间隔无效: {}", probe.interval_seconds));
    }

    // 验证日志级别
    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.output.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.output.log_level, valid_log_levels
        ));
    }

    if let Some(ref diagnostics) = config.diagnostics {
        if diagnostics.docker_container.trim().is_empty() {
            return Err("容器名称不能为空".to_string());
        }
        if diagnostics.timeout_seconds == 0 {
            return Err("容器日志采集超时时间不能为0".to_string());
        }
    }

    Ok(())
}
