//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口。命令行参数优先于配置文件，
//! 配置文件优先于默认值。

use crate::config::{Config, DiagnosticsConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Stability Probe - 串行HTTP可用性与延迟探测工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "stability-probe",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 目标URL
    #[arg(long, value_name = "URL", help = "目标URL", env = "STABILITY_PROBE_URL")]
    pub url: Option<String>,

    /// 运行时长（秒）
    #[arg(
        long,
        value_name = "SECONDS",
        allow_negative_numbers = true,
        help = "运行时长（秒），默认60，不足1按1处理"
    )]
    pub duration: Option<i64>,

    /// 探测间隔（秒）
    #[arg(
        long,
        value_name = "SECONDS",
        allow_negative_numbers = true,
        help = "探测间隔（秒），默认1.0，负数按0处理"
    )]
    pub interval: Option<f64>,

    /// 单次请求超时（秒）
    #[arg(long, value_name = "SECONDS", help = "单次请求超时（秒），默认2.0")]
    pub timeout: Option<f64>,

    /// 响应体中必须包含的字符串
    #[arg(long, value_name = "TEXT", help = "响应体中必须包含的字符串（区分大小写）")]
    pub expect: Option<String>,

    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径，未指定时读取 STABILITY_PROBE_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 报告输出路径
    #[arg(long, value_name = "FILE", help = "JSON报告路径，默认 report.json")]
    pub out: Option<PathBuf>,

    /// 日志文件路径
    #[arg(long, value_name = "FILE", help = "日志文件路径，默认 qa_test.log")]
    pub log_file: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别",
        env = "STABILITY_PROBE_LOG_LEVEL"
    )]
    pub log_level: Option<LogLevel>,

    /// 是否启用详细输出
    #[arg(short, long, help = "启用详细输出（等同于 --log-level debug）")]
    pub verbose: bool,

    /// 控制台日志使用JSON格式
    #[arg(long, help = "控制台日志使用JSON格式")]
    pub json_logs: bool,

    /// 运行结束后采集日志的容器
    #[arg(long, value_name = "NAME", help = "运行结束后采集日志的容器名称")]
    pub docker_container: Option<String>,

    /// 采集的日志行数
    #[arg(long, value_name = "LINES", help = "采集最近的日志行数，默认200")]
    pub docker_tail: Option<u32>,

    /// 容器日志输出路径
    #[arg(long, value_name = "FILE", help = "容器日志保存路径，默认 docker_logs.txt")]
    pub docker_log_out: Option<PathBuf>,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl Args {
    /// 将命令行参数覆盖到配置上
    pub fn apply_to(&self, mut config: Config) -> Config {
        let probe = &mut config.probe;
        if let Some(ref url) = self.url {
            probe.url = Some(url.clone());
        }
        if let Some(duration) = self.duration {
            probe.duration_seconds = duration;
        }
        if let Some(interval) = self.interval {
            probe.interval_seconds = interval;
        }
        if let Some(timeout) = self.timeout {
            probe.timeout_seconds = timeout;
        }
        if let Some(ref expect) = self.expect {
            probe.expect = Some(expect.clone());
        }

        let output = &mut config.output;
        if let Some(ref out) = self.out {
            output.report_path = out.clone();
        }
        if let Some(ref log_file) = self.log_file {
            output.log_file = Some(log_file.clone());
        }
        if self.json_logs {
            output.json_logs = true;
        }
        if self.verbose {
            output.log_level = LogLevel::Debug.to_string();
        } else if let Some(level) = self.log_level {
            output.log_level = level.to_string();
        }

        if let Some(ref container) = self.docker_container {
            let diagnostics = config
                .diagnostics
                .get_or_insert_with(|| DiagnosticsConfig::for_container(container.clone()));
            diagnostics.docker_container = container.clone();
        }
        if let Some(diagnostics) = config.diagnostics.as_mut() {
            if let Some(tail) = self.docker_tail {
                diagnostics.tail_lines = tail;
            }
            if let Some(ref path) = self.docker_log_out {
                diagnostics.output_path = path.clone();
            }
        }

        config
    }
}
