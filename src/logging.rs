//! 日志系统模块
//!
//! 提供全局 tracing 订阅者的初始化（控制台 + 文件），以及注入到调度器中的
//! 探测日志句柄 [`ProbeLogger`]。

use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer, Registry};

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 日志文件路径（可选），以追加方式写入
    pub file_path: Option<PathBuf>,
    /// 是否输出到控制台
    pub console: bool,
    /// 是否使用JSON格式
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_path: None,
            console: true,
            json_format: false,
        }
    }
}

/// 探测日志句柄
///
/// 调度器每产生一个探测结果就调用一次：成功为 info，失败为 warn。
pub trait ProbeLogger: Send + Sync {
    /// 记录一条日志
    fn log(&self, level: Level, message: &str);
}

/// 转发到全局 tracing 订阅者的探测日志句柄
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProbeLogger;

impl ProbeLogger for TracingProbeLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "stability_probe::probe", "{message}"),
            Level::WARN => tracing::warn!(target: "stability_probe::probe", "{message}"),
            Level::INFO => tracing::info!(target: "stability_probe::probe", "{message}"),
            Level::DEBUG => tracing::debug!(target: "stability_probe::probe", "{message}"),
            _ => tracing::trace!(target: "stability_probe::probe", "{message}"),
        }
    }
}

/// 日志系统管理器
pub struct LoggingSystem {
    config: LogConfig,
}

impl LoggingSystem {
    /// 初始化日志系统
    ///
    /// # 参数
    /// * `config` - 日志配置
    ///
    /// # 返回
    /// * `Result<LoggingSystem, anyhow::Error>` - 初始化结果
    ///
    /// 全局订阅者只能安装一次；重复调用时保留已安装的订阅者。
    pub fn setup_logging(config: LogConfig) -> anyhow::Result<Self> {
        Self::init_log_tracer()?;
        Self::init_tracing_subscriber(&config)?;
        Ok(Self { config })
    }

    /// 当前日志配置
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// 初始化 LogTracer（log crate 到 tracing 的桥接）
    fn init_log_tracer() -> anyhow::Result<()> {
        use tracing_log::LogTracer;

        static LOG_TRACER_INIT: OnceLock<Result<(), String>> = OnceLock::new();

        let result = LOG_TRACER_INIT.get_or_init(|| LogTracer::init().map_err(|e| e.to_string()));

        result
            .as_ref()
            .map_err(|e| anyhow::anyhow!("LogTracer初始化失败: {}", e))?;
        Ok(())
    }

    /// 初始化 tracing subscriber
    fn init_tracing_subscriber(config: &LogConfig) -> anyhow::Result<()> {
        let env_filter = EnvFilter::builder()
            .with_default_directive(Self::convert_level_to_directive(config.level))
            .from_env_lossy();

        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

        if config.console {
            let console_layer = if config.json_format {
                fmt::layer()
                    .json()
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .boxed()
            } else {
                fmt::layer()
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .with_ansi(true)
                    .with_target(false)
                    .boxed()
            };
            layers.push(console_layer);
        }

        if let Some(file_path) = &config.file_path {
            if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| anyhow::anyhow!("创建日志目录失败: {}", e))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)
                .map_err(|e| anyhow::anyhow!("创建日志文件失败: {}", e))?;
            let file_layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_target(false)
                .boxed();
            layers.push(file_layer);
        }

        let result = registry().with(layers).with(env_filter).try_init();

        match result {
            Ok(()) => {
                tracing::debug!("日志配置: {:?}", config);
                Ok(())
            }
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains(
                    "attempted to set a logger after the logging system was already initialized",
                ) || error_msg.contains("a global default trace dispatcher has already been set")
                {
                    tracing::debug!("日志系统已经初始化过了");
                    Ok(())
                } else {
                    Err(anyhow::anyhow!(
                        "tracing subscriber初始化失败: {}",
                        error_msg
                    ))
                }
            }
        }
    }

    /// 将 log::LevelFilter 转换为 tracing 的指令
    fn convert_level_to_directive(level: LevelFilter) -> tracing_subscriber::filter::Directive {
        use tracing_subscriber::filter::{Directive, LevelFilter as TracingLevelFilter};
        match level {
            LevelFilter::Off => Directive::from(TracingLevelFilter::OFF),
            LevelFilter::Error => Directive::from(Level::ERROR),
            LevelFilter::Warn => Directive::from(Level::WARN),
            LevelFilter::Info => Directive::from(Level::INFO),
            LevelFilter::Debug => Directive::from(Level::DEBUG),
            LevelFilter::Trace => Directive::from(Level::TRACE),
        }
    }
}
