//! 应用程序运行流程
//!
//! 加载配置、执行一次探测运行、写入报告，并把运行错误映射为进程退出码

use crate::cli::Args;
use crate::config::{validate_config, Config, TomlConfigLoader};
use crate::diagnostics::{capture_to_file, DockerLogCapture};
use crate::error::{ConfigError, StabilityProbeError};
use crate::logging::{LogConfig, TracingProbeLogger};
use crate::probe::{HttpProber, RunPlan, SamplingScheduler};
use crate::report::{assemble_report, ProbeReport};
use anyhow::{Context, Result};
use std::sync::Arc;

/// 运行完成
pub const EXIT_SUCCESS: u8 = 0;
/// 运行失败（如报告无法写入）
pub const EXIT_FAILURE: u8 = 1;
/// 配置错误
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// 加载配置文件（如果有）并应用命令行参数覆盖
pub async fn load_config(args: &Args) -> Result<Config> {
    let base = TomlConfigLoader::new(true)
        .load(args.config.as_deref())
        .await
        .context("加载配置失败")?;

    Ok(args.apply_to(base))
}

/// 由配置生成日志系统参数
pub fn log_config(config: &Config) -> LogConfig {
    LogConfig {
        level: config
            .output
            .log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info),
        file_path: config.output.log_file.clone(),
        console: true,
        json_format: config.output.json_logs,
    }
}

/// 验证合并后的配置并生成探测计划
pub fn build_plan(config: &Config) -> std::result::Result<RunPlan, ConfigError> {
    validate_config(config).map_err(ConfigError::ValidationError)?;

    let target = config
        .probe
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ConfigError::ValidationError("必须指定目标URL".to_string()))?;

    Ok(RunPlan::from_settings(target, &config.probe))
}

/// 执行探测、写入报告并按需采集容器日志
pub async fn execute(config: &Config) -> Result<ProbeReport> {
    let plan = build_plan(config)
        .map_err(StabilityProbeError::from)
        .context("配置验证失败")?;

    let prober = HttpProber::new()
        .map_err(StabilityProbeError::from)
        .context("创建HTTP探测器失败")?;
    let mut scheduler = SamplingScheduler::new(Arc::new(prober), Arc::new(TracingProbeLogger));

    let output = scheduler
        .run(&plan)
        .await
        .map_err(StabilityProbeError::from)?;

    let report = assemble_report(output.summary, &output.outcomes);
    report
        .write_to(&config.output.report_path)
        .await
        .map_err(StabilityProbeError::from)
        .context("写入报告失败")?;

    // 报告写入之后再采集容器日志，采集失败不影响结果
    if let Some(ref diagnostics) = config.diagnostics {
        let capture = DockerLogCapture::from_config(diagnostics);
        capture_to_file(&capture, &diagnostics.output_path).await;
    }

    Ok(report)
}

/// 错误链中是否包含配置错误
pub fn is_config_error(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<StabilityProbeError>()
        .is_some_and(StabilityProbeError::is_config_error)
}

/// 运行错误对应的进程退出码
pub fn exit_code(error: &anyhow::Error) -> u8 {
    if is_config_error(error) {
        EXIT_CONFIG_ERROR
    } else {
        EXIT_FAILURE
    }
}
