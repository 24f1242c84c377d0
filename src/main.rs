//! Stability Probe 主程序入口
//!
//! 串行HTTP可用性与延迟探测工具

use clap::Parser;
use stability_probe::app::{self, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use stability_probe::cli::Args;
use stability_probe::logging::LoggingSystem;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 解析命令行参数
    let args = Args::parse();

    // 加载配置并应用命令行覆盖
    let config = match app::load_config(&args).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("加载配置失败: {e:#}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    // 初始化日志系统
    if let Err(e) = LoggingSystem::setup_logging(app::log_config(&config)) {
        eprintln!("初始化日志系统失败: {e:#}");
        return ExitCode::from(EXIT_FAILURE);
    }

    info!("Stability Probe v{} 启动", stability_probe::VERSION);

    match app::execute(&config).await {
        Ok(report) => {
            let summary = &report.summary;
            info!(
                "探测完成: total={} ok={} fail={} availability={:.2}% p50={} p95={}",
                summary.total_requests,
                summary.ok_requests,
                summary.fail_requests,
                summary.availability_pct,
                format_latency(summary.p50_latency_ms),
                format_latency(summary.p95_latency_ms)
            );
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            error!("运行失败: {:#}", e);
            ExitCode::from(app::exit_code(&e))
        }
    }
}

fn format_latency(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |ms| format!("{ms:.2}ms"))
}
