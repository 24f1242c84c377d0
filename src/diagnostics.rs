//! 容器日志采集
//!
//! 运行结束后尽力采集目标容器最近的日志，作为排查问题的上下文。
//! 采集受固定超时约束，任何失败都只返回 `None`，不会影响探测结果。

use crate::config::DiagnosticsConfig;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// 日志采集trait
#[async_trait]
pub trait LogCapture: Send + Sync {
    /// 采集日志，失败或超时返回 `None`
    async fn capture(&self) -> Option<String>;
}

/// 通过 `docker logs --tail` 采集容器日志
#[derive(Debug, Clone)]
pub struct DockerLogCapture {
    /// docker 可执行文件
    program: String,
    /// 容器名称
    container: String,
    /// 最近的日志行数
    tail_lines: u32,
    /// 命令超时时间
    timeout: Duration,
}

impl DockerLogCapture {
    /// 创建新的容器日志采集器
    pub fn new(container: impl Into<String>, tail_lines: u32, timeout: Duration) -> Self {
        Self {
            program: "docker".to_string(),
            container: container.into(),
            tail_lines,
            timeout,
        }
    }

    /// 从配置创建
    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        Self::new(
            config.docker_container.clone(),
            config.tail_lines,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// 替换 docker 可执行文件
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("logs")
            .arg("--tail")
            .arg(self.tail_lines.to_string())
            .arg(&self.container)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl LogCapture for DockerLogCapture {
    async fn capture(&self) -> Option<String> {
        let output = match tokio::time::timeout(self.timeout, self.command().output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!("执行 {} logs 失败: {}", self.program, e);
                return None;
            }
            Err(_) => {
                debug!("采集容器日志超时: {}", self.container);
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                "{} logs 退出码异常: {:?}",
                self.program,
                output.status.code()
            );
            return None;
        }

        // docker logs 把容器的 stderr 写到自己的 stderr
        let mut logs = String::from_utf8_lossy(&output.stdout).into_owned();
        logs.push_str(&String::from_utf8_lossy(&output.stderr));
        Some(logs)
    }
}

/// 采集日志并写入文件，返回是否写入成功
///
/// 所有错误都只记录日志，不向上传播。
pub async fn capture_to_file(capture: &dyn LogCapture, path: &Path) -> bool {
    let Some(logs) = capture.capture().await else {
        warn!("未能采集容器日志");
        return false;
    };

    match tokio::fs::write(path, logs).await {
        Ok(()) => {
            info!("容器日志已保存: {}", path.display());
            true
        }
        Err(e) => {
            warn!("保存容器日志失败: {} - {}", path.display(), e);
            false
        }
    }
}
