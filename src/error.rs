//! 错误处理模块
//!
//! 定义应用程序的统一错误类型。探测本身的失败（超时、非2xx、内容不匹配）
//! 记录在 `Outcome` 中，不会出现在这里。

use thiserror::Error;

/// Stability Probe 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum StabilityProbeError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测相关错误
    #[error("探测错误: {0}")]
    Probe(#[from] ProbeError),

    /// 报告相关错误
    #[error("报告错误: {0}")]
    Report(#[from] ReportError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl StabilityProbeError {
    /// 是否为配置类错误（进程退出码 2）
    pub fn is_config_error(&self) -> bool {
        matches!(self, StabilityProbeError::Config(_))
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 探测器错误类型
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP客户端构建失败
    #[error("HTTP客户端初始化失败: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// 调度器已经运行过
    #[error("调度器已结束，不能重复运行")]
    AlreadyFinished,
}

/// 报告错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    /// 报告序列化失败
    #[error("报告序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 报告写入失败
    #[error("报告写入失败: {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, StabilityProbeError>;
