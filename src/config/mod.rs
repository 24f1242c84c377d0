//! 配置管理模块
//!
//! 提供配置文件定位与解析、默认值和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{TomlConfigLoader, CONFIG_PATH_ENV};
pub use types::{
    floor_duration_secs, saturating_secs, validate_config, Config, DiagnosticsConfig,
    OutputConfig, ProbeSettings,
};
