//! 配置文件加载
//!
//! 命令行指定的路径优先，其次读取 `STABILITY_PROBE_CONFIG` 环境变量，
//! 都没有时使用默认配置。这里只负责解析，验证在命令行合并之后进行。

use crate::config::types::Config;
use crate::error::{ConfigError, Result};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "STABILITY_PROBE_CONFIG";

/// 配置内容中的 `${VAR_NAME}` 占位符
const ENV_VAR_PATTERN: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// TOML配置加载器
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否展开 `${VAR}` 占位符
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 确定要读取的配置文件
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit.map(Path::to_path_buf).or_else(|| {
            std::env::var_os(CONFIG_PATH_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
    }

    /// 加载配置，没有配置文件时返回默认配置
    pub async fn load(&self, explicit: Option<&Path>) -> Result<Config> {
        match Self::locate(explicit) {
            Some(path) => self.load_from_file(&path).await,
            None => {
                tracing::debug!("未指定配置文件，使用默认配置");
                Ok(Config::default())
            }
        }
    }

    /// 读取并解析指定的配置文件
    pub async fn load_from_file(&self, path: &Path) -> Result<Config> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(
                    ConfigError::ParseError(format!("读取 {} 失败: {e}", path.display())).into(),
                );
            }
        };

        let config = self.parse(&content)?;
        tracing::info!("已加载配置文件: {}", path.display());
        Ok(config)
    }

    /// 解析配置内容
    pub fn parse(&self, content: &str) -> Result<Config> {
        let content = self.substitute_env_vars(content)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| describe_parse_error(&content, &e))?;
        Ok(config)
    }

    /// 展开 `${VAR}` 占位符，遇到未设置的变量时报告第一个
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        let pattern = Regex::new(ENV_VAR_PATTERN)
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {e}")))?;

        let mut missing: Option<String> = None;
        let expanded = pattern.replace_all(content, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| caps[1].to_string());
                String::new()
            })
        });

        match missing {
            Some(var) => Err(ConfigError::EnvVarError { var }.into()),
            None => Ok(expanded.into_owned()),
        }
    }
}

/// 生成带出错配置段的解析错误
fn describe_parse_error(content: &str, error: &toml::de::Error) -> ConfigError {
    let section = error
        .span()
        .and_then(|span| section_at(content, span.start));

    match section {
        Some(section) => ConfigError::ParseError(format!(
            "TOML解析失败（[{section}] 段）: {}",
            error.message()
        )),
        None => ConfigError::ParseError(format!("TOML解析失败: {}", error.message())),
    }
}

/// 字节偏移之前最近的表头名称
fn section_at(content: &str, offset: usize) -> Option<String> {
    let prefix = content.get(..offset.min(content.len()))?;
    prefix.lines().rev().find_map(|line| {
        line.trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .map(|name| name.trim_matches(['[', ']']).trim().to_string())
    })
}
