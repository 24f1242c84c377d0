//! HTTP探测执行器实现
//!
//! 执行一次带计时的 GET 请求并对结果分类。执行器从不返回错误：
//! 所有失败都记录在返回的 [`Outcome`] 中。

use crate::error::ProbeError;
use crate::probe::outcome::{FailureKind, Outcome};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::{Duration, Instant};

/// 探测器trait，定义单次探测接口
#[async_trait]
pub trait Prober: Send + Sync {
    /// 执行一次探测
    ///
    /// # 参数
    /// * `target` - 目标URL
    /// * `timeout` - 请求超时时间（包含读取响应体）
    /// * `expected` - 响应体中必须包含的字符串（区分大小写）
    ///
    /// # 返回
    /// * `Outcome` - 探测结果，不会失败
    async fn probe(&self, target: &str, timeout: Duration, expected: Option<&str>) -> Outcome;
}

/// 基于 reqwest 的HTTP探测器
pub struct HttpProber {
    /// HTTP客户端
    client: Client,
}

impl HttpProber {
    /// 创建新的HTTP探测器
    ///
    /// # 返回
    /// * `Result<Self, ProbeError>` - 探测器实例
    pub fn new() -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()?;

        Ok(Self { client })
    }

    /// 使用外部构建的客户端创建探测器
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// 格式化请求错误信息，使其更加清晰易读
    fn format_request_error(error: &reqwest::Error) -> String {
        let detail = error_chain(error);
        if error.is_timeout() {
            "Request timeout".to_string()
        } else if error.is_connect() {
            let lowered = detail.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                format!("DNS resolution failed: {detail}")
            } else if lowered.contains("refused") {
                format!("Connection refused: {detail}")
            } else {
                format!("Connection failed: {detail}")
            }
        } else if error.is_builder() || error.is_request() {
            format!("Invalid request: {detail}")
        } else if error.is_body() || error.is_decode() {
            format!("Response body error: {detail}")
        } else {
            format!("Request failed: {detail}")
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &str, timeout: Duration, expected: Option<&str>) -> Outcome {
        let timestamp = Utc::now();
        let start_time = Instant::now();

        let response = match self.client.get(target).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                return Outcome::transport_failure(
                    timestamp,
                    start_time.elapsed(),
                    Self::format_request_error(&e),
                );
            }
        };

        let status_code = response.status().as_u16();

        // 读取完整响应体，读取失败视为未拿到响应
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Outcome::transport_failure(
                    timestamp,
                    start_time.elapsed(),
                    Self::format_request_error(&e),
                );
            }
        };

        let latency = start_time.elapsed();
        classify_response(timestamp, status_code, &body, expected, latency)
    }
}

/// 按顺序对已收到的响应分类：内容检查优先于状态码检查
pub fn classify_response(
    timestamp: chrono::DateTime<Utc>,
    status_code: u16,
    body: &str,
    expected: Option<&str>,
    latency: Duration,
) -> Outcome {
    if let Some(expected) = expected {
        if !body.contains(expected) {
            return Outcome::failure(
                timestamp,
                FailureKind::ContentMismatch,
                status_code,
                latency,
                format!("Expected '{expected}' not found"),
            );
        }
    }

    if (200..300).contains(&status_code) {
        Outcome::success(timestamp, status_code, latency)
    } else {
        Outcome::failure(
            timestamp,
            FailureKind::Status,
            status_code,
            latency,
            format!("Non-2xx status: {status_code}"),
        )
    }
}

/// 拼接错误及其底层原因
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
