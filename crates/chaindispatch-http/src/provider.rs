//! `Provider` over HTTP, backed by `reqwest`.
//!
//! Each call is wrapped in a JSON-RPC 2.0 envelope with a fresh numeric id and
//! POSTed to the endpoint. Transport failures (connection, timeout, non-2xx
//! status) are retried with exponential backoff; replies carrying an `error`
//! object are returned as-is and never retried.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chaindispatch_core::{JsonRpcRequest, JsonRpcResponse, Provider, ProviderError, RpcResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::retry::{RetryConfig, RetryPolicy};

/// Configuration for [`HttpProvider`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpProviderConfig {
    pub retry: RetryConfig,
    pub request_timeout: Duration,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// JSON-RPC over HTTP POST.
pub struct HttpProvider {
    url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
    request_timeout: Duration,
    next_id: AtomicU64,
}

impl HttpProvider {
    /// Create a provider for the given endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            retry: RetryPolicy::new(config.retry),
            request_timeout: config.request_timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(url, HttpProviderConfig::default())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn envelope(&self, method: &str, params: Vec<Value>) -> JsonRpcRequest {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        JsonRpcRequest::new(id, method, params)
    }

    async fn send_once(&self, req: &JsonRpcRequest) -> Result<RpcResponse, ProviderError> {
        let resp = self
            .http
            .post(&self.url)
            .json(req)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Http(format!("HTTP {status}: {body}")));
        }

        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        decode_response(&body)
    }

    fn transport_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout {
                ms: u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            ProviderError::Http(e.to_string())
        }
    }
}

/// Decode a reply body into a [`RpcResponse`].
pub fn decode_response(body: &[u8]) -> Result<RpcResponse, ProviderError> {
    let envelope: JsonRpcResponse = serde_json::from_slice(body)?;
    RpcResponse::try_from(envelope)
}

#[async_trait]
impl Provider for HttpProvider {
    async fn make_request(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<RpcResponse, ProviderError> {
        let req = self.envelope(method, params);
        tracing::debug!(url = %self.url, id = %req.id, method, "sending request");

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.send_once(&req).await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() => match self.retry.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis(),
                            error = %e,
                            url = %self.url,
                            method,
                            "retrying request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            attempt,
                            error = %e,
                            url = %self.url,
                            method,
                            "max retries exceeded"
                        );
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
