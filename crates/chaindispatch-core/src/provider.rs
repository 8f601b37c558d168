//! The `Provider` trait — the transport boundary of the dispatch pipeline.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;
use crate::request::RpcResponse;

/// Performs the actual RPC call against a node.
///
/// Node-side failures come back as `Ok(RpcResponse::Error(..))`; only
/// transport failures (timeouts, connection errors) are `Err`.
///
/// # Object Safety
/// The trait is object-safe and is held by the manager as `Arc<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Send `method` with positional `params` and return the decoded response.
    async fn make_request(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<RpcResponse, ProviderError>;

    /// Identifier used in log events (URL or name).
    fn name(&self) -> &str {
        "provider"
    }
}
