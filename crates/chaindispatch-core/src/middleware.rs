//! Middleware — composable request/response transform stages.
//!
//! A manager holds an ordered chain of middlewares. For a chain `[A, B]`:
//!
//! ```text
//! caller → A.process_request → B.process_request → provider
//! caller ← A.process_response ← B.process_response ← provider
//! ```
//!
//! Each middleware is built against the provider that is active when the
//! chain is (re)built, so a provider swap rebuilds the whole chain.

use std::sync::Arc;

use crate::error::DispatchError;
use crate::id::RequestId;
use crate::provider::Provider;
use crate::request::{RpcRequest, RpcResponse};

/// A request/response transform stage.
///
/// Both hooks default to identity; implementors override only what they need.
/// Hooks must not block: they run inline on the dispatching task.
pub trait Middleware: Send + Sync {
    /// The provider this middleware was built against.
    fn provider(&self) -> &Arc<dyn Provider>;

    /// Name used in log events.
    fn name(&self) -> &str {
        "middleware"
    }

    /// Transform the outgoing request.
    fn process_request(
        &self,
        _request_id: &RequestId,
        request: RpcRequest,
    ) -> Result<RpcRequest, DispatchError> {
        Ok(request)
    }

    /// Transform the decoded response.
    fn process_response(
        &self,
        _request_id: &RequestId,
        response: RpcResponse,
    ) -> Result<RpcResponse, DispatchError> {
        Ok(response)
    }

    /// Called instead of `process_response` when the call is abandoned after
    /// this middleware's `process_request` ran (provider failure, or a later
    /// stage rejected the request). Middlewares holding per-request state drop
    /// it here.
    fn release(&self, _request_id: &RequestId) {}
}

/// Builds a middleware instance against a given provider.
pub type MiddlewareBuilder =
    Arc<dyn Fn(Arc<dyn Provider>) -> Arc<dyn Middleware> + Send + Sync>;

/// Wrap a constructor such as `MyMiddleware::new` into a [`MiddlewareBuilder`].
pub fn middleware_builder<M, F>(build: F) -> MiddlewareBuilder
where
    M: Middleware + 'static,
    F: Fn(Arc<dyn Provider>) -> M + Send + Sync + 'static,
{
    Arc::new(move |provider| Arc::new(build(provider)) as Arc<dyn Middleware>)
}

/// Identity middleware. Useful as a placeholder stage.
pub struct BaseMiddleware {
    provider: Arc<dyn Provider>,
}

impl BaseMiddleware {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }
}

impl Middleware for BaseMiddleware {
    fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    fn name(&self) -> &str {
        "base"
    }
}

/// Run the request pass: declared order, first middleware sees the raw request.
///
/// On failure, the stages that already accepted the request are released.
pub(crate) fn process_request(
    middlewares: &[Arc<dyn Middleware>],
    request_id: &RequestId,
    mut request: RpcRequest,
) -> Result<RpcRequest, DispatchError> {
    for (idx, mw) in middlewares.iter().enumerate() {
        request = match mw.process_request(request_id, request) {
            Ok(req) => req,
            Err(e) => {
                tracing::debug!(
                    request_id = %request_id,
                    middleware = mw.name(),
                    error = %e,
                    "request rejected by middleware"
                );
                release(&middlewares[..idx], request_id);
                return Err(e);
            }
        };
    }
    Ok(request)
}

/// Run the response pass: reverse of the request pass.
///
/// On failure, the stages the response never reached are released.
pub(crate) fn process_response(
    middlewares: &[Arc<dyn Middleware>],
    request_id: &RequestId,
    mut response: RpcResponse,
) -> Result<RpcResponse, DispatchError> {
    for idx in (0..middlewares.len()).rev() {
        let mw = &middlewares[idx];
        response = match mw.process_response(request_id, response) {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!(
                    request_id = %request_id,
                    middleware = mw.name(),
                    error = %e,
                    "response rejected by middleware"
                );
                release(&middlewares[..idx], request_id);
                return Err(e);
            }
        };
    }
    Ok(response)
}

/// Release every stage in `middlewares`.
pub(crate) fn release(middlewares: &[Arc<dyn Middleware>], request_id: &RequestId) {
    for mw in middlewares {
        mw.release(request_id);
    }
}
