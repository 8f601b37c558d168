//! The request manager — owns the provider and the middleware chain.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use serde_json::Value;

use crate::error::DispatchError;
use crate::id::RequestId;
use crate::middleware::{self, Middleware, MiddlewareBuilder};
use crate::pending::PendingRequests;
use crate::provider::Provider;
use crate::request::RpcRequest;

/// Log target of deprecation events.
pub const DEPRECATION_TARGET: &str = "chaindispatch::deprecation";

/// Signal returned by deprecated entry points.
///
/// The call itself still succeeded; this only tells the caller to migrate.
#[must_use = "deprecated API used; migrate to the replacement"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    /// The deprecated entry point.
    pub api: &'static str,
    /// What to call instead.
    pub replacement: &'static str,
}

impl std::fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "the `{}` API has been deprecated; use `{}` instead",
            self.api, self.replacement
        )
    }
}

/// The active provider and the middleware chain built against it.
///
/// Swapped as a unit so a request never sees a chain built for another
/// provider.
struct Stack {
    provider: Arc<dyn Provider>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Stack {
    fn build(provider: Arc<dyn Provider>, builders: &[MiddlewareBuilder]) -> Self {
        let middlewares = builders.iter().map(|build| build(provider.clone())).collect();
        Self { provider, middlewares }
    }
}

struct ManagerInner {
    builders: Vec<MiddlewareBuilder>,
    stack: RwLock<Arc<Stack>>,
    pending: PendingRequests,
    /// Ids of calls between `process_request` and the end of the response
    /// pass. Middlewares correlate the two passes by id.
    in_flight: Mutex<HashSet<RequestId>>,
}

impl ManagerInner {
    fn claim(&self, id: &RequestId) -> Result<InFlight<'_>, DispatchError> {
        let mut ids = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(id.clone()) {
            return Err(DispatchError::DuplicateRequestId { id: id.clone() });
        }
        Ok(InFlight { ids: &self.in_flight, id: id.clone() })
    }
}

/// Frees its id when the call finishes or is dropped mid-flight.
struct InFlight<'a> {
    ids: &'a Mutex<HashSet<RequestId>>,
    id: RequestId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Dispatches RPC calls through the middleware chain to the active provider.
///
/// Cloning is cheap; clones share the provider, the chain and the
/// pending-request table.
///
/// Each call snapshots the provider and chain on entry: a concurrent
/// [`set_provider`](Self::set_provider) affects later calls only.
#[derive(Clone)]
pub struct RequestManager {
    inner: Arc<ManagerInner>,
}

impl RequestManager {
    /// Create a manager with `provider` and a chain built from `builders`,
    /// in the given order.
    pub fn new(provider: Arc<dyn Provider>, builders: Vec<MiddlewareBuilder>) -> Self {
        let stack = Stack::build(provider, &builders);
        Self {
            inner: Arc::new(ManagerInner {
                builders,
                stack: RwLock::new(Arc::new(stack)),
                pending: PendingRequests::new(),
                in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Create a manager with no middleware.
    pub fn with_provider(provider: Arc<dyn Provider>) -> Self {
        Self::new(provider, Vec::new())
    }

    fn snapshot(&self) -> Arc<Stack> {
        self.inner
            .stack
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The active provider.
    pub fn provider(&self) -> Arc<dyn Provider> {
        self.snapshot().provider.clone()
    }

    /// The middleware chain, in declared order.
    pub fn middlewares(&self) -> Vec<Arc<dyn Middleware>> {
        self.snapshot().middlewares.clone()
    }

    /// Replace the active provider and rebuild the chain against it.
    pub fn set_provider(&self, provider: Arc<dyn Provider>) {
        let stack = Arc::new(Stack::build(provider, &self.inner.builders));
        tracing::debug!(
            provider = stack.provider.name(),
            middlewares = stack.middlewares.len(),
            "provider replaced"
        );
        *self.inner.stack.write().unwrap_or_else(PoisonError::into_inner) = stack;
    }

    /// Replace the active provider via the legacy entry point.
    ///
    /// Behaves exactly like [`set_provider`](Self::set_provider) and
    /// additionally emits one deprecation event.
    #[deprecated(since = "0.2.0", note = "use `RequestManager::set_provider` instead")]
    pub fn legacy_set_provider(&self, provider: Arc<dyn Provider>) -> DeprecationNotice {
        let notice = DeprecationNotice {
            api: "legacy_set_provider",
            replacement: "set_provider",
        };
        tracing::warn!(target: DEPRECATION_TARGET, api = notice.api, "{notice}");
        self.set_provider(provider);
        notice
    }

    /// Send a call and wait for its normalized result.
    ///
    /// A fresh [`RequestId`] is generated unless `request_id` is given. The
    /// request runs through the chain in declared order, the response in
    /// reverse order. An `error` reply becomes [`DispatchError::Rpc`].
    ///
    /// Fails with [`DispatchError::DuplicateRequestId`], before any
    /// middleware runs, while another call with the same id is in flight.
    pub async fn request_blocking(
        &self,
        method: &str,
        params: Vec<Value>,
        request_id: Option<RequestId>,
    ) -> Result<Value, DispatchError> {
        let request_id = request_id.unwrap_or_else(RequestId::random);
        let _in_flight = self.inner.claim(&request_id)?;
        let stack = self.snapshot();

        let request = middleware::process_request(
            &stack.middlewares,
            &request_id,
            RpcRequest::new(method, params),
        )?;

        tracing::debug!(
            request_id = %request_id,
            method = %request.method,
            provider = stack.provider.name(),
            "dispatching request"
        );

        let raw = match stack.provider.make_request(&request.method, request.params).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(request_id = %request_id, error = %e, "provider failed");
                middleware::release(&stack.middlewares, &request_id);
                return Err(e.into());
            }
        };

        middleware::process_response(&stack.middlewares, &request_id, raw)?
            .into_result()
            .map_err(|error| {
                tracing::debug!(request_id = %request_id, error = %error, "node returned error");
                DispatchError::Rpc(error)
            })
    }

    /// Dispatch a call on a background task and return its id immediately.
    ///
    /// Collect the result with [`receive_blocking`](Self::receive_blocking).
    /// Must be called from within a Tokio runtime.
    pub fn request_async(&self, method: impl Into<String>, params: Vec<Value>) -> RequestId {
        let request_id = RequestId::random();
        let method = method.into();
        let manager = self.clone();
        let task_id = request_id.clone();
        let handle = tokio::spawn(async move {
            manager.request_blocking(&method, params, Some(task_id)).await
        });
        self.inner.pending.insert(request_id.clone(), handle);
        request_id
    }

    /// Wait for the result of a call started with
    /// [`request_async`](Self::request_async).
    ///
    /// The pending entry is consumed even when the wait times out; the
    /// underlying call is not cancelled and its result is dropped.
    pub async fn receive_blocking(
        &self,
        request_id: &RequestId,
        timeout: Option<Duration>,
    ) -> Result<Value, DispatchError> {
        let handle = self
            .inner
            .pending
            .take(request_id)
            .ok_or_else(|| DispatchError::UnknownPendingRequest { id: request_id.clone() })?;

        let joined = match timeout {
            None => handle.await,
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(
                        request_id = %request_id,
                        timeout_ms = limit.as_millis() as u64,
                        "receive timed out; abandoning in-flight request"
                    );
                    return Err(DispatchError::ReceiveTimeout {
                        id: request_id.clone(),
                        ms: limit.as_millis() as u64,
                    });
                }
            },
        };

        joined.map_err(|e| DispatchError::TaskFailed {
            id: request_id.clone(),
            reason: e.to_string(),
        })?
    }

    /// Callback-style delivery is not implemented.
    pub fn receive_async(&self, _request_id: &RequestId) -> Result<Value, DispatchError> {
        Err(DispatchError::Unsupported { operation: "receive_async" })
    }

    /// Number of async calls dispatched but not yet received.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }
}
