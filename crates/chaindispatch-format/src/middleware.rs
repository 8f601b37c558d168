//! Formatting middleware backed by the method formatter tables.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chaindispatch_core::{
    middleware_builder, DispatchError, FormatError, Middleware, MiddlewareBuilder, Provider,
    RequestId, RpcRequest, RpcResponse,
};
use serde_json::Value;

use crate::tables::{request_formatters, result_formatters, FormatterTable};

/// Converts parameters to wire encoding and results back to native values.
///
/// The method name is remembered per request id between the request and the
/// response pass, since responses do not carry it. `RequestManager` never
/// has two calls with the same id in flight.
pub struct FormattingMiddleware {
    provider: Arc<dyn Provider>,
    request_formatters: &'static FormatterTable,
    result_formatters: &'static FormatterTable,
    in_flight: Mutex<HashMap<RequestId, String>>,
}

impl FormattingMiddleware {
    /// Middleware using the built-in tables.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self::with_tables(provider, request_formatters(), result_formatters())
    }

    pub fn with_tables(
        provider: Arc<dyn Provider>,
        request_formatters: &'static FormatterTable,
        result_formatters: &'static FormatterTable,
    ) -> Self {
        Self {
            provider,
            request_formatters,
            result_formatters,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Builder for [`RequestManager::new`](chaindispatch_core::RequestManager::new).
    pub fn builder() -> MiddlewareBuilder {
        middleware_builder(FormattingMiddleware::new)
    }

    /// Requests whose response has not come back yet.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestId, String>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Middleware for FormattingMiddleware {
    fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    fn name(&self) -> &str {
        "formatting"
    }

    fn process_request(
        &self,
        request_id: &RequestId,
        request: RpcRequest,
    ) -> Result<RpcRequest, DispatchError> {
        let RpcRequest { method, params } = request;

        let params = match self.request_formatters.apply(&method, Value::Array(params))? {
            Value::Array(params) => params,
            other => return Err(FormatError::mismatch("parameter array", &other).into()),
        };

        if self.result_formatters.contains(&method) {
            self.lock().insert(request_id.clone(), method.clone());
        }
        Ok(RpcRequest { method, params })
    }

    fn process_response(
        &self,
        request_id: &RequestId,
        response: RpcResponse,
    ) -> Result<RpcResponse, DispatchError> {
        let Some(method) = self.lock().remove(request_id) else {
            return Ok(response);
        };
        match response {
            RpcResponse::Result(result) => {
                let formatted = self.result_formatters.apply(&method, result).map_err(|e| {
                    tracing::debug!(request_id = %request_id, method = %method, error = %e, "result formatting failed");
                    e
                })?;
                Ok(RpcResponse::Result(formatted))
            }
            error @ RpcResponse::Error(_) => Ok(error),
        }
    }

    fn release(&self, request_id: &RequestId) {
        self.lock().remove(request_id);
    }
}
