//! Error types for the dispatch pipeline.

use serde_json::Value;
use thiserror::Error;

use crate::id::RequestId;

/// Errors raised by value formatters while converting between the wire
/// encoding and native values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A positional formatter expected an argument slot the parameter list lacks.
    #[error("formatter index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The value did not have the JSON shape the formatter expects.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: &'static str, got: String },

    /// A quantity string was not valid `0x`-prefixed hex.
    #[error("invalid hex quantity: {0:?}")]
    InvalidHex(String),

    /// The value does not fit into 256 bits.
    #[error("quantity overflows 256 bits: {0}")]
    Overflow(String),

    /// A byte string could not be rendered as ASCII.
    #[error("value is not ASCII-safe: {0:?}")]
    NotAscii(String),
}

impl FormatError {
    /// Build a [`FormatError::TypeMismatch`] describing the offending value.
    pub fn mismatch(expected: &'static str, got: &Value) -> Self {
        let got = match got {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        Self::TypeMismatch { expected, got: got.to_string() }
    }
}

/// Errors raised by a [`Provider`](crate::Provider) while talking to a node.
///
/// These are transport failures; a node-side `{error}` reply is a successful
/// provider call and is surfaced as [`DispatchError::Rpc`] instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed (connection refused, bad status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request timed out after the configured duration.
    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response body could not be deserialized.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Response envelope carried neither `result` nor `error`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Returns `true` if this error is transient and the call may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }
}

/// Errors surfaced to callers of the [`RequestManager`](crate::RequestManager).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The node answered with an `error` payload, carried verbatim.
    #[error("RPC error: {0}")]
    Rpc(Value),

    /// A request or result formatter failed.
    #[error("formatting failed: {0}")]
    Format(#[from] FormatError),

    /// `receive_blocking` was called for an id that is not pending.
    #[error("request for id:{id} not found")]
    UnknownPendingRequest { id: RequestId },

    /// Another call with the same id is still in flight.
    #[error("request id {id} is already in flight")]
    DuplicateRequestId { id: RequestId },

    /// The operation exists for API parity but is not implemented.
    #[error("{operation} is not supported")]
    Unsupported { operation: &'static str },

    /// The provider failed to deliver a response.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// `receive_blocking` gave up waiting. The underlying call keeps running.
    #[error("timed out after {ms}ms waiting for request {id}")]
    ReceiveTimeout { id: RequestId, ms: u64 },

    /// The spawned unit of work panicked or was cancelled.
    #[error("async request {id} failed: {reason}")]
    TaskFailed { id: RequestId, reason: String },
}

impl DispatchError {
    /// Returns `true` if the node itself rejected the call.
    pub fn is_rpc(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    /// The node's error payload, if this is an RPC error.
    pub fn rpc_payload(&self) -> Option<&Value> {
        match self {
            Self::Rpc(payload) => Some(payload),
            _ => None,
        }
    }
}
