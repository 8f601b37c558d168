//! Request/response types and the JSON-RPC 2.0 envelope.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

/// A single RPC parameter value.
pub type RpcParam = Value;

/// An application-level call: method name plus positional parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    pub params: Vec<RpcParam>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self { method: method.into(), params }
    }
}

/// A decoded provider response: exactly one of `result` or `error`.
///
/// Serialises as `{"result": …}` or `{"error": …}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcResponse {
    Result(Value),
    Error(Value),
}

impl RpcResponse {
    /// Returns `true` if the response carries an `error` payload.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Return the `result` value, or the `error` payload as `Err`.
    pub fn into_result(self) -> Result<Value, Value> {
        match self {
            Self::Result(v) => Ok(v),
            Self::Error(e) => Err(e),
        }
    }
}

/// JSON-RPC request ID — string, number, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    Null,
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A JSON-RPC 2.0 request envelope, as sent over the wire by transports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<RpcParam>,
    pub id: RpcId,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id: RpcId::Number(id),
        }
    }
}

/// A JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RpcId,
    /// `Some(Value::Null)` when the node sent `"result": null`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<JsonRpcResponse> for RpcResponse {
    type Error = ProviderError;

    fn try_from(resp: JsonRpcResponse) -> Result<Self, ProviderError> {
        // `error` wins: some nodes send `"result": null` next to an error.
        match (resp.result, resp.error) {
            (_, Some(err)) => Ok(RpcResponse::Error(err)),
            (Some(result), None) => Ok(RpcResponse::Result(result)),
            (None, None) => Err(ProviderError::MalformedResponse(format!(
                "response {} has neither result nor error",
                resp.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialization() {
        let req = JsonRpcRequest::new(1, "eth_blockNumber", vec![]);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"eth_blockNumber\""));
    }

    #[test]
    fn response_is_single_key_object() {
        let ok = RpcResponse::Result(json!("0x1"));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"result": "0x1"}));

        let err: RpcResponse = serde_json::from_value(json!({"error": {"code": -1}})).unwrap();
        assert!(err.is_error());
        assert_eq!(err.into_result().unwrap_err(), json!({"code": -1}));
    }

    #[test]
    fn envelope_with_result() {
        let env: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 7, "result": "0x12345"
        }))
        .unwrap();
        let resp = RpcResponse::try_from(env).unwrap();
        assert_eq!(resp, RpcResponse::Result(json!("0x12345")));
    }

    #[test]
    fn envelope_error_wins_over_null_result() {
        let env: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 1, "result": null,
            "error": {"code": -32000, "message": "execution reverted"}
        }))
        .unwrap();
        let resp = RpcResponse::try_from(env).unwrap();
        assert!(resp.is_error());
    }

    #[test]
    fn envelope_null_result_is_a_result() {
        let env: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 2, "result": null})).unwrap();
        let resp = RpcResponse::try_from(env).unwrap();
        assert_eq!(resp, RpcResponse::Result(Value::Null));
    }

    #[test]
    fn envelope_without_payload_is_malformed() {
        let env: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": "abc"})).unwrap();
        let err = RpcResponse::try_from(env).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
