use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JsonRpcError, JsonRpcErrorObject};
use crate::types::{JsonRpcVersion, RequestId};

/// A successful JSON-RPC response
///
/// `result` is always present on the wire, `null` for operations that return
/// an absent optional value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub id: Option<RequestId>,
    pub result: Value,
}

impl JsonRpcResponse {
    pub fn new(id: Option<RequestId>, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            result,
        }
    }

    pub fn null(id: Option<RequestId>) -> Self {
        Self::new(id, Value::Null)
    }
}

impl From<(Option<RequestId>, Value)> for JsonRpcResponse {
    fn from((id, result): (Option<RequestId>, Value)) -> Self {
        Self::new(id, result)
    }
}

/// Union type that represents either a successful response or an error response
///
/// The error variant is listed first so that decoding an error envelope never
/// matches the success shape with a defaulted `result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// Error response with error field
    Error(JsonRpcError),
    /// Successful response with result field
    Response(JsonRpcResponse),
}

impl JsonRpcMessage {
    /// Create a success message
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self::Response(JsonRpcResponse::new(id, result))
    }

    /// Create an error message
    pub fn error(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self::Error(JsonRpcError::new(id, error))
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcMessage::Error(_))
    }

    /// Get the request ID from either response or error
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcMessage::Response(resp) => resp.id.as_ref(),
            JsonRpcMessage::Error(err) => err.id.as_ref(),
        }
    }

    /// Result value, if this is a success
    pub fn result(&self) -> Option<&Value> {
        match self {
            JsonRpcMessage::Response(resp) => Some(&resp.result),
            JsonRpcMessage::Error(_) => None,
        }
    }

    /// Error object, if this is a failure
    pub fn error_object(&self) -> Option<&JsonRpcErrorObject> {
        match self {
            JsonRpcMessage::Response(_) => None,
            JsonRpcMessage::Error(err) => Some(&err.error),
        }
    }

    /// Split into the `(result, error)` pair handed back to callers
    pub fn into_result(self) -> Result<Value, JsonRpcErrorObject> {
        match self {
            JsonRpcMessage::Response(resp) => Ok(resp.result),
            JsonRpcMessage::Error(err) => Err(err.error),
        }
    }
}

impl From<JsonRpcResponse> for JsonRpcMessage {
    fn from(response: JsonRpcResponse) -> Self {
        Self::Response(response)
    }
}

impl From<JsonRpcError> for JsonRpcMessage {
    fn from(error: JsonRpcError) -> Self {
        Self::Error(error)
    }
}
