use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{JsonRpcVersion, RequestId};

/// A JSON-RPC request
///
/// `params` is kept as a raw value: an array carries positional arguments, any
/// other non-null value is a single positional argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc", default)]
    pub version: JsonRpcVersion,
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: Option<RequestId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            method: method.into(),
            params,
        }
    }

    /// Create a new request with no parameters
    pub fn new_no_params(id: RequestId, method: impl Into<String>) -> Self {
        Self::new(Some(id), method, None)
    }

    /// Create a new request with positional parameters
    pub fn new_with_array_params(
        id: RequestId,
        method: impl Into<String>,
        params: Vec<Value>,
    ) -> Self {
        Self::new(Some(id), method, Some(Value::Array(params)))
    }

    /// Positional arguments for the call
    pub fn positional_params(&self) -> Vec<Value> {
        match &self.params {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
        }
    }

    /// Get a parameter by index
    pub fn get_param_index(&self, index: usize) -> Option<&Value> {
        match self.params.as_ref()? {
            Value::Array(items) => items.get(index),
            single if index == 0 => Some(single),
            _ => None,
        }
    }
}
