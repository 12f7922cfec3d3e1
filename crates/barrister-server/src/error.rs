//! Error types for conversion, registration and dispatch

use barrister_json_rpc::{JsonRpcErrorCode, JsonRpcErrorObject, error_codes};
use serde_json::Value;
use thiserror::Error;

/// A value could not be bound to a target shape
///
/// `path` locates the offending value, e.g. `param[0].addresses[1].street`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {reason}")]
pub struct TypeError {
    pub path: String,
    pub reason: String,
}

impl TypeError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Fatal handler registration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IDL has no interface: {0}")]
    UnknownInterface(String),

    #[error("a handler is already registered for interface: {0}")]
    DuplicateInterface(String),

    #[error("{interface} handler has no operation named: {operation}")]
    MissingOperation { interface: String, operation: String },

    #[error("{interface} handler operation {operation} accepts {actual} params but IDL specifies {expected}")]
    ArityMismatch {
        interface: String,
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("{location} has invalid type {shape}: {source}")]
    InvalidType {
        location: String,
        shape: String,
        #[source]
        source: TypeError,
    },
}

/// The per-call error value returned by operations, filters and dispatch
#[derive(Debug, Clone, PartialEq, Error)]
#[error("code: {code} message: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::new(error_codes::METHOD_NOT_FOUND, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }

    /// Business error; codes in -32099..=-32000 or outside the reserved range
    pub fn application(code: i64, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }
}

impl From<RpcError> for JsonRpcErrorObject {
    fn from(err: RpcError) -> Self {
        JsonRpcErrorObject::new(JsonRpcErrorCode::from_code(err.code), Some(err.message), err.data)
    }
}

impl From<JsonRpcErrorObject> for RpcError {
    fn from(obj: JsonRpcErrorObject) -> Self {
        Self {
            code: obj.code,
            message: obj.message,
            data: obj.data,
        }
    }
}

impl From<TypeError> for RpcError {
    fn from(err: TypeError) -> Self {
        Self::invalid_params(err.to_string())
    }
}

/// Conversion of an operation's error value into the wire error
///
/// Errors that already are [`RpcError`]s pass through unchanged; anything else
/// becomes an application error naming the method.
pub trait IntoRpcError {
    fn into_rpc_error(self, method: &str) -> RpcError;
}

fn unknown_error(method: &str, err: impl std::fmt::Display) -> RpcError {
    RpcError::application(
        error_codes::APPLICATION_ERROR,
        format!("method '{}' raised unknown error: {}", method, err),
    )
}

impl IntoRpcError for RpcError {
    fn into_rpc_error(self, _method: &str) -> RpcError {
        self
    }
}

impl IntoRpcError for anyhow::Error {
    fn into_rpc_error(self, method: &str) -> RpcError {
        match self.downcast::<RpcError>() {
            Ok(err) => err,
            Err(other) => unknown_error(method, other),
        }
    }
}

impl IntoRpcError for Box<dyn std::error::Error + Send + Sync> {
    fn into_rpc_error(self, method: &str) -> RpcError {
        match self.downcast::<RpcError>() {
            Ok(err) => *err,
            Err(other) => unknown_error(method, other),
        }
    }
}

impl IntoRpcError for std::convert::Infallible {
    fn into_rpc_error(self, _method: &str) -> RpcError {
        match self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rpc_error_to_wire() {
        let err = RpcError::application(800, "errmsg here").with_data(json!({"k": 1}));
        let obj: JsonRpcErrorObject = err.clone().into();
        assert_eq!(obj.code, 800);
        assert_eq!(obj.message, "errmsg here");
        assert_eq!(obj.data, Some(json!({"k": 1})));
        assert_eq!(RpcError::from(obj), err);
    }

    #[test]
    fn test_type_error_becomes_invalid_params() {
        let err: RpcError = TypeError::new("param[0].age", "missing required field age").into();
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "param[0].age: missing required field age");
    }

    #[test]
    fn test_foreign_errors_are_wrapped() {
        let err = anyhow::anyhow!("disk full").into_rpc_error("A.add");
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "method 'A.add' raised unknown error: disk full");

        let err = anyhow::Error::new(RpcError::application(-32001, "denied")).into_rpc_error("A.add");
        assert_eq!(err.code, -32001);
        assert_eq!(err.message, "denied");

        let boxed: Box<dyn std::error::Error + Send + Sync> = "bad input".into();
        let err = boxed.into_rpc_error("B.echo");
        assert_eq!(err.message, "method 'B.echo' raised unknown error: bad input");
    }
}
