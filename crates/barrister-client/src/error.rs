//! Error types for client operations

use barrister_json_rpc::{JsonRpcErrorCode, JsonRpcErrorObject, error_codes};
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by [`RemoteClient`](crate::RemoteClient)
#[derive(Error, Debug)]
pub enum ClientError {
    /// The transport failed to deliver the request or read the reply
    #[error("Transport error: {0}")]
    Transport(String),

    /// The outgoing request could not be encoded
    #[error("Unable to encode request: {0}")]
    Encode(String),

    /// The reply was not a valid JSON-RPC response
    #[error("Unable to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server answered with an error object
    #[error("Server error (code {}): {}", .0.code, .0.message)]
    Rpc(JsonRpcErrorObject),

    /// The IDL returned by the server could not be loaded
    #[error("Invalid IDL: {0}")]
    Schema(#[from] barrister_idl::SchemaError),
}

impl ClientError {
    /// JSON-RPC code equivalent of this error
    pub fn code(&self) -> i64 {
        match self {
            ClientError::Encode(_) => error_codes::INVALID_REQUEST,
            ClientError::Rpc(err) => err.code,
            ClientError::Transport(_) | ClientError::Decode(_) | ClientError::Schema(_) => {
                error_codes::INTERNAL_ERROR
            }
        }
    }

    /// Error object as a caller of [`RemoteClient::call`](crate::RemoteClient::call) sees it
    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            ClientError::Rpc(err) => err.clone(),
            other => JsonRpcErrorObject::new(
                JsonRpcErrorCode::from_code(other.code()),
                Some(other.to_string()),
                None,
            ),
        }
    }
}

impl From<JsonRpcErrorObject> for ClientError {
    fn from(err: JsonRpcErrorObject) -> Self {
        ClientError::Rpc(err)
    }
}
