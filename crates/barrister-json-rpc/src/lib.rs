//! # JSON-RPC 2.0 Envelope
//!
//! A pure, transport-agnostic implementation of the JSON-RPC 2.0 envelope used by
//! Barrister IDL services. This crate knows nothing about schemas or handlers; it
//! provides the request/response/error types, batch detection and the encoder
//! shared by the server and client crates.
//!
//! ## Features
//! - Single and batch envelopes (`{` vs `[` detection on the raw payload)
//! - Positional parameters, including the single non-array value shorthand
//! - Structured error objects with the standard JSON-RPC error codes
//! - Optional ASCII-only encoding of outgoing payloads

pub mod envelope;
pub mod error;
pub mod request;
pub mod response;
pub mod types;

pub mod prelude;

// Re-export main types
pub use envelope::{Envelope, EnvelopeItem, MalformedEnvelope, encode, is_batch, parse_envelope};
pub use error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, JsonRpcTransportError};
pub use request::JsonRpcRequest;
pub use response::{JsonRpcMessage, JsonRpcResponse};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Reserved method returning the loaded IDL document
pub const IDL_METHOD: &str = "barrister-idl";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    /// Default code for application errors raised by handlers
    pub const APPLICATION_ERROR: i64 = -32000;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
