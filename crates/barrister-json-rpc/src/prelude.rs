//! # JSON-RPC Prelude
//!
//! Convenient re-exports of the most commonly used envelope types.
//!
//! ```rust
//! use barrister_json_rpc::prelude::*;
//! ```

pub use crate::envelope::{Envelope, EnvelopeItem, MalformedEnvelope, encode, is_batch, parse_envelope};
pub use crate::error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject};
pub use crate::request::JsonRpcRequest;
pub use crate::response::{JsonRpcMessage, JsonRpcResponse};
pub use crate::types::{JsonRpcVersion, RequestId};

// Standard error codes
pub use crate::error_codes::*;
