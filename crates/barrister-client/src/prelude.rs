//! # Client Prelude
//!
//! ```rust
//! use barrister_client::prelude::*;
//! ```

pub use barrister_json_rpc::{JsonRpcMessage, JsonRpcRequest};

pub use crate::{ClientConfig, ClientError, ClientResult, LocalTransport, RemoteClient, Transport};
