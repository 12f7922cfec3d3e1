//! # Server Prelude
//!
//! Common imports for implementing and serving Barrister handlers.
//!
//! ```rust
//! use barrister_server::prelude::*;
//! ```

pub use barrister_idl::{FieldSpec, Schema};
pub use barrister_json_rpc::{JsonRpcMessage, JsonRpcRequest, RequestId};

pub use crate::{
    CallContext, Cloneable, ConfigError, Filter, FilterAction, InterfaceHandler, RequestContext,
    RpcError, Server, ServerBuilder, ServerConfig, Shaped, TargetShape,
};
