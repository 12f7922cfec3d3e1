//! # Barrister Server
//!
//! Schema-validated JSON-RPC dispatch for services described by a Barrister IDL.
//!
//! Handlers are plain Rust values bound to an IDL interface with
//! [`InterfaceHandler`]. Binding records a typed closure per operation; when the
//! handler is registered every operation is checked against the schema with
//! synthesized sample values, so signature mismatches fail at startup instead of
//! on the first call.
//!
//! ## Features
//! - Conversion of untyped wire values into handler shapes, with enum membership,
//!   integral-number and optionality checks
//! - Per-call handler cloning for request-scoped state
//! - Pre/post filters around every call
//! - Single and batch envelopes, `barrister-idl` introspection, ASCII-only output
//!
//! ```rust
//! use barrister_idl::Schema;
//! use barrister_server::{InterfaceHandler, RpcError, Server};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::from_json(br#"[
//!     {"type": "interface", "name": "Echo", "functions": [
//!         {"name": "echo", "params": [{"name": "s", "type": "string"}],
//!          "returns": {"type": "string"}}
//!     ]}
//! ]"#)?;
//!
//! let server = Server::builder(schema)
//!     .handler(InterfaceHandler::new("Echo", ()).operation(
//!         "echo",
//!         |_h, (s,): (String,)| async move { Ok::<_, RpcError>(s) },
//!     ))?
//!     .build();
//!
//! let reply = server
//!     .invoke_bytes(br#"{"jsonrpc": "2.0", "id": 1, "method": "Echo.echo", "params": ["hi"]}"#)
//!     .await;
//! assert_eq!(reply, br#"{"jsonrpc":"2.0","id":1,"result":"hi"}"#);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod context;
pub mod convert;
pub mod error;
pub mod filter;
pub mod handler;
pub mod server;
pub mod shape;
pub mod validate;

pub mod prelude;

// Re-export main types
pub use builder::{ServerBuilder, ServerConfig};
pub use context::{CallContext, HandlerInstance, RequestContext};
pub use convert::{Converter, test_value};
pub use error::{ConfigError, IntoRpcError, RpcError, TypeError};
pub use filter::{Filter, FilterAction, FilterChain};
pub use handler::{BoundInterface, Cloneable, InterfaceHandler, OperationBinding, Params};
pub use server::{Server, parse_method};
pub use shape::{Primitive, Shaped, StructShape, TargetShape};
pub use validate::validate_handler;
