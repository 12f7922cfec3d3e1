//! # Barrister Client
//!
//! Positional-parameter JSON-RPC calls against Barrister IDL services over any
//! byte-level [`Transport`].
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use barrister_client::{LocalTransport, RemoteClient};
//! use barrister_idl::Schema;
//! use barrister_server::{InterfaceHandler, RpcError, Server};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::from_json(br#"[
//!     {"type": "interface", "name": "Echo", "functions": [
//!         {"name": "echo", "params": [{"name": "s", "type": "string"}],
//!          "returns": {"type": "string"}}
//!     ]}
//! ]"#)?;
//! let server = Server::builder(schema)
//!     .handler(InterfaceHandler::new("Echo", ()).operation(
//!         "echo",
//!         |_h, (s,): (String,)| async move { Ok::<_, RpcError>(s) },
//!     ))?
//!     .build();
//!
//! let client = RemoteClient::new(LocalTransport::new(Arc::new(server)));
//! assert_eq!(client.call("Echo.echo", vec![json!("hi")]).await?, json!("hi"));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub mod prelude;

// Re-export main types
pub use client::RemoteClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use transport::{LocalTransport, Transport};
