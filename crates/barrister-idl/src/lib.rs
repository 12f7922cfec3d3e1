//! # Barrister IDL
//!
//! Schema model for Barrister services. An IDL document is an ordered list of
//! `meta`, `comment`, `interface`, `struct` and `enum` elements; loading it builds
//! indexed registries used by the server for validation and dispatch:
//!
//! - interface name to ordered operations, plus a flat `"Interface.operation"` index
//! - struct name to definition with its precomputed effective (inherited) fields
//! - enum name to ordered literals
//!
//! ```rust
//! use barrister_idl::Schema;
//!
//! let schema = Schema::from_json(br#"[
//!     {"type": "interface", "name": "Echo", "functions": [
//!         {"name": "echo", "params": [{"name": "s", "type": "string"}],
//!          "returns": {"type": "string", "optional": true}}
//!     ]}
//! ]"#).unwrap();
//! assert!(schema.operation("Echo.echo").is_some());
//! ```

pub mod element;
pub mod error;
pub mod schema;

pub use element::{
    CommentElement, EnumSpec, EnumValue, FieldSpec, InterfaceSpec, MetaElement, OperationSpec,
    PRIMITIVE_TYPES, SchemaElement, StructSpec,
};
pub use error::SchemaError;
pub use schema::{Meta, Schema, StructDef};
