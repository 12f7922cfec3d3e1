use thiserror::Error;

/// Errors raised while loading an IDL document
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid IDL JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IDL document must be a JSON array of elements")]
    NotAnArray,

    #[error("malformed IDL element at index {index}: {source}")]
    InvalidElement {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("cyclic struct inheritance: {}", chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },

    #[error("failed to read IDL file: {0}")]
    Io(#[from] std::io::Error),
}
