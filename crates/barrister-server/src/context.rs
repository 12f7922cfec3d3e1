//! Per-request and per-call context

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::RpcError;

/// Transport-supplied information about the request being served
///
/// Header names are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HashMap<String, Vec<String>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header value
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .entry(name.as_ref().to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// First value of a header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().map(String::as_str)
    }

    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn headers(&self) -> &HashMap<String, Vec<String>> {
        &self.headers
    }
}

impl From<HashMap<String, Vec<String>>> for RequestContext {
    fn from(headers: HashMap<String, Vec<String>>) -> Self {
        let mut ctx = Self::new();
        for (name, values) in headers {
            for value in values {
                ctx.add_header(&name, value);
            }
        }
        ctx
    }
}

/// The handler instance resolved for one call
///
/// `Owned` holds a per-call clone and may be mutated by pre-invoke filters;
/// `Shared` is the registered instance.
pub enum HandlerInstance {
    Shared(Arc<dyn Any + Send + Sync>),
    Owned(Box<dyn Any + Send + Sync>),
}

impl HandlerInstance {
    pub fn is_shared(&self) -> bool {
        matches!(self, HandlerInstance::Shared(_))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            HandlerInstance::Shared(shared) => shared.downcast_ref(),
            HandlerInstance::Owned(owned) => owned.downcast_ref(),
        }
    }

    /// Mutable access; only available on a per-call clone
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            HandlerInstance::Shared(_) => None,
            HandlerInstance::Owned(owned) => owned.downcast_mut(),
        }
    }

    /// Replace a per-call clone with a shared handle to it and return the handle
    pub(crate) fn freeze(&mut self) -> Arc<dyn Any + Send + Sync> {
        let shared: Arc<dyn Any + Send + Sync> = match self {
            HandlerInstance::Shared(shared) => shared.clone(),
            HandlerInstance::Owned(owned) => Arc::from(std::mem::replace(owned, Box::new(()))),
        };
        *self = HandlerInstance::Shared(shared.clone());
        shared
    }
}

impl std::fmt::Debug for HandlerInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerInstance::Shared(_) => f.write_str("HandlerInstance::Shared"),
            HandlerInstance::Owned(_) => f.write_str("HandlerInstance::Owned"),
        }
    }
}

/// State threaded through the filter chain for a single call
#[derive(Debug)]
pub struct CallContext<'a> {
    method: &'a str,
    params: &'a [Value],
    request: &'a RequestContext,
    handler: HandlerInstance,
    outcome: Option<Result<Value, RpcError>>,
}

impl<'a> CallContext<'a> {
    pub fn new(
        method: &'a str,
        params: &'a [Value],
        request: &'a RequestContext,
        handler: HandlerInstance,
    ) -> Self {
        Self {
            method,
            params,
            request,
            handler,
            outcome: None,
        }
    }

    pub fn method(&self) -> &str {
        self.method
    }

    /// Positional params as received, before conversion
    pub fn params(&self) -> &[Value] {
        self.params
    }

    pub fn request(&self) -> &RequestContext {
        self.request
    }

    pub fn handler(&self) -> &HandlerInstance {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut HandlerInstance {
        &mut self.handler
    }

    pub fn result(&self) -> Option<&Value> {
        self.outcome.as_ref().and_then(|o| o.as_ref().ok())
    }

    pub fn error(&self) -> Option<&RpcError> {
        self.outcome.as_ref().and_then(|o| o.as_ref().err())
    }

    pub fn set_result(&mut self, result: Value) {
        self.outcome = Some(Ok(result));
    }

    pub fn set_error(&mut self, error: RpcError) {
        self.outcome = Some(Err(error));
    }

    pub fn set_outcome(&mut self, outcome: Result<Value, RpcError>) {
        self.outcome = Some(outcome);
    }

    /// Final answer of the call; an empty slot is a null result
    pub fn into_outcome(self) -> Result<Value, RpcError> {
        self.outcome.unwrap_or(Ok(Value::Null))
    }
}
