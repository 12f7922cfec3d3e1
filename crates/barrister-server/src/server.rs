//! Dispatch engine
//!
//! A [`Server`] is immutable once built. Each call is resolved against the
//! schema, routed to the registered handler (cloned per call when the handler
//! is cloneable), run through the filter chain and converted back into a
//! JSON-RPC result or error.

use std::collections::HashMap;

use barrister_idl::Schema;
use barrister_json_rpc::{
    Envelope, EnvelopeItem, IDL_METHOD, JsonRpcError, JsonRpcMessage, JsonRpcRequest, encode,
    parse_envelope,
};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::builder::{ServerBuilder, ServerConfig};
use crate::context::{CallContext, RequestContext};
use crate::convert::Converter;
use crate::error::RpcError;
use crate::filter::{FilterAction, FilterChain};
use crate::handler::BoundInterface;

/// Split `Interface.operation`; both parts must be non-empty
pub fn parse_method(method: &str) -> Option<(&str, &str)> {
    method
        .split_once('.')
        .filter(|(interface, operation)| !interface.is_empty() && !operation.is_empty())
}

/// A sealed JSON-RPC server bound to one schema
pub struct Server {
    schema: Schema,
    config: ServerConfig,
    handlers: HashMap<String, BoundInterface>,
    filters: FilterChain,
}

impl Server {
    pub fn builder(schema: Schema) -> ServerBuilder {
        ServerBuilder::new(schema)
    }

    pub(crate) fn new(
        schema: Schema,
        config: ServerConfig,
        handlers: HashMap<String, BoundInterface>,
        filters: FilterChain,
    ) -> Self {
        Self {
            schema,
            config,
            handlers,
            filters,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Dispatch one call with an empty request context
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.call_with_context(method, params, &RequestContext::new())
            .await
    }

    pub async fn call_with_context(
        &self,
        method: &str,
        params: Vec<Value>,
        request: &RequestContext,
    ) -> Result<Value, RpcError> {
        if method == IDL_METHOD {
            return Ok(Value::Array(self.schema.elements().to_vec()));
        }

        let (Some(op), Some((interface, operation))) =
            (self.schema.operation(method), parse_method(method))
        else {
            return Err(RpcError::method_not_found(format!(
                "Unsupported method: {}",
                method
            )));
        };

        let bound = self.handlers.get(interface).ok_or_else(|| {
            RpcError::method_not_found(format!(
                "No handler registered for interface: {}",
                interface
            ))
        })?;

        let handler = bound.instance(request);

        let binding = bound.operation(operation).ok_or_else(|| {
            RpcError::method_not_found(format!(
                "Function {} not found on handler {}",
                operation, interface
            ))
        })?;

        for expected in [binding.arity(), op.params.len()] {
            if expected != params.len() {
                return Err(RpcError::invalid_params(format!(
                    "Method {} expects {} params but was passed {}",
                    method,
                    expected,
                    params.len()
                )));
            }
        }

        debug!("Dispatching {} with {} params", method, params.len());

        let mut ctx = CallContext::new(method, &params, request, handler);
        if self.filters.run_pre(&mut ctx).await == FilterAction::Stop {
            return ctx.into_outcome();
        }

        let converter = Converter::new(&self.schema);
        let mut args = Vec::with_capacity(params.len());
        for (index, ((value, field), shape)) in params
            .iter()
            .zip(&op.params)
            .zip(binding.param_shapes())
            .enumerate()
        {
            let converted = converter
                .convert(field, shape, value, &format!("param[{}]", index))
                .map_err(RpcError::from)?;
            args.push(converted);
        }

        let instance = ctx.handler_mut().freeze();
        let outcome = binding.invoke(instance, args).await;
        if let Err(err) = &outcome {
            debug!("{} failed: {}", method, err);
        }
        ctx.set_outcome(outcome);

        self.filters.run_post(&mut ctx).await;
        ctx.into_outcome()
    }

    /// Answer one decoded request
    pub async fn invoke_one(&self, request: JsonRpcRequest) -> JsonRpcMessage {
        self.invoke_one_with_context(request, &RequestContext::new())
            .await
    }

    pub async fn invoke_one_with_context(
        &self,
        request: JsonRpcRequest,
        ctx: &RequestContext,
    ) -> JsonRpcMessage {
        let params = request.positional_params();
        match self.call_with_context(&request.method, params, ctx).await {
            Ok(result) => JsonRpcMessage::success(request.id, result),
            Err(err) => JsonRpcMessage::error(request.id, err.into()),
        }
    }

    /// Answer every request; responses keep the request order
    pub async fn call_batch(&self, requests: Vec<JsonRpcRequest>) -> Vec<JsonRpcMessage> {
        let ctx = RequestContext::new();
        join_all(
            requests
                .into_iter()
                .map(|request| self.invoke_one_with_context(request, &ctx)),
        )
        .await
    }

    /// Decode a raw single or batch payload, dispatch it and encode the reply
    pub async fn invoke_bytes(&self, payload: &[u8]) -> Vec<u8> {
        self.invoke_bytes_with_context(payload, &RequestContext::new())
            .await
    }

    pub async fn invoke_bytes_with_context(&self, payload: &[u8], ctx: &RequestContext) -> Vec<u8> {
        match parse_envelope(payload) {
            Ok(Envelope::Single(item)) => {
                let reply = self.answer(item, ctx).await;
                self.encode_reply(&reply)
            }
            Ok(Envelope::Batch(items)) => {
                let replies = join_all(items.into_iter().map(|item| self.answer(item, ctx))).await;
                self.encode_reply(&replies)
            }
            Err(malformed) => {
                warn!("Rejecting malformed payload: {}", malformed.error.error);
                let reply = JsonRpcMessage::from(malformed.error);
                if malformed.batch {
                    self.encode_reply(&[reply])
                } else {
                    self.encode_reply(&reply)
                }
            }
        }
    }

    async fn answer(&self, item: EnvelopeItem, ctx: &RequestContext) -> JsonRpcMessage {
        match item {
            Ok(request) => self.invoke_one_with_context(request, ctx).await,
            Err(err) => JsonRpcMessage::Error(err),
        }
    }

    fn encode_reply<T: Serialize>(&self, reply: &T) -> Vec<u8> {
        match encode(reply, self.config.force_ascii) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Unable to encode response: {}", e);
                let fallback =
                    JsonRpcError::internal_error(None, Some(format!("Unable to encode response: {}", e)));
                encode(&fallback, self.config.force_ascii).unwrap_or_default()
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.len())
            .finish()
    }
}
