//! Byte-level transports
//!
//! A transport moves one encoded request (single or batch) to a server and
//! returns the raw reply. Network transports live outside this crate;
//! [`LocalTransport`] talks to an in-process [`Server`].

use std::sync::Arc;

use async_trait::async_trait;
use barrister_server::{RequestContext, Server};
use tracing::trace;

use crate::error::ClientResult;

/// Transport trait implemented by every request carrier
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an encoded request and wait for the encoded reply
    async fn send(&self, payload: Vec<u8>) -> ClientResult<Vec<u8>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, payload: Vec<u8>) -> ClientResult<Vec<u8>> {
        (**self).send(payload).await
    }
}

/// Transport dispatching straight into a [`Server`] in the same process
#[derive(Debug, Clone)]
pub struct LocalTransport {
    server: Arc<Server>,
    context: RequestContext,
}

impl LocalTransport {
    pub fn new(server: Arc<Server>) -> Self {
        Self {
            server,
            context: RequestContext::new(),
        }
    }

    /// Present `context` to the server on every request, as a network
    /// transport would present the incoming request headers
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    pub fn server(&self) -> &Server {
        &self.server
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn send(&self, payload: Vec<u8>) -> ClientResult<Vec<u8>> {
        trace!("local transport sending {} bytes", payload.len());
        Ok(self
            .server
            .invoke_bytes_with_context(&payload, &self.context)
            .await)
    }
}
