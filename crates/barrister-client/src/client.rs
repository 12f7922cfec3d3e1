//! JSON-RPC client bound to a transport

use std::sync::Arc;

use barrister_idl::{Schema, SchemaError};
use barrister_json_rpc::{IDL_METHOD, JsonRpcMessage, JsonRpcRequest, RequestId, encode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::Transport;

/// Client issuing positional-parameter calls through a [`Transport`]
#[derive(Clone)]
pub struct RemoteClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl RemoteClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: impl Transport + 'static, config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a request with a fresh uuid v4 id
    pub fn request(&self, method: impl Into<String>, params: Vec<Value>) -> JsonRpcRequest {
        let id = RequestId::String(Uuid::new_v4().simple().to_string());
        JsonRpcRequest::new_with_array_params(id, method, params)
    }

    /// Call `method` and return its result value
    pub async fn call(&self, method: &str, params: Vec<Value>) -> ClientResult<Value> {
        let request = self.request(method, params);
        debug!("calling {} (id {:?})", method, request.id);

        let reply = self.send(&request).await?;
        let message: JsonRpcMessage = serde_json::from_slice(&reply)?;
        Ok(message.into_result()?)
    }

    /// Call `method` and deserialize the result into `R`
    pub async fn call_typed<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> ClientResult<R> {
        let value = self.call(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send several requests as one batch envelope
    ///
    /// Replies are returned as the server produced them, one per request.
    /// A whole-batch rejection answered with a bare error object is returned
    /// as [`ClientError::Rpc`].
    pub async fn call_batch(&self, requests: Vec<JsonRpcRequest>) -> ClientResult<Vec<JsonRpcMessage>> {
        debug!("calling batch of {} requests", requests.len());
        let reply = self.send(&requests).await?;

        match serde_json::from_slice::<Value>(&reply)? {
            Value::Array(items) => Ok(items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<JsonRpcMessage>, _>>()?),
            single => {
                let message: JsonRpcMessage = serde_json::from_value(single)?;
                match message.into_result() {
                    Err(err) => Err(ClientError::Rpc(err)),
                    Ok(_) => Err(ClientError::Transport(
                        "batch request answered with a single response".to_string(),
                    )),
                }
            }
        }
    }

    /// Fetch the server's IDL document and load it
    pub async fn idl(&self) -> ClientResult<Schema> {
        match self.call(IDL_METHOD, Vec::new()).await? {
            Value::Array(elements) => Ok(Schema::load(elements)?),
            _ => Err(SchemaError::NotAnArray.into()),
        }
    }

    async fn send<T: serde::Serialize>(&self, body: &T) -> ClientResult<Vec<u8>> {
        let payload = encode(body, self.config.force_ascii)
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        self.transport.send(payload).await
    }
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
