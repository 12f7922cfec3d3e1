//! Envelope framing: batch detection, request parsing and response encoding.

use serde::Serialize;
use serde_json::Value;

use crate::error::{JsonRpcError, JsonRpcTransportError};
use crate::request::JsonRpcRequest;
use crate::types::RequestId;

/// One slot of an envelope: a well-formed request, or the error answering it
pub type EnvelopeItem = Result<JsonRpcRequest, JsonRpcError>;

/// A decoded request payload
#[derive(Debug, Clone)]
pub enum Envelope {
    Single(EnvelopeItem),
    Batch(Vec<EnvelopeItem>),
}

impl Envelope {
    pub fn is_batch(&self) -> bool {
        matches!(self, Envelope::Batch(_))
    }
}

/// A payload that could not be decoded at all
#[derive(Debug, Clone)]
pub struct MalformedEnvelope {
    /// Shape detected from the raw bytes, used to shape the error reply
    pub batch: bool,
    pub error: JsonRpcError,
}

/// Whether a raw payload is a batch: the first `{` or `[` decides
pub fn is_batch(payload: &[u8]) -> bool {
    payload
        .iter()
        .find(|b| **b == b'{' || **b == b'[')
        .is_some_and(|b| *b == b'[')
}

/// Parse a raw payload into a single request or a batch of requests
///
/// Members that are not valid request objects become `-32600` errors in their
/// own slot; only a payload that is not JSON at all fails as a whole.
pub fn parse_envelope(payload: &[u8]) -> Result<Envelope, MalformedEnvelope> {
    let batch = is_batch(payload);

    let value: Value = serde_json::from_slice(payload).map_err(|e| MalformedEnvelope {
        batch,
        error: JsonRpcError::parse_error(format!("Unable to parse JSON: {}", e)),
    })?;

    if !batch {
        return Ok(Envelope::Single(parse_item(value)));
    }

    match value {
        Value::Array(items) => Ok(Envelope::Batch(items.into_iter().map(parse_item).collect())),
        _ => Err(MalformedEnvelope {
            batch,
            error: JsonRpcError::invalid_request(None, Some("Batch must be an array".to_string())),
        }),
    }
}

fn parse_item(value: Value) -> EnvelopeItem {
    let Some(obj) = value.as_object() else {
        return Err(JsonRpcError::invalid_request(
            None,
            Some("Request must be an object".to_string()),
        ));
    };

    let id = obj.get("id").and_then(RequestId::from_value);
    serde_json::from_value::<JsonRpcRequest>(value)
        .map_err(|e| JsonRpcError::invalid_request(id, Some(format!("Invalid Request: {}", e))))
}

/// Serialize a payload, optionally escaping every non-ASCII character
pub fn encode<T: Serialize>(value: &T, force_ascii: bool) -> Result<Vec<u8>, JsonRpcTransportError> {
    let json = serde_json::to_string(value)?;
    if force_ascii {
        Ok(escape_non_ascii(&json).into_bytes())
    } else {
        Ok(json.into_bytes())
    }
}

/// Replace non-ASCII characters with `\uXXXX` escapes (surrogate pairs above the BMP)
///
/// serde_json never emits raw non-ASCII outside string literals, so the
/// result is still valid JSON.
pub fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
