//! Raw payload dispatch: batches, malformed envelopes and encoding options

mod test_helpers;

use barrister_server::prelude::*;
use serde_json::{Value, json};
use test_helpers::*;

async fn invoke(server: &Server, payload: &[u8]) -> Value {
    serde_json::from_slice(&server.invoke_bytes(payload).await).unwrap()
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let server = conform_server();
    let reply = invoke(
        &server,
        br#"[
            {"jsonrpc": "2.0", "id": 1, "method": "A.add", "params": [1, 2]},
            {"jsonrpc": "2.0", "id": 2, "method": "B.nope", "params": []},
            {"jsonrpc": "2.0", "id": 3, "method": "B.echo", "params": ["x"]}
        ]"#,
    )
    .await;

    let replies = reply.as_array().unwrap();
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0], json!({"jsonrpc": "2.0", "id": 1, "result": 3}));
    assert_eq!(replies[1]["id"], 2);
    assert_eq!(replies[1]["error"]["code"], -32601);
    assert_eq!(replies[2]["result"], "x");
}

#[tokio::test]
async fn test_empty_batch() {
    let server = conform_server();
    assert_eq!(invoke(&server, b"[]").await, json!([]));
}

#[tokio::test]
async fn test_malformed_payloads() {
    let server = conform_server();

    let reply = invoke(&server, b"{not json").await;
    assert_eq!(reply["error"]["code"], -32700);
    assert!(
        reply["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Unable to parse JSON")
    );

    let reply = invoke(&server, b"[{not json").await;
    let replies = reply.as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["error"]["code"], -32700);
}

#[tokio::test]
async fn test_invalid_batch_member() {
    let server = conform_server();
    let reply = invoke(
        &server,
        br#"[
            {"jsonrpc": "2.0", "id": 1, "method": "B.echo", "params": ["a"]},
            {"jsonrpc": "2.0", "id": 2, "params": []},
            42
        ]"#,
    )
    .await;

    let replies = reply.as_array().unwrap();
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0]["result"], "a");
    assert_eq!(replies[1]["id"], 2);
    assert_eq!(replies[1]["error"]["code"], -32600);
    assert_eq!(replies[2]["error"]["code"], -32600);
}

#[tokio::test]
async fn test_single_param_shorthand() {
    let server = conform_server();
    let reply = invoke(
        &server,
        br#"{"jsonrpc": "2.0", "id": "s", "method": "B.echo", "params": "solo"}"#,
    )
    .await;
    assert_eq!(reply["result"], "solo");
}

#[tokio::test]
async fn test_wrong_version_rejected() {
    let server = conform_server();
    let reply = invoke(
        &server,
        br#"{"jsonrpc": "1.0", "id": 5, "method": "B.echo", "params": ["a"]}"#,
    )
    .await;
    assert_eq!(reply["error"]["code"], -32600);

    let reply = invoke(&server, br#"{"id": 6, "method": "B.echo", "params": ["a"]}"#).await;
    assert_eq!(reply["result"], "a");
}

#[tokio::test]
async fn test_force_ascii() {
    let server = Server::builder(conform_schema())
        .force_ascii(true)
        .handler(b_handler())
        .unwrap()
        .build();

    let raw = server
        .invoke_bytes(&request_bytes("1", "B.echo", json!(["caf\u{e9} \u{1f600}"])))
        .await;
    assert!(raw.is_ascii());
    let text = String::from_utf8(raw).unwrap();
    assert!(text.contains(r"caf\u00e9 \ud83d\ude00"), "{}", text);

    let reply: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(reply["result"], "caf\u{e9} \u{1f600}");
}

#[tokio::test]
async fn test_in_process_batch() {
    let server = conform_server();
    let requests = vec![
        JsonRpcRequest::new_with_array_params(RequestId::Number(1), "A.sqrt", vec![json!(9)]),
        JsonRpcRequest::new_with_array_params(RequestId::Number(2), "A.sqrt", vec![json!("nine")]),
    ];
    let replies = server.call_batch(requests).await;
    assert_eq!(replies[0].result(), Some(&json!(3.0)));
    assert_eq!(replies[1].error_object().map(|e| e.code), Some(-32602));
    assert_eq!(replies[1].id(), Some(&RequestId::Number(2)));
}
