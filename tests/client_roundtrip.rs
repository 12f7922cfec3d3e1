//! Client calls through an in-process transport

mod test_helpers;

use std::sync::Arc;

use barrister_client::prelude::*;
use serde_json::json;
use test_helpers::*;

fn client() -> RemoteClient {
    RemoteClient::new(LocalTransport::new(Arc::new(conform_server())))
}

#[tokio::test]
async fn test_typed_calls() {
    let client = client();

    let sum: i64 = client.call_typed("A.add", vec![json!(40), json!(2)]).await.unwrap();
    assert_eq!(sum, 42);

    let hi: HiResponse = client.call_typed("A.say_hi", vec![]).await.unwrap();
    assert_eq!(hi, HiResponse { hi: "hi".to_string() });

    let repeated: RepeatResponse = client
        .call_typed(
            "A.repeat",
            vec![json!({"to_repeat": "x", "count": 3, "force_uppercase": false})],
        )
        .await
        .unwrap();
    assert_eq!(repeated.status, Status::Ok);
    assert_eq!(repeated.items, vec!["x", "x", "x"]);

    let echoed: Option<String> = client
        .call_typed("B.echo", vec![json!("return-null")])
        .await
        .unwrap();
    assert_eq!(echoed, None);
}

#[tokio::test]
async fn test_error_codes_surface() {
    let client = client();

    let err = client.call("A.add", vec![json!("one"), json!(2)]).await.unwrap_err();
    assert_eq!(err.code(), -32602);
    assert!(matches!(err, ClientError::Rpc(_)));

    let err = client.call("C.missing", vec![]).await.unwrap_err();
    assert_eq!(err.to_error_object().message, "Unsupported method: C.missing");
}

#[tokio::test]
async fn test_batch_and_idl() {
    let client = client();
    let replies = client
        .call_batch(vec![
            client.request("A.add", vec![json!(1), json!(1)]),
            client.request("A.calc", vec![json!([2, 5]), json!("add")]),
        ])
        .await
        .unwrap();
    assert_eq!(replies[0].result(), Some(&json!(2)));
    assert_eq!(replies[1].result(), Some(&json!(7.0)));

    let schema = client.idl().await.unwrap();
    assert_eq!(schema.elements(), conform_schema().elements());
}
