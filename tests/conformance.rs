//! Conformance tests driven by the `conform.json` IDL fixture
//!
//! Exercise schema loading, in-process calls, raw payload dispatch and
//! registration-time validation against interfaces `A` and `B`.

mod test_helpers;

use std::sync::Arc;

use barrister_idl::{EnumValue, SchemaElement};
use barrister_server::prelude::*;
use serde_json::{Value, json};
use test_helpers::*;

#[test]
fn test_parse_conform_idl() {
    let schema = conform_schema();

    let meta = schema.meta().expect("meta element");
    assert_eq!(meta.schema_version, "0.1.2");
    assert_eq!(meta.generated_at_nanos, 1_337_654_725_230_000_000);
    assert_eq!(meta.checksum, "34f6238ed03c6319017382e0fdc638a7");

    assert_eq!(schema.elements().len(), 11);
    assert_eq!(schema.interfaces(), &["A".to_string(), "B".to_string()][..]);
    assert_eq!(schema.interface("A").map(|ops| ops.len()), Some(7));
    assert_eq!(schema.interface("B").map(|ops| ops.len()), Some(1));

    for method in [
        "A.add", "A.calc", "A.sqrt", "A.repeat", "A.say_hi", "A.repeat_num", "A.putPerson",
        "B.echo",
    ] {
        assert!(schema.operation(method).is_some(), "no operation {}", method);
    }
    for name in ["Response", "RepeatResponse", "HiResponse", "RepeatRequest", "Person"] {
        assert!(schema.is_struct(name), "no struct {}", name);
    }
    assert!(schema.is_enum("Status"));

    let math_ops = schema.enum_values("MathOp").unwrap();
    assert_eq!(
        math_ops,
        &[
            EnumValue { value: "add".into(), comment: String::new() },
            EnumValue { value: "multiply".into(), comment: "mult comment".into() },
        ]
    );
}

#[test]
fn test_struct_inheritance() {
    let schema = conform_schema();
    let repeat = schema.struct_def("RepeatResponse").unwrap();
    let names: Vec<&str> = repeat.effective_fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["status", "count", "items"]);
    assert_eq!(repeat.field("status").map(|f| f.declared_type.as_str()), Some("Status"));

    let first = serde_json::from_value::<SchemaElement>(schema.elements()[0].clone()).unwrap();
    assert!(matches!(first, SchemaElement::Comment(_)));
}

#[tokio::test]
async fn test_server_call_success() {
    let server = conform_server();

    assert_eq!(server.call("A.add", vec![json!(1), json!(2)]).await, Ok(json!(3)));
    assert_eq!(server.call("A.sqrt", vec![json!(16)]).await, Ok(json!(4.0)));
    assert_eq!(server.call("A.say_hi", vec![]).await, Ok(json!({"hi": "hi"})));
    assert_eq!(
        server.call("A.calc", vec![json!([2.0, 3.0]), json!("multiply")]).await,
        Ok(json!(6.0))
    );
    assert_eq!(
        server.call("A.repeat_num", vec![json!(7), json!(3)]).await,
        Ok(json!([7, 7, 7]))
    );
    assert_eq!(
        server
            .call(
                "A.putPerson",
                vec![json!({"personId": "p1", "firstName": "Ada", "lastName": "Lovelace"})]
            )
            .await,
        Ok(json!("p1"))
    );

    for (input, output) in [("hi", json!("hi")), ("2", json!("2")), ("return-null", Value::Null)] {
        assert_eq!(server.call("B.echo", vec![json!(input)]).await, Ok(output));
    }
}

#[tokio::test]
async fn test_server_call_fail() {
    let server = Server::builder(conform_schema())
        .handler(b_handler())
        .unwrap()
        .build();

    for (method, code) in [("B.", -32601), ("", -32601), ("B.foo", -32601), ("B.echo", -32602)] {
        let err = server.call(method, vec![]).await.unwrap_err();
        assert_eq!(err.code, code, "method {:?}: {}", method, err);
    }

    let err = server.call("A.add", vec![json!(1), json!(2)]).await.unwrap_err();
    assert_eq!(err.code, -32601);
    assert_eq!(err.message, "No handler registered for interface: A");

    let err = server.call("Foo.bar", vec![]).await.unwrap_err();
    assert_eq!(err.message, "Unsupported method: Foo.bar");
}

#[tokio::test]
async fn test_conversion_failures() {
    let server = conform_server();

    let err = server
        .call("A.calc", vec![json!([1.0, "x"]), json!("add")])
        .await
        .unwrap_err();
    assert_eq!(err.code, -32602);
    assert!(err.message.starts_with("param[0][1]"), "{}", err.message);

    let err = server
        .call("A.calc", vec![json!([1.0]), json!("divide")])
        .await
        .unwrap_err();
    assert_eq!(err.code, -32602);
    assert!(err.message.contains("not in enum values"), "{}", err.message);

    let err = server.call("A.add", vec![json!(1.5), json!(2)]).await.unwrap_err();
    assert_eq!(err.code, -32602);
    assert_eq!(server.call("A.add", vec![json!(1.0), json!(2)]).await, Ok(json!(3)));

    let err = server
        .call("A.putPerson", vec![json!({"personId": "p1", "firstName": "Ada"})])
        .await
        .unwrap_err();
    assert_eq!(err.code, -32602);
    assert!(err.message.contains("missing required field lastName"), "{}", err.message);

    let err = server.call("A.add", vec![json!(1)]).await.unwrap_err();
    assert_eq!(err.message, "Method A.add expects 2 params but was passed 1");
}

#[tokio::test]
async fn test_struct_params_and_results() {
    let server = conform_server();
    let result = server
        .call(
            "A.repeat",
            vec![json!({"to_repeat": "ab", "count": 2, "force_uppercase": true})],
        )
        .await
        .unwrap();
    assert_eq!(result, json!({"status": "ok", "count": 2, "items": ["AB", "AB"]}));
}

#[tokio::test]
async fn test_invoke_json_success() {
    let server = conform_server();

    for (input, output) in [("hi", json!("hi")), ("2", json!("2")), ("return-null", Value::Null)] {
        let reply = server
            .invoke_bytes(&request_bytes("123", "B.echo", json!([input])))
            .await;
        let reply: Value = serde_json::from_slice(&reply).unwrap();
        assert_eq!(reply["id"], "123");
        assert!(reply.get("error").is_none(), "{}", reply);
        assert_eq!(reply["result"], output);
    }
}

#[tokio::test]
async fn test_barrister_idl() {
    let server = Server::builder(conform_schema()).build();
    let reply = server
        .invoke_bytes(br#"{"jsonrpc": "2.0", "id": "123", "method": "barrister-idl", "params": ""}"#)
        .await;
    let reply: Value = serde_json::from_slice(&reply).unwrap();

    let fixture: Value =
        serde_json::from_slice(&std::fs::read(fixture_path("conform.json")).unwrap()).unwrap();
    assert_eq!(reply["result"], fixture);
}

#[test]
fn test_add_handler_rejects_mismatched_impl() {
    struct Bad;

    let missing = InterfaceHandler::new("B", Bad);
    let err = Server::builder(conform_schema()).handler(missing).unwrap_err();
    assert!(matches!(err, ConfigError::MissingOperation { ref operation, .. } if operation == "echo"));

    let bad_param = InterfaceHandler::new("B", Bad).operation("echo", |_h: Arc<Bad>, (_f,): (f64,)| async move {
        Ok::<_, RpcError>(Some("blah".to_string()))
    });
    let err = Server::builder(conform_schema()).handler(bad_param).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidType { .. }), "{}", err);

    let bad_return = InterfaceHandler::new("B", Bad).operation("echo", |_h: Arc<Bad>, (_s,): (String,)| async move {
        Ok::<_, RpcError>(10i64)
    });
    let err = Server::builder(conform_schema()).handler(bad_return).unwrap_err();
    assert!(err.to_string().starts_with("B.echo return value"), "{}", err);

    let extra_param = InterfaceHandler::new("B", Bad).operation(
        "echo",
        |_h: Arc<Bad>, (s, _n): (String, i64)| async move { Ok::<_, RpcError>(Some(s)) },
    );
    let err = Server::builder(conform_schema()).handler(extra_param).unwrap_err();
    assert!(matches!(err, ConfigError::ArityMismatch { expected: 1, actual: 2, .. }));

    let err = Server::builder(conform_schema())
        .handler(b_handler())
        .unwrap()
        .handler(b_handler())
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateInterface(ref name) if name == "B"));
}
