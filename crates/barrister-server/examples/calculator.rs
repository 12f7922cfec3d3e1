//! Calculator service driven through raw JSON-RPC payloads
//!
//! Run with `RUST_LOG=debug cargo run --example calculator`.

use std::sync::Arc;

use async_trait::async_trait;
use barrister_server::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

const IDL: &str = r#"[
  {"type": "enum", "name": "MathOp", "comment": "", "values": [
    {"value": "add", "comment": ""},
    {"value": "multiply", "comment": ""}
  ]},
  {"type": "struct", "name": "Result", "extends": "", "comment": "", "fields": [
    {"name": "value", "type": "float", "optional": false, "is_array": false, "comment": ""},
    {"name": "note", "type": "string", "optional": true, "is_array": false, "comment": ""}
  ]},
  {"type": "interface", "name": "Calculator", "comment": "", "functions": [
    {"name": "add", "comment": "", "params": [
      {"name": "a", "type": "int", "optional": false, "is_array": false, "comment": ""},
      {"name": "b", "type": "int", "optional": false, "is_array": false, "comment": ""}
    ], "returns": {"name": "", "type": "int", "optional": false, "is_array": false, "comment": ""}},
    {"name": "calc", "comment": "", "params": [
      {"name": "nums", "type": "float", "optional": false, "is_array": true, "comment": ""},
      {"name": "op", "type": "MathOp", "optional": false, "is_array": false, "comment": ""}
    ], "returns": {"name": "", "type": "Result", "optional": false, "is_array": false, "comment": ""}}
  ]},
  {"type": "meta", "barrister_version": "0.1.2", "date_generated": 1337654725230, "checksum": "example"}
]"#;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MathOp {
    Add,
    Multiply,
}

impl Shaped for MathOp {
    fn shape() -> TargetShape {
        TargetShape::string()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CalcResult {
    value: f64,
    note: Option<String>,
}

impl Shaped for CalcResult {
    fn shape() -> TargetShape {
        TargetShape::structure("Result")
            .field::<f64>("value")
            .field::<Option<String>>("note")
            .build()
    }
}

struct Calculator;

impl Calculator {
    async fn add(&self, a: i64, b: i64) -> Result<i64, RpcError> {
        a.checked_add(b)
            .ok_or_else(|| RpcError::application(-32000, "integer overflow"))
    }

    async fn calc(&self, nums: Vec<f64>, op: MathOp) -> Result<CalcResult, RpcError> {
        let value: f64 = match op {
            MathOp::Add => nums.iter().sum(),
            MathOp::Multiply => nums.iter().product(),
        };
        let note = nums.is_empty().then(|| "no operands".to_string());
        Ok(CalcResult { value, note })
    }
}

struct Timing;

#[async_trait]
impl Filter for Timing {
    async fn pre_invoke(&self, ctx: &mut CallContext<'_>) -> FilterAction {
        info!("-> {} {:?}", ctx.method(), ctx.params());
        FilterAction::Continue
    }

    async fn post_invoke(&self, ctx: &mut CallContext<'_>) -> FilterAction {
        match ctx.error() {
            Some(err) => info!("<- {} failed: {}", ctx.method(), err),
            None => info!("<- {} {:?}", ctx.method(), ctx.result()),
        }
        FilterAction::Continue
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let schema = Schema::from_json(IDL.as_bytes())?;
    if let Some(meta) = schema.meta() {
        info!("IDL version {} generated {}", meta.schema_version, meta.generated_at());
    }

    let calculator = InterfaceHandler::new("Calculator", Calculator)
        .operation("add", |h: Arc<Calculator>, (a, b): (i64, i64)| async move {
            h.add(a, b).await
        })
        .operation(
            "calc",
            |h: Arc<Calculator>, (nums, op): (Vec<f64>, MathOp)| async move { h.calc(nums, op).await },
        );

    let server = Server::builder(schema)
        .handler(calculator)?
        .filter(Timing)
        .build();

    let payloads: [&[u8]; 4] = [
        br#"{"jsonrpc": "2.0", "id": 1, "method": "Calculator.add", "params": [2, 3]}"#,
        br#"{"jsonrpc": "2.0", "id": 2, "method": "Calculator.calc", "params": [[1.5, 2, 4], "multiply"]}"#,
        br#"[{"jsonrpc": "2.0", "id": 3, "method": "Calculator.calc", "params": [[1], "divide"]},
            {"jsonrpc": "2.0", "id": 4, "method": "Calculator.add", "params": [2.5, 1]}]"#,
        br#"{"jsonrpc": "2.0", "id": 5, "method": "barrister-idl"}"#,
    ];

    for payload in payloads {
        let reply = server.invoke_bytes(payload).await;
        println!("{}", String::from_utf8_lossy(&reply));
    }
    Ok(())
}
