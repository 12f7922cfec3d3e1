//! Shared fixtures for the conformance tests
//!
//! Rust counterparts of the types declared in `fixtures/conform.json` plus
//! handler implementations for interfaces `A` and `B`.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use barrister_idl::Schema;
use barrister_server::prelude::*;
use serde::{Deserialize, Serialize};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

pub fn conform_schema() -> Schema {
    Schema::from_file(fixture_path("conform.json")).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Err,
}

impl Shaped for Status {
    fn shape() -> TargetShape {
        TargetShape::string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathOp {
    Add,
    Multiply,
}

impl Shaped for MathOp {
    fn shape() -> TargetShape {
        TargetShape::string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatResponse {
    pub status: Status,
    pub count: i64,
    pub items: Vec<String>,
}

impl Shaped for RepeatResponse {
    fn shape() -> TargetShape {
        TargetShape::structure("RepeatResponse")
            .field::<Status>("status")
            .field::<i64>("count")
            .field::<Vec<String>>("items")
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiResponse {
    pub hi: String,
}

impl Shaped for HiResponse {
    fn shape() -> TargetShape {
        TargetShape::structure("HiResponse").field::<String>("hi").build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatRequest {
    pub to_repeat: String,
    pub count: i64,
    pub force_uppercase: bool,
}

impl Shaped for RepeatRequest {
    fn shape() -> TargetShape {
        TargetShape::structure("RepeatRequest")
            .field::<String>("to_repeat")
            .field::<i64>("count")
            .field::<bool>("force_uppercase")
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub person_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl Shaped for Person {
    fn shape() -> TargetShape {
        TargetShape::structure("Person")
            .field::<String>("personId")
            .field::<String>("firstName")
            .field::<String>("lastName")
            .field::<Option<String>>("email")
            .build()
    }
}

/// Implementation of interface `A`; shared across calls
#[derive(Debug, Default)]
pub struct AImpl {
    pub cloned: bool,
}

impl AImpl {
    pub async fn add(&self, a: i64, b: i64) -> Result<i64, RpcError> {
        Ok(a + b)
    }

    pub async fn calc(&self, nums: Vec<f64>, operation: MathOp) -> Result<f64, RpcError> {
        Ok(match operation {
            MathOp::Add => nums.iter().sum(),
            MathOp::Multiply => nums.iter().product(),
        })
    }

    pub async fn repeat(&self, req: RepeatRequest) -> Result<RepeatResponse, RpcError> {
        let item = if req.force_uppercase {
            req.to_repeat.to_uppercase()
        } else {
            req.to_repeat
        };
        let count = req.count.max(0);
        Ok(RepeatResponse {
            status: Status::Ok,
            count,
            items: vec![item; count as usize],
        })
    }

    pub async fn repeat_num(&self, num: i64, count: i64) -> Result<Vec<i64>, RpcError> {
        Ok(vec![num; count.max(0) as usize])
    }
}

pub fn a_handler() -> InterfaceHandler<AImpl> {
    InterfaceHandler::new("A", AImpl::default())
        .operation("add", |h: Arc<AImpl>, (a, b): (i64, i64)| async move { h.add(a, b).await })
        .operation("calc", |h: Arc<AImpl>, (nums, op): (Vec<f64>, MathOp)| async move {
            h.calc(nums, op).await
        })
        .operation("sqrt", |_h: Arc<AImpl>, (a,): (f64,)| async move { Ok::<_, RpcError>(a.sqrt()) })
        .operation("repeat", |h: Arc<AImpl>, (req,): (RepeatRequest,)| async move {
            h.repeat(req).await
        })
        .operation("say_hi", |_h: Arc<AImpl>, (): ()| async move {
            Ok::<_, RpcError>(HiResponse { hi: "hi".to_string() })
        })
        .operation("repeat_num", |h: Arc<AImpl>, (num, count): (i64, i64)| async move {
            h.repeat_num(num, count).await
        })
        .operation("putPerson", |_h: Arc<AImpl>, (p,): (Person,)| async move {
            Ok::<_, RpcError>(p.person_id)
        })
}

/// Implementation of interface `B`; cloned for every call
#[derive(Debug, Default)]
pub struct BImpl {
    pub cloned: bool,
    pub user_id: i64,
}

impl Cloneable for BImpl {
    fn clone_for_request(&self, _request: &RequestContext) -> Self {
        BImpl {
            cloned: true,
            user_id: 0,
        }
    }
}

impl BImpl {
    pub async fn echo(&self, s: String) -> Result<Option<String>, RpcError> {
        Ok(match s.as_str() {
            "return-null" => None,
            "get-userid" => Some(self.user_id.to_string()),
            _ => Some(s),
        })
    }
}

pub fn b_handler() -> InterfaceHandler<BImpl> {
    InterfaceHandler::new("B", BImpl::default())
        .operation("echo", |h: Arc<BImpl>, (s,): (String,)| async move { h.echo(s).await })
        .cloneable()
}

pub fn conform_server() -> Server {
    Server::builder(conform_schema())
        .handler(a_handler())
        .unwrap()
        .handler(b_handler())
        .unwrap()
        .build()
}

pub fn request_bytes(id: &str, method: &str, params: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    }))
    .unwrap()
}
