use crate::planner::Task;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const LOGIC_RPC_SCHEMA_0_0_1: &str = "logic-rpc/0.0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcMethod {
    Hello,
    Evaluate,
    Transform,
    PlanTasks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpcRequestEnvelope {
    pub schema: String,
    pub id: String,
    pub method: RpcMethod,
    #[serde(default = "empty_params")]
    pub params: Value,
}

impl RpcRequestEnvelope {
    pub fn new(id: impl Into<String>, call: &RpcCall) -> serde_json::Result<Self> {
        let (method, params) = match call {
            RpcCall::Hello(request) => (RpcMethod::Hello, serde_json::to_value(request)?),
            RpcCall::Evaluate(request) => (RpcMethod::Evaluate, serde_json::to_value(request)?),
            RpcCall::Transform(request) => (RpcMethod::Transform, serde_json::to_value(request)?),
            RpcCall::PlanTasks(request) => (RpcMethod::PlanTasks, serde_json::to_value(request)?),
        };
        Ok(Self {
            schema: LOGIC_RPC_SCHEMA_0_0_1.to_string(),
            id: id.into(),
            method,
            params,
        })
    }

    /// Decodes `params` into the request type selected by `method`.
    pub fn call(&self) -> serde_json::Result<RpcCall> {
        let params = self.params.clone();
        Ok(match self.method {
            RpcMethod::Hello => RpcCall::Hello(serde_json::from_value(params)?),
            RpcMethod::Evaluate => RpcCall::Evaluate(serde_json::from_value(params)?),
            RpcMethod::Transform => RpcCall::Transform(serde_json::from_value(params)?),
            RpcMethod::PlanTasks => RpcCall::PlanTasks(serde_json::from_value(params)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RpcCall {
    Hello(HelloRequest),
    Evaluate(EvalRequest),
    Transform(TransformRequest),
    PlanTasks(PlanRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HelloRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalRequest {
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub variables: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformRequest {
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default)]
    pub expr: String,
    #[serde(default)]
    pub var_name: String,
    #[serde(default)]
    pub op: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanRequest {
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HelloReply {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvalReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanReply {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RpcReply {
    Hello(HelloReply),
    Evaluate(EvalReply),
    Transform(TransformReply),
    PlanTasks(PlanReply),
    Error(ErrorReply),
}

impl RpcReply {
    pub fn error(message: impl Into<String>) -> Self {
        RpcReply::Error(ErrorReply {
            error: message.into(),
        })
    }

    /// The caller-visible error carried by this reply, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RpcReply::Hello(_) => None,
            RpcReply::Evaluate(reply) => reply.error.as_deref(),
            RpcReply::Transform(reply) => reply.error.as_deref(),
            RpcReply::PlanTasks(reply) => reply.error.as_deref(),
            RpcReply::Error(reply) => Some(reply.error.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcReplyEnvelope {
    pub schema: String,
    pub id: String,
    pub reply: RpcReply,
}

impl RpcReplyEnvelope {
    pub fn new(id: impl Into<String>, reply: RpcReply) -> Self {
        Self {
            schema: LOGIC_RPC_SCHEMA_0_0_1.to_string(),
            id: id.into(),
            reply,
        }
    }
}

fn empty_params() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
