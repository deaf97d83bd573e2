pub mod dispatch;
pub mod planner;
pub mod rpc;
pub mod service;

pub use dispatch::{
    respond_to_line, serve_jsonl, DispatchError, DispatchOptions, DispatchSummary, DEFAULT_BATCH_SIZE,
    WORKER_STACK_SIZE,
};
pub use planner::{clamp_max_steps, detect_keywords, plan_tasks, PlanError, PlanOutcome, Task, DEFAULT_MAX_STEPS};
pub use rpc::{
    decode_request_jsonl_line, encode_reply_jsonl_line, encode_request_jsonl_line, ErrorReply, EvalReply,
    EvalRequest, HelloReply, HelloRequest, PlanReply, PlanRequest, RpcCall, RpcMethod, RpcReply, RpcReplyEnvelope,
    RpcRequestEnvelope, TransformReply, TransformRequest, LOGIC_RPC_SCHEMA_0_0_1,
};
pub use service::{LogicService, ServiceOptions, DEFAULT_VAR_NAME};
