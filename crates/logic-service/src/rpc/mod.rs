mod jsonl;
mod types;

pub use jsonl::{decode_request_jsonl_line, encode_reply_jsonl_line, encode_request_jsonl_line};
pub use types::{
    ErrorReply, EvalReply, EvalRequest, HelloReply, HelloRequest, PlanReply, PlanRequest, RpcCall, RpcMethod,
    RpcReply, RpcReplyEnvelope, RpcRequestEnvelope, TransformReply, TransformRequest, LOGIC_RPC_SCHEMA_0_0_1,
};
