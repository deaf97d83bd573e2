use super::types::{RpcReplyEnvelope, RpcRequestEnvelope};

pub fn encode_request_jsonl_line(envelope: &RpcRequestEnvelope) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(envelope)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_request_jsonl_line(line: &str) -> serde_json::Result<RpcRequestEnvelope> {
    serde_json::from_str::<RpcRequestEnvelope>(line.trim_end())
}

pub fn encode_reply_jsonl_line(envelope: &RpcReplyEnvelope) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(envelope)?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
#[path = "jsonl_test.rs"]
mod tests;
