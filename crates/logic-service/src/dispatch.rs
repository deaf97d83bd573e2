use crate::rpc::{
    decode_request_jsonl_line, encode_reply_jsonl_line, RpcReply, RpcReplyEnvelope, LOGIC_RPC_SCHEMA_0_0_1,
};
use crate::service::LogicService;
use rayon::prelude::*;
use std::io::{BufRead, Write};
use tracing::{info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 64;
/// Worker stack size: room for the deepest expression the parser accepts.
pub const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Worker threads; 0 lets rayon pick one per core.
    pub workers: usize,
    /// Requests read ahead and handled together before their replies are written.
    pub batch_size: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub requests: usize,
    pub failed_decodes: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("read request line {line} failed: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("write reply failed: {0}")]
    Write(#[source] std::io::Error),
    #[error("encode reply failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("build worker pool failed: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Reads JSONL requests from `reader` and writes one JSONL reply per request
/// to `writer`, in request order. Requests within a batch run concurrently on
/// a dedicated pool; a malformed line yields an error reply, not a failure.
pub fn serve_jsonl<R, W>(
    service: &LogicService,
    reader: R,
    writer: &mut W,
    options: &DispatchOptions,
) -> Result<DispatchSummary, DispatchError>
where
    R: BufRead,
    W: Write,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .thread_name(|index| format!("logic-worker-{index}"))
        .stack_size(WORKER_STACK_SIZE)
        .build()?;
    let batch_size = options.batch_size.max(1);
    info!(workers = pool.current_num_threads(), batch_size, "serving jsonl requests");

    let mut summary = DispatchSummary::default();
    let mut batch = Vec::<(usize, String)>::with_capacity(batch_size);
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|source| DispatchError::Read {
            line: line_number,
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        batch.push((line_number, line));
        if batch.len() == batch_size {
            flush_batch(service, &pool, &mut batch, writer, &mut summary)?;
        }
    }
    flush_batch(service, &pool, &mut batch, writer, &mut summary)?;

    info!(
        requests = summary.requests,
        failed_decodes = summary.failed_decodes,
        "request stream finished"
    );
    Ok(summary)
}

/// Handles one raw request line. The flag is true when the line could not be
/// decoded into a call.
pub fn respond_to_line(service: &LogicService, line_number: usize, line: &str) -> (RpcReplyEnvelope, bool) {
    let envelope = match decode_request_jsonl_line(line) {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!(line = line_number, %error, "request decode failed");
            return (
                RpcReplyEnvelope::new(
                    format!("line-{line_number}"),
                    RpcReply::error(format!("request decode failed: {error}")),
                ),
                true,
            );
        }
    };
    if envelope.schema != LOGIC_RPC_SCHEMA_0_0_1 {
        warn!(line = line_number, schema = envelope.schema.as_str(), "unsupported request schema");
        let reply = RpcReply::error(format!(
            "unsupported request schema `{}` (expected `{LOGIC_RPC_SCHEMA_0_0_1}`)",
            envelope.schema
        ));
        return (RpcReplyEnvelope::new(envelope.id, reply), true);
    }
    match envelope.call() {
        Ok(call) => (RpcReplyEnvelope::new(envelope.id, service.handle(&call)), false),
        Err(error) => {
            warn!(line = line_number, id = envelope.id.as_str(), %error, "request params decode failed");
            let reply = RpcReply::error(format!("request params decode failed: {error}"));
            (RpcReplyEnvelope::new(envelope.id, reply), true)
        }
    }
}

fn flush_batch<W: Write>(
    service: &LogicService,
    pool: &rayon::ThreadPool,
    batch: &mut Vec<(usize, String)>,
    writer: &mut W,
    summary: &mut DispatchSummary,
) -> Result<(), DispatchError> {
    if batch.is_empty() {
        return Ok(());
    }
    let replies = pool.install(|| {
        batch
            .par_iter()
            .map(|(line_number, line)| respond_to_line(service, *line_number, line))
            .collect::<Vec<_>>()
    });
    for (envelope, failed_decode) in replies {
        summary.requests += 1;
        if failed_decode {
            summary.failed_decodes += 1;
        }
        let line = encode_reply_jsonl_line(&envelope)?;
        writer.write_all(line.as_bytes()).map_err(DispatchError::Write)?;
    }
    writer.flush().map_err(DispatchError::Write)?;
    batch.clear();
    Ok(())
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
