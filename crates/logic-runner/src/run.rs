use crate::cli::{EvalCommand, HelloCommand, OutputFormat, PlanCommand, ServeCommand, TransformCommand};
use crate::config::{load_runner_config, RunnerConfig, RunnerConfigError};
use logic_expr::TransformOp;
use logic_service::{
    serve_jsonl, DispatchError, DispatchSummary, EvalRequest, HelloRequest, LogicService, PlanReply, PlanRequest,
    ServiceOptions, TransformReply, TransformRequest,
};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("read file failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("runner config load failed: {0}")]
    ConfigLoad(#[from] RunnerConfigError),
    #[error("transform data must be a JSON array of numbers: {0}")]
    DataParse(String),
    #[error("error: {0}")]
    Service(String),
    #[error("json encode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("serve failed: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Loads the config file when one is given, else the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<RunnerConfig, RunnerError> {
    match path {
        Some(path) => Ok(load_runner_config(path)?),
        None => Ok(RunnerConfig::default()),
    }
}

pub fn execute_eval(config: &RunnerConfig, command: &EvalCommand) -> Result<String, RunnerError> {
    let service = LogicService::new(config.service_options());
    let reply = service.evaluate(&EvalRequest {
        expression: command.expr.clone(),
        variables: command.vars.iter().cloned().collect(),
    });
    if let Some(error) = reply.error {
        return Err(RunnerError::Service(error));
    }
    match command.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&reply)?),
        OutputFormat::Text => Ok(reply.result.map(|value| value.to_string()).unwrap_or_default()),
    }
}

pub fn execute_transform(config: &RunnerConfig, command: &TransformCommand) -> Result<String, RunnerError> {
    let data = serde_json::from_str::<Vec<f64>>(command.data.as_str())
        .map_err(|error| RunnerError::DataParse(error.to_string()))?;
    let mut options = config.service_options();
    if command.parallel {
        options = ServiceOptions {
            parallel_threshold: Some(0),
            ..options
        };
    }
    let service = LogicService::new(options);
    let reply = service.transform(&TransformRequest {
        data,
        expr: command.expr.clone(),
        var_name: command.var_name.clone().unwrap_or_default(),
        op: TransformOp::from(command.op).as_str().to_string(),
    });
    if let Some(error) = reply.error {
        return Err(RunnerError::Service(error));
    }
    match command.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&reply)?),
        OutputFormat::Text => transform_text(&reply),
    }
}

pub fn execute_plan(config: &RunnerConfig, command: &PlanCommand) -> Result<String, RunnerError> {
    let service = LogicService::new(config.service_options());
    let reply = service.plan_tasks(&PlanRequest {
        goal: command.goal.clone(),
        hints: command.hints.clone(),
        max_steps: command.max_steps,
    });
    if let Some(error) = reply.error {
        return Err(RunnerError::Service(error));
    }
    match command.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&reply)?),
        OutputFormat::Text => Ok(plan_text(&reply)),
    }
}

pub fn execute_hello(config: &RunnerConfig, command: &HelloCommand) -> Result<String, RunnerError> {
    let service = LogicService::new(config.service_options());
    let reply = service.hello(&HelloRequest {
        name: command.name.clone(),
    });
    Ok(reply.message)
}

/// Serves JSONL requests from `--input` (or stdin) and writes replies to `writer`.
pub fn execute_serve<W: Write>(
    config: &RunnerConfig,
    command: &ServeCommand,
    writer: &mut W,
) -> Result<DispatchSummary, RunnerError> {
    let service = LogicService::new(config.service_options());
    let options = config.dispatch_options(command.workers);
    let summary = match &command.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| RunnerError::ReadFile {
                path: path.display().to_string(),
                source,
            })?;
            serve_jsonl(&service, BufReader::new(file), writer, &options)?
        }
        None => serve_jsonl(&service, std::io::stdin().lock(), writer, &options)?,
    };
    debug!(?summary, "serve finished");
    Ok(summary)
}

fn transform_text(reply: &TransformReply) -> Result<String, RunnerError> {
    if let Some(data) = &reply.data {
        return Ok(serde_json::to_string(data)?);
    }
    Ok(reply.result.map(|value| value.to_string()).unwrap_or_default())
}

fn plan_text(reply: &PlanReply) -> String {
    let mut lines = reply
        .tasks
        .iter()
        .map(|task| {
            let mut line = format!(
                "{} [p{}, {} min] {}: {}",
                task.id, task.priority, task.estimate_min, task.title, task.detail
            );
            if !task.depends_on.is_empty() {
                line.push_str(format!(" (after {})", task.depends_on.join(", ")).as_str());
            }
            line
        })
        .collect::<Vec<_>>();
    lines.push(reply.notes.clone());
    lines.join("\n")
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
