use logic_expr::{tokenize, TokenKind};
use logic_service::{DispatchOptions, ServiceOptions, DEFAULT_BATCH_SIZE, DEFAULT_VAR_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub const RUNNER_CONFIG_SCHEMA_0_0_1: &str = "logic-runner/0.0.1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    #[serde(default = "default_runner_schema")]
    pub schema: String,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub transform: TransformConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            schema: default_runner_schema(),
            log_level: None,
            service: ServiceConfig::default(),
            transform: TransformConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default)]
    pub workers: usize,
    #[serde(default)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    #[serde(default = "default_var_name")]
    pub default_var_name: String,
    #[serde(default)]
    pub parallel_threshold: Option<usize>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            default_var_name: default_var_name(),
            parallel_threshold: None,
        }
    }
}

impl RunnerConfig {
    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            default_var_name: self.transform.default_var_name.clone(),
            parallel_threshold: self.transform.parallel_threshold,
        }
    }

    /// Dispatch options; a `workers` override from the command line wins.
    pub fn dispatch_options(&self, workers: Option<usize>) -> DispatchOptions {
        DispatchOptions {
            workers: workers.unwrap_or(self.service.workers),
            batch_size: self.service.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerConfigError {
    #[error("read runner config failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("runner config parse failed: {0}")]
    Parse(String),
    #[error("runner config validation failed: {}", join_issues(.0))]
    Validation(Vec<ConfigIssue>),
}

pub fn load_runner_config(path: &Path) -> Result<RunnerConfig, RunnerConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| RunnerConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let expanded = expand_env_placeholders(raw.as_str()).map_err(RunnerConfigError::Parse)?;
    let config: RunnerConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(expanded.as_str())
            .map_err(|error| RunnerConfigError::Parse(format!("json decode error: {error}")))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(expanded.as_str())
            .map_err(|error| RunnerConfigError::Parse(format!("yaml decode error: {error}")))?,
        _ => serde_yaml::from_str(expanded.as_str())
            .or_else(|_| serde_json::from_str(expanded.as_str()))
            .map_err(|error| RunnerConfigError::Parse(error.to_string()))?,
    };

    let issues = validate_runner_config(&config);
    if !issues.is_empty() {
        return Err(RunnerConfigError::Validation(issues));
    }
    Ok(config)
}

/// Every problem found in `config`, in field order.
pub fn validate_runner_config(config: &RunnerConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::<ConfigIssue>::new();
    if config.schema != RUNNER_CONFIG_SCHEMA_0_0_1 {
        issues.push(config_issue(
            "schema",
            format!(
                "unsupported runner config schema `{}` (expected `{RUNNER_CONFIG_SCHEMA_0_0_1}`)",
                config.schema
            ),
        ));
    }
    if let Some(level) = &config.log_level {
        if let Err(error) = EnvFilter::try_new(level) {
            issues.push(config_issue("log_level", format!("invalid log filter `{level}`: {error}")));
        }
    }
    if config.service.batch_size == Some(0) {
        issues.push(config_issue("service.batch_size", "batch_size must be > 0".to_string()));
    }
    if !is_variable_name(config.transform.default_var_name.as_str()) {
        issues.push(config_issue(
            "transform.default_var_name",
            format!(
                "`{}` is not a usable variable name",
                config.transform.default_var_name
            ),
        ));
    }
    if config.transform.parallel_threshold == Some(0) {
        issues.push(config_issue(
            "transform.parallel_threshold",
            "parallel_threshold must be > 0".to_string(),
        ));
    }
    issues
}

// A name is usable when the expression lexer reads it back as one identifier.
fn is_variable_name(name: &str) -> bool {
    match tokenize(name) {
        Ok(tokens) => {
            matches!(
                tokens.as_slice(),
                [identifier, eof] if identifier.kind == TokenKind::Identifier
                    && identifier.lexeme == name
                    && eof.kind == TokenKind::Eof
            )
        }
        Err(_) => false,
    }
}

fn config_issue(field: &str, message: String) -> ConfigIssue {
    ConfigIssue {
        field: field.to_string(),
        message,
    }
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn default_runner_schema() -> String {
    RUNNER_CONFIG_SCHEMA_0_0_1.to_string()
}

fn default_var_name() -> String {
    DEFAULT_VAR_NAME.to_string()
}

pub(crate) fn expand_env_placeholders(input: &str) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    while let Some(start_offset) = input[cursor..].find("${") {
        let start = cursor + start_offset;
        out.push_str(&input[cursor..start]);
        let name_start = start + 2;
        let Some(end_offset) = input[name_start..].find('}') else {
            return Err("unterminated env placeholder `${...`".to_string());
        };
        let end = name_start + end_offset;
        let name = &input[name_start..end];
        if name.is_empty() {
            return Err("empty env placeholder `${}`".to_string());
        }
        let value =
            std::env::var(name).map_err(|_| format!("missing env var for placeholder `${{{name}}}`"))?;
        out.push_str(value.as_str());
        cursor = end + 1;
    }
    out.push_str(&input[cursor..]);
    Ok(out)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
