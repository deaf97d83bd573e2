use clap::{Parser, Subcommand, ValueEnum};
use logic_expr::TransformOp;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "logic-runner")]
#[command(about = "Evaluate arithmetic expressions, transform datasets and plan tasks")]
pub struct Cli {
    /// Runner config file (YAML or JSON).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Eval(EvalCommand),
    Transform(TransformCommand),
    Plan(PlanCommand),
    Hello(HelloCommand),
    Serve(ServeCommand),
}

#[derive(Debug, Clone, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TransformOpArg {
    Map,
    Filter,
    Sum,
}

impl From<TransformOpArg> for TransformOp {
    fn from(value: TransformOpArg) -> Self {
        match value {
            TransformOpArg::Map => TransformOp::Map,
            TransformOpArg::Filter => TransformOp::Filter,
            TransformOpArg::Sum => TransformOp::Sum,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct EvalCommand {
    #[arg(long)]
    pub expr: String,
    /// Variable binding, `name=value`; repeatable.
    #[arg(long = "var", value_parser = parse_variable)]
    pub vars: Vec<(String, f64)>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
pub struct TransformCommand {
    #[arg(long, value_enum)]
    pub op: TransformOpArg,
    /// JSON array of numbers.
    #[arg(long)]
    pub data: String,
    #[arg(long)]
    pub expr: String,
    #[arg(long)]
    pub var_name: Option<String>,
    #[arg(long, default_value_t = false)]
    pub parallel: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
pub struct PlanCommand {
    #[arg(long)]
    pub goal: String,
    #[arg(long = "hint")]
    pub hints: Vec<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub max_steps: Option<i64>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
pub struct HelloCommand {
    #[arg(long, default_value = "")]
    pub name: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServeCommand {
    /// JSONL request file; stdin when absent.
    #[arg(long)]
    pub input: Option<PathBuf>,
    #[arg(long)]
    pub workers: Option<usize>,
}

pub fn parse_variable(raw: &str) -> Result<(String, f64), String> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(format!("expected `name=value`, got `{raw}`"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in `{raw}`"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|error| format!("invalid value for `{name}`: {error}"))?;
    Ok((name.to_string(), value))
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
