mod cli;
mod config;
mod logging;
mod run;

pub use cli::{
    parse_variable, Cli, Commands, EvalCommand, HelloCommand, OutputFormat, PlanCommand, ServeCommand,
    TransformCommand, TransformOpArg,
};
pub use config::{
    load_runner_config, validate_runner_config, ConfigIssue, RunnerConfig, RunnerConfigError, ServiceConfig,
    TransformConfig, RUNNER_CONFIG_SCHEMA_0_0_1,
};
pub use logging::{init_tracing, select_filter_directive, DEFAULT_LOG_FILTER};
pub use run::{
    execute_eval, execute_hello, execute_plan, execute_serve, execute_transform, load_config, RunnerError,
};
