use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "warn";

static TRACING_INIT: Once = Once::new();

/// Installs the stderr subscriber. Safe to call more than once; only the
/// first call has an effect.
pub fn init_tracing(configured_level: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let directive = select_filter_directive(std::env::var("RUST_LOG").ok(), configured_level);
        let filter = EnvFilter::try_new(directive.as_str()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .try_init();
    });
}

/// `RUST_LOG` wins over the configured level, which wins over `warn`.
pub fn select_filter_directive(env_value: Option<String>, configured_level: Option<&str>) -> String {
    env_value
        .filter(|value| !value.trim().is_empty())
        .or_else(|| configured_level.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

#[cfg(test)]
#[path = "logging_test.rs"]
mod tests;
