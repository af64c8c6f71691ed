//! Tracing setup for the engines and their HTTP surface.

use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Install the global subscriber. An explicit `RUST_LOG` wins; otherwise
/// the configured level applies to the engine crates while dependencies
/// stay at `warn`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => engine_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn engine_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = format!("warn,plan_engine={level},plan_engine_api={level}");
    EnvFilter::try_new(directives).map_err(|source| TelemetryError::EnvFilter {
        value: level.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::engine_filter;

    #[test]
    fn engine_filter_accepts_plain_levels() {
        assert!(engine_filter("info").is_ok());
        assert!(engine_filter("debug").is_ok());
    }

    #[test]
    fn engine_filter_accepts_extra_directives() {
        assert!(engine_filter("info,tower_http=debug").is_ok());
    }
}
