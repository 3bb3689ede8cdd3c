//! Logging subscriber initialisation.

use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingConfig};

/// Errors raised while initialising logging.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// Failed to initialise tracing subscriber.
    #[error("failed to initialise tracing subscriber: {0}")]
    TracingSubscriber(#[from] tracing_subscriber::util::TryInitError),

    /// The log level is not a valid filter directive.
    #[error("invalid log level: {0}")]
    InvalidLogLevel(#[from] tracing_subscriber::filter::ParseError),
}

/// Install the global `tracing` subscriber. Logs go to stderr so they never
/// interleave with the report on stdout.
///
/// # Errors
///
/// Returns an [`ObservabilityError`] if the log level cannot be parsed or a
/// global subscriber is already set.
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), ObservabilityError> {
    match config.log_format {
        LogFormat::Compact => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true),
        ),
        LogFormat::Json => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true),
        ),
    }
}

/// `log_level` has already been resolved from the flag, then `RUST_LOG`.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ObservabilityError> {
    Ok(EnvFilter::try_new(&config.log_level)?)
}

fn init_with_layer<L>(config: &LoggingConfig, fmt_layer: L) -> Result<(), ObservabilityError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(config)?)
        .try_init()?;

    Ok(())
}
