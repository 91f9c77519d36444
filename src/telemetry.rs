use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    if config.json_logs {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init()?;
    }

    tracing::debug!("barangay-verify telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the events of one session
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create the span wrapping one mounted verification session
pub fn create_verification_span(operation: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "residency_verification",
        operation = operation,
        correlation.id = correlation_id,
    )
}
