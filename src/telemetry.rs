use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::config;

/// Initialize tracing with structured logging.
/// RUST_LOG wins over the configured log level when set.
pub fn init_telemetry() -> Result<()> {
    let observability = &config()?.observability;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&observability.log_level));

    if observability.json_output {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .with(filter)
            .init();
    }

    tracing::debug!("BaseBase telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking related operations
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span covering one provisioning run
pub fn create_provisioning_span(
    operation: &str,
    project_id: &str,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "provisioning",
        operation = operation,
        project.id = project_id,
        correlation.id = correlation_id,
    )
}
