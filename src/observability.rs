//! Observability module for centralized metrics, tracing, and logging setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Metrics collection and Prometheus export
//! - Spans for Telegram handlers and flow steps

use anyhow::Result;

use crate::observability_config::ObservabilityConfig;

pub mod metrics;
pub mod tracing_mod;

pub use self::metrics::{
    init_metrics_with_config, record_markup_rejection, record_publicise_event,
    record_rejection_feedback, record_review_decision, record_review_post,
    record_telegram_update, start_metrics_server,
};
pub use self::tracing_mod::{flow_span, init_tracing_with_config, telegram_span};

/// Initialize the complete observability stack with custom configuration
pub async fn init_observability_with_config(config: ObservabilityConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    // Initialize tracing first so metrics setup is logged
    init_tracing_with_config(&config)?;

    if config.enable_metrics_export {
        let metrics_handle = init_metrics_with_config(&config)?;
        start_metrics_server(metrics_handle, config.metrics_port).await?;
    } else {
        tracing::info!("Metrics export disabled");
    }

    tracing::info!(
        environment = %config.environment,
        metrics_port = %config.metrics_port,
        "Observability stack initialized successfully"
    );
    Ok(())
}
