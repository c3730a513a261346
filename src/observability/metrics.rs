//! Metrics collection and Prometheus export module.
//!
//! This module provides:
//! - Prometheus recorder and metrics server setup
//! - Recording functions for the publicise flow and review decisions

use anyhow::Result;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::observability_config::ObservabilityConfig;

/// Install the global Prometheus recorder
pub fn init_metrics_with_config(config: &ObservabilityConfig) -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    tracing::info!(
        metrics_enabled = %config.enable_metrics_export,
        "Metrics collection initialized"
    );
    Ok(handle)
}

/// Serve `/metrics` plus liveness/readiness probes on the configured port
pub async fn start_metrics_server(metrics_handle: PrometheusHandle, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on {}", addr);

    tokio::spawn(async move {
        loop {
            let stream = match listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    tracing::error!("Error accepting connection: {}", e);
                    continue;
                }
            };
            let metrics_handle = metrics_handle.clone();

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = hyper::service::service_fn(
                    move |req: hyper::Request<hyper::body::Incoming>| {
                        let metrics_handle = metrics_handle.clone();
                        async move {
                            let response = match (req.method(), req.uri().path()) {
                                (&hyper::Method::GET, "/metrics") => {
                                    hyper::Response::new(metrics_handle.render())
                                }
                                (&hyper::Method::GET, "/health/live")
                                | (&hyper::Method::GET, "/health/ready") => {
                                    hyper::Response::new("OK".to_string())
                                }
                                _ => {
                                    let mut response =
                                        hyper::Response::new("Not Found".to_string());
                                    *response.status_mut() = hyper::StatusCode::NOT_FOUND;
                                    response
                                }
                            };
                            Ok::<_, std::convert::Infallible>(response)
                        }
                    },
                );

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::error!("Error serving connection: {:?}", err);
                }
            });
        }
    });

    Ok(())
}

/// Record an inbound Telegram update by kind (message, photo, callback...)
pub fn record_telegram_update(kind: &'static str) {
    metrics::counter!("telegram_updates_total", "kind" => kind).increment(1);
}

/// Record a step accepted by the publicise flow
pub fn record_publicise_event(event: &'static str) {
    metrics::counter!("publicise_events_total", "event" => event).increment(1);
}

/// Record a review card delivery attempt
pub fn record_review_post(success: bool, has_photo: bool) {
    metrics::counter!(
        "review_posts_total",
        "result" => if success { "success" } else { "failure" },
        "photo" => if has_photo { "yes" } else { "no" }
    )
    .increment(1);
}

/// Record a moderator decision; `action` is "accept", "reject" or "invalid"
pub fn record_review_decision(action: &'static str) {
    metrics::counter!("review_decisions_total", "action" => action).increment(1);
}

pub fn record_markup_rejection() {
    metrics::counter!("markup_rejections_total").increment(1);
}

/// Record a /feedback outcome ("sent", "failed", "no_target", "empty")
pub fn record_rejection_feedback(result: &'static str) {
    metrics::counter!("rejection_feedback_total", "result" => result).increment(1);
}
