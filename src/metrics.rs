// src/metrics.rs
//! Prometheus counters for predictions, batches and model loading.
//!
//! Recording is a no-op until `init()` installs the global recorder.

use axum::{routing::get, Router};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::warn;

use crate::error::AnalysisResult;
use crate::prediction::PredictionResult;

static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the Prometheus recorder once per process.
pub fn init() -> Option<PrometheusHandle> {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(h) => Some(h),
            Err(e) => {
                warn!(error = %e, "prometheus recorder not installed");
                None
            }
        })
        .clone()
}

/// `/metrics` in the Prometheus exposition format.
pub fn router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route(
        "/metrics",
        get(|| async {
            match HANDLE.get().and_then(|h| h.as_ref()) {
                Some(h) => h.render(),
                None => String::new(),
            }
        }),
    )
}

pub fn record_prediction(out: &AnalysisResult<PredictionResult>) {
    match out {
        Ok(p) => counter!("review_predictions_total", "rating" => p.rating.to_string()).increment(1),
        Err(e) => counter!("review_prediction_errors_total", "kind" => e.kind()).increment(1),
    }
}

pub fn record_batch_size(n: usize) {
    histogram!("review_batch_size").record(n as f64);
}

pub fn record_model_load_failure(backend: &'static str) {
    counter!("review_model_load_failures_total", "backend" => backend).increment(1);
}
