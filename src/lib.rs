// src/lib.rs
// Public library surface for the binary, integration tests and reuse.

pub mod analyze;
pub mod api;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod error;
pub mod explanation;
pub mod metrics;
pub mod prediction;
pub mod service;
pub mod telemetry;
pub mod tokenizer;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::config::AnalyzerConfig;
pub use crate::error::{AnalysisError, AnalysisResult};
pub use crate::service::{ReviewService, SinglePrediction};

use tracing::info;

/// Build the full in-process app: config from env, service, metrics, router.
///
/// Example usage inside your #[shuttle_runtime::main] function:
/// ```ignore
/// let router = review_sentiment_analyzer::app().await?;
/// ```
pub async fn app() -> anyhow::Result<axum::Router> {
    let cfg = AnalyzerConfig::from_env()?;
    let service = ReviewService::from_config(&cfg);
    info!(
        backend = service.classifier_name(),
        positive = cfg.lexicon.positive.len(),
        negative = cfg.lexicon.negative.len(),
        stopwords = cfg.ngrams.stopwords.len(),
        "review service ready"
    );
    metrics::init();
    Ok(api::create_router(api::AppState::new(service)))
}
