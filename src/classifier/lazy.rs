// src/classifier/lazy.rs
//! Lazy, single-initialization model guard.
//!
//! The first caller runs the loader (with bounded retries and linear backoff);
//! concurrent callers wait on the same `OnceCell` instead of starting a second
//! load. The outcome is cached either way: after a failed initialization every
//! call reports `ModelUnavailable` without touching the network again.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::{Attribution, ClassProbabilities, Classifier};
use crate::error::{AnalysisError, AnalysisResult};

/// Fetches/initializes a model. Called at most once per `LazyClassifier`
/// (plus in-initialization retries).
#[async_trait]
pub trait ModelLoader: Send + Sync + 'static {
    type Model: Classifier + 'static;

    async fn load(&self) -> anyhow::Result<Self::Model>;

    fn name(&self) -> &'static str;
}

pub struct LazyClassifier<L: ModelLoader> {
    loader: L,
    attempts: u32,
    backoff: Duration,
    cell: OnceCell<Result<Arc<L::Model>, String>>,
}

impl<L: ModelLoader> LazyClassifier<L> {
    /// `attempts` is clamped to at least one.
    pub fn new(loader: L, attempts: u32, backoff: Duration) -> Self {
        Self {
            loader,
            attempts: attempts.max(1),
            backoff,
            cell: OnceCell::new(),
        }
    }

    /// True once a load has succeeded.
    pub fn is_loaded(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }

    /// Trigger initialization eagerly (e.g. at startup).
    pub async fn warm_up(&self) -> AnalysisResult<()> {
        self.model().await.map(|_| ())
    }

    async fn model(&self) -> AnalysisResult<Arc<L::Model>> {
        let slot = self.cell.get_or_init(|| self.load_with_retries()).await;
        match slot {
            Ok(m) => Ok(Arc::clone(m)),
            Err(e) => Err(AnalysisError::ModelUnavailable(e.clone())),
        }
    }

    async fn load_with_retries(&self) -> Result<Arc<L::Model>, String> {
        let name = self.loader.name();
        let mut last_err = String::new();
        for attempt in 1..=self.attempts {
            info!(target: "classifier", backend = name, attempt, "loading model");
            match self.loader.load().await {
                Ok(m) => {
                    info!(target: "classifier", backend = name, attempt, "model loaded");
                    return Ok(Arc::new(m));
                }
                Err(e) => {
                    crate::metrics::record_model_load_failure(name);
                    warn!(target: "classifier", backend = name, attempt, error = %e, "model load failed");
                    last_err = format!("{name}: {e:#}");
                    if attempt < self.attempts {
                        tokio::time::sleep(self.backoff * attempt).await;
                    }
                }
            }
        }
        Err(format!(
            "initialization failed after {} attempt(s): {last_err}",
            self.attempts
        ))
    }
}

#[async_trait]
impl<L: ModelLoader> Classifier for LazyClassifier<L> {
    async fn normalize(&self, text: &str) -> AnalysisResult<String> {
        self.model().await?.normalize(text).await
    }

    async fn classify(&self, text: &str) -> AnalysisResult<ClassProbabilities> {
        self.model().await?.classify(text).await
    }

    async fn attribute(&self, text: &str) -> AnalysisResult<Attribution> {
        self.model().await?.attribute(text).await
    }

    fn name(&self) -> &'static str {
        self.loader.name()
    }
}
