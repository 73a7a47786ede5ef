// src/classifier/mod.rs
//! Classifier collaborator: provider abstraction + concrete backends.
//!
//! The core never runs a model itself. It talks to a `Classifier` that turns
//! normalized text into five class probabilities and, on request, per-token
//! attribution magnitudes aligned to the model's own segmentation.

pub mod lazy;
pub mod lexicon;
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::analyze::KeywordAnalyzer;
use crate::config::{AnalyzerConfig, ClassifierBackend};
use crate::error::{AnalysisError, AnalysisResult};

pub use lazy::{LazyClassifier, ModelLoader};
pub use lexicon::LexiconClassifier;
pub use remote::{RemoteLoader, RemoteModel};

/// Star ratings 1..=5 map to class indices 0..=4.
pub const NUM_CLASSES: usize = 5;

pub type ClassProbabilities = [f32; NUM_CLASSES];

/// One token of the model's segmentation with its raw attribution magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedToken {
    pub token: String,
    pub magnitude: f32,
    /// Control tokens (`<s>`, `</s>`, `<pad>`, ...) carry no content.
    #[serde(default)]
    pub special: bool,
}

impl AttributedToken {
    pub fn content(token: impl Into<String>, magnitude: f32) -> Self {
        Self {
            token: token.into(),
            magnitude,
            special: false,
        }
    }

    pub fn special(token: impl Into<String>, magnitude: f32) -> Self {
        Self {
            token: token.into(),
            magnitude,
            special: true,
        }
    }
}

/// Output of a gradient-attribution pass: the class probabilities of that
/// same forward pass plus per-token magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub probabilities: ClassProbabilities,
    pub tokens: Vec<AttributedToken>,
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Language-specific normalization (word segmentation) applied before
    /// `classify` / `attribute`. Default: collapse whitespace.
    async fn normalize(&self, text: &str) -> AnalysisResult<String> {
        Ok(collapse_whitespace(text))
    }

    async fn classify(&self, text: &str) -> AnalysisResult<ClassProbabilities>;

    async fn attribute(&self, text: &str) -> AnalysisResult<Attribution>;

    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn Classifier>;

/// Index and value of the highest probability; the first maximum wins.
/// Non-finite values are an inference failure, not a valid distribution.
pub fn argmax(probs: &ClassProbabilities) -> AnalysisResult<(usize, f32)> {
    if let Some(bad) = probs.iter().find(|p| !p.is_finite()) {
        return Err(AnalysisError::Inference(format!(
            "non-finite class probability {bad}"
        )));
    }
    let mut best = (0usize, probs[0]);
    for (i, &p) in probs.iter().enumerate().skip(1) {
        if p > best.1 {
            best = (i, p);
        }
    }
    Ok(best)
}

/// Numerically stable softmax over five logits.
pub fn softmax(logits: &ClassProbabilities) -> ClassProbabilities {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut out = [0.0f32; NUM_CLASSES];
    let mut sum = 0.0f32;
    for (o, &l) in out.iter_mut().zip(logits.iter()) {
        *o = (l - max).exp();
        sum += *o;
    }
    for o in out.iter_mut() {
        *o /= sum;
    }
    out
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Factory: build the classifier selected by `[classifier].backend`.
///
/// * `lexicon` → deterministic keyword-driven classifier (no I/O).
/// * `remote`  → HTTP inference server behind a lazy single-initialization
///   guard; nothing is fetched until the first prediction.
pub fn build_classifier(cfg: &AnalyzerConfig, keywords: Arc<KeywordAnalyzer>) -> DynClassifier {
    let c = &cfg.classifier;
    match c.backend {
        ClassifierBackend::Lexicon => Arc::new(LexiconClassifier::new(keywords)),
        ClassifierBackend::Remote => {
            let loader = RemoteLoader::new(&c.endpoint, Duration::from_secs(c.timeout_secs));
            Arc::new(LazyClassifier::new(
                loader,
                c.load_retries,
                Duration::from_millis(c.retry_backoff_ms),
            ))
        }
    }
}
