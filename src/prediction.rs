// src/prediction.rs
//! # Prediction Engine
//! Turns classifier probabilities into a typed 1–5 star rating.
//!
//! rating = argmax class index + 1, confidence = probability at argmax.
//! Batches may run concurrently (bounded by `concurrency`); results are
//! always returned in input order.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::classifier::{argmax, ClassProbabilities, Classifier, DynClassifier};
use crate::error::{AnalysisError, AnalysisResult};
use crate::telemetry::anon_hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallSentiment {
    Positive,
    Negative,
    Neutral,
}

impl OverallSentiment {
    /// ≥4 stars positive, ≤2 negative, 3 neutral.
    pub fn from_rating(rating: u8) -> Self {
        if rating >= 4 {
            OverallSentiment::Positive
        } else if rating <= 2 {
            OverallSentiment::Negative
        } else {
            OverallSentiment::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub rating: u8,
    pub confidence: f32,
}

impl PredictionResult {
    pub fn from_probabilities(probs: &ClassProbabilities) -> AnalysisResult<Self> {
        let (idx, p) = argmax(probs)?;
        Ok(Self {
            rating: idx as u8 + 1,
            confidence: p.clamp(0.0, 1.0),
        })
    }

    /// Zero-based class index the rating came from.
    pub fn class_index(&self) -> usize {
        usize::from(self.rating.saturating_sub(1))
    }

    pub fn sentiment(&self) -> OverallSentiment {
        OverallSentiment::from_rating(self.rating)
    }
}

/// A batch entry: the input text with its prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPrediction {
    pub text: String,
    pub rating: u8,
    pub confidence: f32,
}

impl TextPrediction {
    fn new(text: String, p: PredictionResult) -> Self {
        Self {
            text,
            rating: p.rating,
            confidence: p.confidence,
        }
    }
}

pub struct PredictionEngine {
    classifier: DynClassifier,
    concurrency: usize,
}

impl PredictionEngine {
    pub fn new(classifier: DynClassifier, concurrency: usize) -> Self {
        Self {
            classifier,
            concurrency: concurrency.max(1),
        }
    }

    pub fn classifier(&self) -> &DynClassifier {
        &self.classifier
    }

    pub async fn predict(&self, text: &str) -> AnalysisResult<PredictionResult> {
        let out = predict_with(self.classifier.as_ref(), text).await;
        crate::metrics::record_prediction(&out);
        out
    }

    /// Predict every text independently. Empty input is rejected before any
    /// classifier call; the first failure aborts the batch.
    pub async fn predict_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> AnalysisResult<Vec<TextPrediction>> {
        if texts.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        debug!(size = texts.len(), concurrency = self.concurrency, "predict_batch");

        if self.concurrency == 1 || texts.len() == 1 {
            let mut out = Vec::with_capacity(texts.len());
            for t in texts {
                let p = self.predict(t.as_ref()).await?;
                out.push(TextPrediction::new(t.as_ref().to_string(), p));
            }
            return Ok(out);
        }

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();
        for (idx, t) in texts.iter().enumerate() {
            let clf = Arc::clone(&self.classifier);
            let permits = Arc::clone(&permits);
            let text = t.as_ref().to_string();
            set.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| AnalysisError::Inference(e.to_string()))?;
                let p = predict_with(clf.as_ref(), &text).await;
                crate::metrics::record_prediction(&p);
                p.map(|p| (idx, p))
            });
        }

        let mut slots: Vec<Option<PredictionResult>> = vec![None; texts.len()];
        while let Some(joined) = set.join_next().await {
            let (idx, p) = joined
                .map_err(|e| AnalysisError::Inference(format!("prediction task failed: {e}")))??;
            slots[idx] = Some(p);
        }

        texts
            .iter()
            .zip(slots)
            .map(|(t, p)| {
                p.map(|p| TextPrediction::new(t.as_ref().to_string(), p))
                    .ok_or_else(|| AnalysisError::Inference("missing batch result".to_string()))
            })
            .collect()
    }
}

async fn predict_with(clf: &dyn Classifier, text: &str) -> AnalysisResult<PredictionResult> {
    let normalized = clf.normalize(text).await?;
    let probs = clf.classify(&normalized).await?;
    let p = PredictionResult::from_probabilities(&probs)?;
    debug!(id = %anon_hash(text), rating = p.rating, confidence = p.confidence, "predicted");
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Attribution;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Rating encoded in the text ("r1".."r5"); later texts finish first.
    struct Scripted {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Classifier for Scripted {
        async fn classify(&self, text: &str) -> AnalysisResult<ClassProbabilities> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let r: usize = text.trim_start_matches('r').parse().unwrap_or(3);
            tokio::time::sleep(Duration::from_millis((6 - r as u64) * 5)).await;
            let mut p = [0.05f32; 5];
            p[r - 1] = 0.8;
            Ok(p)
        }
        async fn attribute(&self, _text: &str) -> AnalysisResult<Attribution> {
            Err(AnalysisError::Inference("unused".into()))
        }
        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn engine(concurrency: usize) -> (PredictionEngine, Arc<Scripted>) {
        let s = Arc::new(Scripted {
            calls: AtomicUsize::new(0),
        });
        (PredictionEngine::new(s.clone(), concurrency), s)
    }

    #[test]
    fn rating_is_class_index_plus_one() {
        let p = PredictionResult::from_probabilities(&[0.1, 0.1, 0.1, 0.6, 0.1]).unwrap();
        assert_eq!(p.rating, 4);
        assert!((p.confidence - 0.6).abs() < 1e-6);
        assert_eq!(p.class_index(), 3);
        assert_eq!(p.sentiment(), OverallSentiment::Positive);
    }

    #[test]
    fn sentiment_thresholds() {
        assert_eq!(OverallSentiment::from_rating(1), OverallSentiment::Negative);
        assert_eq!(OverallSentiment::from_rating(2), OverallSentiment::Negative);
        assert_eq!(OverallSentiment::from_rating(3), OverallSentiment::Neutral);
        assert_eq!(OverallSentiment::from_rating(5), OverallSentiment::Positive);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected_before_classifying() {
        let (e, s) = engine(4);
        let err = e.predict_batch::<&str>(&[]).await.unwrap_err();
        assert_eq!(err, AnalysisError::EmptyInput);
        assert_eq!(s.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_batch_preserves_input_order() {
        let texts = ["r1", "r2", "r3", "r4", "r5", "r2"];
        for c in [1, 3, 8] {
            let (e, _) = engine(c);
            let out = e.predict_batch(&texts).await.unwrap();
            let got: Vec<&str> = out.iter().map(|p| p.text.as_str()).collect();
            assert_eq!(got, texts, "concurrency {c}");
            let ratings: Vec<u8> = out.iter().map(|p| p.rating).collect();
            assert_eq!(ratings, vec![1, 2, 3, 4, 5, 2]);
        }
    }
}
