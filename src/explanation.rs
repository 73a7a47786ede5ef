// src/explanation.rs
//! Word-importance explanation built from classifier attributions.
//!
//! Magnitudes are divided by the largest magnitude of the pass (all zero →
//! all scores zero). Each content token then gets a sign: keyword evidence
//! decides when present, otherwise the token leans towards the predicted
//! class, damped by `neutral_weight`. This is an approximate, display-level
//! heuristic; it does not claim to be a faithful attribution.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::analyze::{KeywordAnalyzer, Polarity};
use crate::classifier::{AttributedToken, Attribution, DynClassifier};
use crate::config::ExplanationConfig;
use crate::error::AnalysisResult;
use crate::prediction::{OverallSentiment, PredictionResult};
use crate::telemetry::anon_hash;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordImportance {
    pub word: String,
    /// Signed, within [-1, 1].
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// Content tokens in model order, at most `max_words`.
    pub words: Vec<WordImportance>,
    pub overall_sentiment: OverallSentiment,
}

impl Explanation {
    pub fn word_list(&self) -> Vec<&str> {
        self.words.iter().map(|w| w.word.as_str()).collect()
    }

    pub fn importance_scores(&self) -> Vec<f32> {
        self.words.iter().map(|w| w.score).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedPrediction {
    #[serde(flatten)]
    pub prediction: PredictionResult,
    pub explanation: Explanation,
}

pub struct ExplanationEngine {
    classifier: DynClassifier,
    keywords: Arc<KeywordAnalyzer>,
    cfg: ExplanationConfig,
}

impl ExplanationEngine {
    pub fn new(
        classifier: DynClassifier,
        keywords: Arc<KeywordAnalyzer>,
        cfg: ExplanationConfig,
    ) -> Self {
        Self {
            classifier,
            keywords,
            cfg,
        }
    }

    /// One attribution pass yields both the prediction and its explanation.
    pub async fn explain(&self, text: &str) -> AnalysisResult<ExplainedPrediction> {
        let attributed = self.attribute(text).await;
        crate::metrics::record_prediction(
            &attributed.as_ref().map(|(p, _)| *p).map_err(Clone::clone),
        );
        let (prediction, attribution) = attributed?;

        let words = self.score_tokens(&attribution.tokens, prediction.class_index());
        debug!(
            id = %anon_hash(text),
            tokens = attribution.tokens.len(),
            kept = words.len(),
            "explained"
        );

        Ok(ExplainedPrediction {
            prediction,
            explanation: Explanation {
                words,
                overall_sentiment: prediction.sentiment(),
            },
        })
    }

    async fn attribute(&self, text: &str) -> AnalysisResult<(PredictionResult, Attribution)> {
        let normalized = self.classifier.normalize(text).await?;
        let attribution = self.classifier.attribute(&normalized).await?;
        let prediction = PredictionResult::from_probabilities(&attribution.probabilities)?;
        Ok((prediction, attribution))
    }

    /// Normalize, sign and truncate attributed tokens.
    pub fn score_tokens(
        &self,
        tokens: &[AttributedToken],
        predicted_class: usize,
    ) -> Vec<WordImportance> {
        let max = tokens
            .iter()
            .map(|t| sanitize(t.magnitude))
            .fold(0.0f32, f32::max);
        if max == 0.0 {
            debug!(tokens = tokens.len(), "degenerate attribution, scores left at zero");
        }

        let lean = if predicted_class >= self.cfg.positive_class_threshold {
            self.cfg.neutral_weight
        } else {
            -self.cfg.neutral_weight
        };

        tokens
            .iter()
            .filter(|t| !t.special)
            .take(self.cfg.max_words)
            .map(|t| {
                let base = if max > 0.0 {
                    sanitize(t.magnitude) / max
                } else {
                    0.0
                };
                let score = match self.keywords.token_polarity(&t.token) {
                    Some(Polarity::Positive) => base,
                    Some(Polarity::Negative) => -base,
                    None => base * lean,
                };
                WordImportance {
                    word: t.token.clone(),
                    score,
                }
            })
            .collect()
    }
}

/// Magnitudes are absolute values; non-finite input counts as zero.
fn sanitize(m: f32) -> f32 {
    if m.is_finite() {
        m.abs()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassProbabilities, Classifier};
    use crate::error::AnalysisError;
    use async_trait::async_trait;

    struct Fixed(Attribution);

    #[async_trait]
    impl Classifier for Fixed {
        async fn classify(&self, _text: &str) -> AnalysisResult<ClassProbabilities> {
            Ok(self.0.probabilities)
        }
        async fn attribute(&self, _text: &str) -> AnalysisResult<Attribution> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn keywords() -> Arc<KeywordAnalyzer> {
        Arc::new(KeywordAnalyzer::from_lists(&["tốt"], &["tệ"]))
    }

    fn engine_with(cfg: ExplanationConfig, attribution: Attribution) -> ExplanationEngine {
        ExplanationEngine::new(Arc::new(Fixed(attribution)), keywords(), cfg)
    }

    fn tokens() -> Vec<AttributedToken> {
        vec![
            AttributedToken::special("<s>", 4.0),
            AttributedToken::content("hàng", 1.0),
            AttributedToken::content("tốt", 2.0),
            AttributedToken::content("tệ", 2.0),
            AttributedToken::special("</s>", 0.5),
        ]
    }

    #[tokio::test]
    async fn signs_follow_keywords_then_predicted_class() {
        let e = engine_with(
            ExplanationConfig::default(),
            Attribution {
                probabilities: [0.0, 0.0, 0.1, 0.2, 0.7],
                tokens: tokens(),
            },
        );
        let out = e.explain("hàng tốt tệ").await.unwrap();
        assert_eq!(out.prediction.rating, 5);
        assert_eq!(out.explanation.overall_sentiment, OverallSentiment::Positive);
        assert_eq!(out.explanation.word_list(), vec!["hàng", "tốt", "tệ"]);
        // max is the special <s> token: 4.0
        assert_eq!(out.explanation.importance_scores(), vec![0.125, 0.5, -0.5]);
    }

    #[test]
    fn non_keyword_tokens_lean_negative_below_threshold() {
        let e = engine_with(
            ExplanationConfig::default(),
            Attribution {
                probabilities: [1.0, 0.0, 0.0, 0.0, 0.0],
                tokens: vec![],
            },
        );
        let words = e.score_tokens(&[AttributedToken::content("hàng", 3.0)], 1);
        assert_eq!(words[0].score, -0.5);
        let words = e.score_tokens(&[AttributedToken::content("hàng", 3.0)], 2);
        assert_eq!(words[0].score, 0.5);
    }

    #[test]
    fn heuristic_constants_are_configurable() {
        let cfg = ExplanationConfig {
            neutral_weight: 0.25,
            positive_class_threshold: 4,
            max_words: 2,
        };
        let e = engine_with(
            cfg,
            Attribution {
                probabilities: [0.2; 5],
                tokens: vec![],
            },
        );
        let words = e.score_tokens(&tokens(), 3);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].score, -0.0625);
    }

    #[test]
    fn all_zero_magnitudes_do_not_divide() {
        let e = engine_with(
            ExplanationConfig::default(),
            Attribution {
                probabilities: [0.2; 5],
                tokens: vec![],
            },
        );
        let zero = vec![
            AttributedToken::content("tốt", 0.0),
            AttributedToken::content("hàng", 0.0),
        ];
        let words = e.score_tokens(&zero, 4);
        assert!(words.iter().all(|w| w.score == 0.0 && !w.score.is_nan()));
    }

    #[test]
    fn scores_stay_within_unit_interval_and_cap_at_max_words() {
        let e = engine_with(
            ExplanationConfig::default(),
            Attribution {
                probabilities: [0.2; 5],
                tokens: vec![],
            },
        );
        let many: Vec<AttributedToken> = (0..40)
            .map(|i| {
                let w = if i % 3 == 0 { "tệ" } else { "tốt" };
                AttributedToken::content(w, (i as f32 * 0.7).sin() * 9.0)
            })
            .chain(std::iter::once(AttributedToken::content("x", f32::NAN)))
            .collect();
        let words = e.score_tokens(&many, 0);
        assert_eq!(words.len(), 20);
        assert!(words.iter().all(|w| (-1.0..=1.0).contains(&w.score)));
    }

    #[tokio::test]
    async fn attribution_failure_propagates() {
        struct Broken;
        #[async_trait]
        impl Classifier for Broken {
            async fn classify(&self, _t: &str) -> AnalysisResult<ClassProbabilities> {
                Err(AnalysisError::ModelUnavailable("never loaded".into()))
            }
            async fn attribute(&self, _t: &str) -> AnalysisResult<Attribution> {
                Err(AnalysisError::ModelUnavailable("never loaded".into()))
            }
            fn name(&self) -> &'static str {
                "broken"
            }
        }
        let e = ExplanationEngine::new(Arc::new(Broken), keywords(), ExplanationConfig::default());
        let err = e.explain("tốt").await.unwrap_err();
        assert!(matches!(err, AnalysisError::ModelUnavailable(_)));
    }
}
