// src/service.rs
//! Review analysis service: the single entry point the HTTP layer (or any
//! other boundary) talks to. Explicitly constructed and passed around by
//! `Arc`; there is no global instance.

use serde::Serialize;
use std::sync::Arc;

use crate::analyze::{
    highlight, spans, HighlightSpan, KeywordAnalysis, KeywordAnalyzer, NgramAnalyzer,
    NgramSummary,
};
use crate::batch::{BatchAggregator, BatchSummary};
use crate::classifier::{build_classifier, DynClassifier};
use crate::config::AnalyzerConfig;
use crate::error::AnalysisResult;
use crate::explanation::{Explanation, ExplanationEngine};
use crate::prediction::PredictionEngine;

/// Result of `predict_single`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinglePrediction {
    pub predicted_rating: u8,
    pub confidence_score: f32,
    pub comment: String,
    /// Substitution-based markup (display-only, see `analyze::keywords`).
    pub highlighted_comment: String,
    /// Non-overlapping spans into `comment` for boundary-side rendering.
    pub highlight_spans: Vec<HighlightSpan>,
    pub keywords: KeywordAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

/// Result of `explain`: rating, word importances and keyword hits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedReview {
    pub predicted_rating: u8,
    pub confidence_score: f32,
    pub comment: String,
    pub explanation: Explanation,
    pub keywords: KeywordAnalysis,
}

pub struct ReviewService {
    keywords: Arc<KeywordAnalyzer>,
    ngrams: Arc<NgramAnalyzer>,
    predictions: Arc<PredictionEngine>,
    explanations: ExplanationEngine,
    batches: BatchAggregator,
}

impl ReviewService {
    /// Build analyzers and the configured classifier backend.
    pub fn from_config(cfg: &AnalyzerConfig) -> Self {
        let keywords = Arc::new(KeywordAnalyzer::new(&cfg.lexicon));
        let classifier = build_classifier(cfg, Arc::clone(&keywords));
        Self::assemble(cfg, keywords, classifier)
    }

    /// Same wiring with an injected classifier.
    pub fn with_classifier(cfg: &AnalyzerConfig, classifier: DynClassifier) -> Self {
        let keywords = Arc::new(KeywordAnalyzer::new(&cfg.lexicon));
        Self::assemble(cfg, keywords, classifier)
    }

    fn assemble(
        cfg: &AnalyzerConfig,
        keywords: Arc<KeywordAnalyzer>,
        classifier: DynClassifier,
    ) -> Self {
        let ngrams = Arc::new(NgramAnalyzer::new(&cfg.ngrams));
        let predictions = Arc::new(PredictionEngine::new(
            Arc::clone(&classifier),
            cfg.classifier.concurrency,
        ));
        let explanations =
            ExplanationEngine::new(classifier, Arc::clone(&keywords), cfg.explanation);
        let batches = BatchAggregator::new(
            Arc::clone(&predictions),
            Arc::clone(&keywords),
            Arc::clone(&ngrams),
        );
        Self {
            keywords,
            ngrams,
            predictions,
            explanations,
            batches,
        }
    }

    pub fn keyword_analyzer(&self) -> &KeywordAnalyzer {
        &self.keywords
    }

    pub fn ngram_analyzer(&self) -> &NgramAnalyzer {
        &self.ngrams
    }

    pub fn classifier_name(&self) -> &'static str {
        self.predictions.classifier().name()
    }

    /// Rating + keyword highlighting, plus a word-importance explanation
    /// when asked for.
    pub async fn predict_single(
        &self,
        text: &str,
        include_explanation: bool,
    ) -> AnalysisResult<SinglePrediction> {
        let (prediction, explanation) = if include_explanation {
            let ex = self.explanations.explain(text).await?;
            (ex.prediction, Some(ex.explanation))
        } else {
            (self.predictions.predict(text).await?, None)
        };

        let keywords = self.keywords.analyze(text);
        let highlighted_comment =
            highlight(text, &keywords.positive_keywords, &keywords.negative_keywords);
        let highlight_spans = spans(text, &keywords);

        Ok(SinglePrediction {
            predicted_rating: prediction.rating,
            confidence_score: prediction.confidence,
            comment: text.to_string(),
            highlighted_comment,
            highlight_spans,
            keywords,
            explanation,
        })
    }

    pub async fn explain(&self, text: &str) -> AnalysisResult<ExplainedReview> {
        let ex = self.explanations.explain(text).await?;
        Ok(ExplainedReview {
            predicted_rating: ex.prediction.rating,
            confidence_score: ex.prediction.confidence,
            comment: text.to_string(),
            explanation: ex.explanation,
            keywords: self.keywords.analyze(text),
        })
    }

    pub async fn predict_batch_with_analysis<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> AnalysisResult<BatchSummary> {
        self.batches.aggregate(texts).await
    }

    /// N-grams only; never touches the classifier.
    pub fn analyze_ngrams<S: AsRef<str>>(&self, texts: &[S]) -> NgramSummary {
        self.ngrams.analyze_batch(texts)
    }
}
