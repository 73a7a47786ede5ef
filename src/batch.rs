// src/batch.rs
//! Batch aggregation: predictions, rating distribution, keyword frequency
//! and batch-level n-grams.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::analyze::{KeywordAnalyzer, NgramAnalyzer, NgramSummary};
use crate::error::{AnalysisError, AnalysisResult};
use crate::prediction::{PredictionEngine, TextPrediction};

pub const KEYWORD_TOP_K: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordFrequency {
    pub positive: Vec<KeywordCount>,
    pub negative: Vec<KeywordCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_predictions: usize,
    /// Keys 1..=5, always present, ascending.
    pub rating_distribution: BTreeMap<u8, usize>,
    pub predictions: Vec<TextPrediction>,
    pub ngrams: NgramSummary,
    pub keyword_frequency: KeywordFrequency,
}

/// Count ratings into buckets 1..=5. Values outside that range are ignored.
pub fn rating_distribution(ratings: &[u8]) -> BTreeMap<u8, usize> {
    let mut dist: BTreeMap<u8, usize> = (1..=5).map(|r| (r, 0)).collect();
    for r in ratings {
        if let Some(c) = dist.get_mut(r) {
            *c += 1;
        }
    }
    dist
}

/// Most frequent items, ties in first-seen order.
fn top_counts<'a>(items: impl Iterator<Item = &'a str>, k: usize) -> Vec<KeywordCount> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for it in items {
        *counts.entry(it).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(k)
        .map(|(word, count)| KeywordCount {
            word: word.to_string(),
            count,
        })
        .collect()
}

pub struct BatchAggregator {
    predictions: Arc<PredictionEngine>,
    keywords: Arc<KeywordAnalyzer>,
    ngrams: Arc<NgramAnalyzer>,
}

impl BatchAggregator {
    pub fn new(
        predictions: Arc<PredictionEngine>,
        keywords: Arc<KeywordAnalyzer>,
        ngrams: Arc<NgramAnalyzer>,
    ) -> Self {
        Self {
            predictions,
            keywords,
            ngrams,
        }
    }

    pub async fn aggregate<S: AsRef<str>>(&self, texts: &[S]) -> AnalysisResult<BatchSummary> {
        if texts.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        crate::metrics::record_batch_size(texts.len());

        let predictions = self.predictions.predict_batch(texts).await?;
        let ngrams = self.ngrams.analyze_batch(texts);
        let keyword_frequency = self.keyword_frequency(texts);

        let ratings: Vec<u8> = predictions.iter().map(|p| p.rating).collect();
        let rating_distribution = rating_distribution(&ratings);
        info!(
            size = texts.len(),
            distribution = ?rating_distribution,
            "batch aggregated"
        );

        Ok(BatchSummary {
            total_predictions: predictions.len(),
            rating_distribution,
            predictions,
            ngrams,
            keyword_frequency,
        })
    }

    /// Keyword lists of every text flattened and counted, top 10 per polarity.
    pub fn keyword_frequency<S: AsRef<str>>(&self, texts: &[S]) -> KeywordFrequency {
        let analyses: Vec<_> = texts
            .iter()
            .map(|t| self.keywords.analyze(t.as_ref()))
            .collect();

        KeywordFrequency {
            positive: top_counts(
                analyses
                    .iter()
                    .flat_map(|a| a.positive_keywords.iter().map(String::as_str)),
                KEYWORD_TOP_K,
            ),
            negative: top_counts(
                analyses
                    .iter()
                    .flat_map(|a| a.negative_keywords.iter().map(String::as_str)),
                KEYWORD_TOP_K,
            ),
        }
    }
}
