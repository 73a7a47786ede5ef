// src/analyze/mod.rs
//! Text analyzers: lexicon keywords and word n-grams. Both are pure and
//! infallible on any string input, including the empty string.

pub mod keywords;
pub mod ngrams;

// Re-export convenient types.
pub use crate::analyze::keywords::{
    highlight, render_spans, spans, HighlightSpan, KeywordAnalysis, KeywordAnalyzer,
    KeywordMatch, Polarity,
};
pub use crate::analyze::ngrams::{NgramAnalyzer, NgramOrder, NgramRecord, NgramSummary};
