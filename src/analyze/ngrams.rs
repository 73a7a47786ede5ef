// src/analyze/ngrams.rs
//! Word n-gram frequency extraction (orders 1..=3).
//!
//! Per text: tokenize, drop stopwords and single-character tokens, slide a
//! window of `n` tokens and join each window with one space. Counts are
//! accumulated across all texts of a call; ranking is by descending count
//! with ties kept in first-seen order.

use indexmap::IndexMap;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;

use crate::config::NgramConfig;
use crate::tokenizer::tokenize;

pub const SINGLE_TOP_K: usize = 10;
pub const BATCH_TOP_K: usize = 15;
pub const BATCH_TRIGRAM_TOP_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NgramOrder {
    Unigram = 1,
    Bigram = 2,
    Trigram = 3,
}

impl NgramOrder {
    pub fn n(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for NgramOrder {
    type Error = usize;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Self::Unigram),
            2 => Ok(Self::Bigram),
            3 => Ok(Self::Trigram),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NgramRecord {
    pub ngram: String,
    #[serde(skip)]
    pub order: NgramOrder,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NgramSummary {
    pub unigrams: Vec<NgramRecord>,
    pub bigrams: Vec<NgramRecord>,
    pub trigrams: Vec<NgramRecord>,
}

#[derive(Debug, Clone)]
pub struct NgramAnalyzer {
    stopwords: HashSet<String>,
}

impl NgramAnalyzer {
    pub fn new(cfg: &NgramConfig) -> Self {
        Self::from_stopwords(&cfg.stopwords)
    }

    pub fn from_stopwords<S: AsRef<str>>(stopwords: &[S]) -> Self {
        Self {
            stopwords: stopwords
                .iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Tokens that take part in n-grams.
    pub fn content_words(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .words()
            .filter(|w| w.chars().count() > 1 && !self.stopwords.contains(&**w))
            .map(Cow::into_owned)
            .collect()
    }

    /// Top `top_k` n-grams of the given order over all `texts`.
    pub fn extract_ngrams<S: AsRef<str>>(
        &self,
        texts: &[S],
        order: NgramOrder,
        top_k: usize,
    ) -> Vec<NgramRecord> {
        let n = order.n();
        let mut counts: IndexMap<String, usize> = IndexMap::new();

        for text in texts {
            let words = self.content_words(text.as_ref());
            for window in words.windows(n) {
                *counts.entry(window.join(" ")).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        // sort_by is stable: equal counts keep insertion order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(top_k)
            .map(|(ngram, count)| NgramRecord {
                ngram,
                order,
                count,
            })
            .collect()
    }

    pub fn analyze_single(&self, text: &str) -> NgramSummary {
        let texts = [text];
        NgramSummary {
            unigrams: self.extract_ngrams(&texts, NgramOrder::Unigram, SINGLE_TOP_K),
            bigrams: self.extract_ngrams(&texts, NgramOrder::Bigram, SINGLE_TOP_K),
            trigrams: self.extract_ngrams(&texts, NgramOrder::Trigram, SINGLE_TOP_K),
        }
    }

    pub fn analyze_batch<S: AsRef<str>>(&self, texts: &[S]) -> NgramSummary {
        NgramSummary {
            unigrams: self.extract_ngrams(texts, NgramOrder::Unigram, BATCH_TOP_K),
            bigrams: self.extract_ngrams(texts, NgramOrder::Bigram, BATCH_TOP_K),
            trigrams: self.extract_ngrams(texts, NgramOrder::Trigram, BATCH_TRIGRAM_TOP_K),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> NgramAnalyzer {
        NgramAnalyzer::from_stopwords(&["và", "rất", "shop", "hàng"])
    }

    fn pairs(v: &[NgramRecord]) -> Vec<(&str, usize)> {
        v.iter().map(|r| (r.ngram.as_str(), r.count)).collect()
    }

    #[test]
    fn stopwords_and_short_tokens_are_dropped() {
        let a = analyzer();
        assert_eq!(
            a.content_words("Shop giao hàng rất nhanh và đẹp, 5 sao"),
            vec!["giao", "nhanh", "đẹp", "sao"]
        );
    }

    #[test]
    fn windows_skip_over_removed_tokens() {
        let a = analyzer();
        let bi = a.extract_ngrams(&["giao rất nhanh"], NgramOrder::Bigram, 10);
        assert_eq!(pairs(&bi), vec![("giao nhanh", 1)]);
    }

    #[test]
    fn counts_accumulate_across_texts_with_stable_ties() {
        let a = analyzer();
        let texts = ["đẹp bền", "bền rẻ", "rẻ đẹp", "đẹp"];
        let uni = a.extract_ngrams(&texts, NgramOrder::Unigram, 10);
        assert_eq!(pairs(&uni), vec![("đẹp", 3), ("bền", 2), ("rẻ", 2)]);
    }

    #[test]
    fn top_k_truncates() {
        let a = analyzer();
        let uni = a.extract_ngrams(&["một hai ba bốn năm"], NgramOrder::Unigram, 2);
        assert_eq!(pairs(&uni), vec![("một", 1), ("hai", 1)]);
    }

    #[test]
    fn too_short_texts_produce_no_trigrams() {
        let a = analyzer();
        let s = a.analyze_single("giao nhanh");
        assert_eq!(s.unigrams.len(), 2);
        assert_eq!(s.bigrams.len(), 1);
        assert!(s.trigrams.is_empty());
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let a = analyzer();
        let s = a.analyze_batch::<&str>(&[]);
        assert_eq!(s, NgramSummary::default());
        assert!(a.analyze_single("").unigrams.is_empty());
    }

    #[test]
    fn unigram_counts_sum_to_content_word_count() {
        let a = analyzer();
        for text in [
            "Sản phẩm rất tốt, đóng gói cẩn thận",
            "tốt tốt tốt và tốt",
            "a b c",
        ] {
            let total: usize = a
                .extract_ngrams(&[text], NgramOrder::Unigram, usize::MAX)
                .iter()
                .map(|r| r.count)
                .sum();
            assert_eq!(total, a.content_words(text).len(), "for {text:?}");
        }
    }

    #[test]
    fn order_conversion_is_bounded() {
        assert_eq!(NgramOrder::try_from(2), Ok(NgramOrder::Bigram));
        assert_eq!(NgramOrder::try_from(4), Err(4));
        assert_eq!(NgramOrder::Trigram.n(), 3);
    }
}
