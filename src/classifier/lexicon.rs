// src/classifier/lexicon.rs
//! Deterministic, keyword-driven classifier used offline and in tests.
//!
//! It is not a sentiment model. Net keyword evidence moves a target class
//! away from the neutral middle (index 2); class logits fall off linearly
//! with distance to that target and go through softmax. Attribution marks
//! keyword tokens with full magnitude and everything else with a small one,
//! wrapped in `<s>` / `</s>` like a transformer segmentation.

use async_trait::async_trait;
use std::sync::Arc;

use super::{softmax, AttributedToken, Attribution, ClassProbabilities, Classifier, NUM_CLASSES};
use crate::analyze::KeywordAnalyzer;
use crate::error::AnalysisResult;
use crate::tokenizer::tokenize;

const NEUTRAL_CLASS: f32 = 2.0;
const LOGIT_SLOPE: f32 = 1.5;
const KEYWORD_MAGNITUDE: f32 = 1.0;
const BACKGROUND_MAGNITUDE: f32 = 0.2;

pub struct LexiconClassifier {
    keywords: Arc<KeywordAnalyzer>,
}

impl LexiconClassifier {
    pub fn new(keywords: Arc<KeywordAnalyzer>) -> Self {
        Self { keywords }
    }

    fn probabilities(&self, text: &str) -> ClassProbabilities {
        let kw = self.keywords.analyze(text);
        let net = kw.positive_count as f32 - kw.negative_count as f32;
        let target = (NEUTRAL_CLASS + net).clamp(0.0, (NUM_CLASSES - 1) as f32);

        let mut logits = [0.0f32; NUM_CLASSES];
        for (i, l) in logits.iter_mut().enumerate() {
            *l = -LOGIT_SLOPE * (i as f32 - target).abs();
        }
        softmax(&logits)
    }
}

#[async_trait]
impl Classifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> AnalysisResult<ClassProbabilities> {
        Ok(self.probabilities(text))
    }

    async fn attribute(&self, text: &str) -> AnalysisResult<Attribution> {
        let toks = tokenize(text);
        let mut tokens = Vec::new();
        tokens.push(AttributedToken::special("<s>", 0.0));
        for w in toks.words() {
            let magnitude = if self.keywords.token_polarity(&w).is_some() {
                KEYWORD_MAGNITUDE
            } else {
                BACKGROUND_MAGNITUDE
            };
            tokens.push(AttributedToken::content(w, magnitude));
        }
        tokens.push(AttributedToken::special("</s>", 0.0));

        Ok(Attribution {
            probabilities: self.probabilities(text),
            tokens,
        })
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
