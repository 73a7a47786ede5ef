// src/config/analyzer.rs
//! Static analyzer configuration: lexicon, stopwords, explanation heuristic
//! and classifier backend.
//!
//! Resolution order:
//! 1) `$ANALYZER_CONFIG_PATH` (must exist)
//! 2) the default file embedded at build time (`config/analyzer.toml`)
//!
//! `CLASSIFIER_BACKEND` / `CLASSIFIER_ENDPOINT` override the `[classifier]`
//! section after parsing.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ANALYZER_CONFIG: &str = include_str!("../../config/analyzer.toml");

pub const ENV_ANALYZER_CONFIG_PATH: &str = "ANALYZER_CONFIG_PATH";
pub const ENV_CLASSIFIER_BACKEND: &str = "CLASSIFIER_BACKEND";
pub const ENV_CLASSIFIER_ENDPOINT: &str = "CLASSIFIER_ENDPOINT";

fn default_neutral_weight() -> f32 {
    0.5
}
fn default_positive_class_threshold() -> usize {
    2
}
fn default_max_words() -> usize {
    20
}
fn default_endpoint() -> String {
    "http://127.0.0.1:8500".to_string()
}
fn default_load_retries() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    500
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_concurrency() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    pub lexicon: LexiconConfig,
    pub ngrams: NgramConfig,
    #[serde(default)]
    pub explanation: ExplanationConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Ordered keyword lists. Order matters only for output ordering among
/// entries of equal length.
#[derive(Debug, Clone, Deserialize)]
pub struct LexiconConfig {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NgramConfig {
    pub stopwords: Vec<String>,
}

/// Sign heuristic for tokens without keyword evidence.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExplanationConfig {
    #[serde(default = "default_neutral_weight")]
    pub neutral_weight: f32,
    #[serde(default = "default_positive_class_threshold")]
    pub positive_class_threshold: usize,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self {
            neutral_weight: default_neutral_weight(),
            positive_class_threshold: default_positive_class_threshold(),
            max_words: default_max_words(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Deterministic keyword-driven classifier, no network.
    Lexicon,
    /// HTTP inference server.
    Remote,
}

impl Default for ClassifierBackend {
    fn default() -> Self {
        Self::Remote
    }
}

impl std::str::FromStr for ClassifierBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicon" => Ok(Self::Lexicon),
            "remote" => Ok(Self::Remote),
            other => Err(anyhow!("unsupported classifier backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: ClassifierBackend,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Attempts made during the single model initialization.
    #[serde(default = "default_load_retries")]
    pub load_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Max texts classified at once inside `predict_batch`.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            endpoint: default_endpoint(),
            load_retries: default_load_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

impl AnalyzerConfig {
    /// Load using env var + embedded fallback, then apply env overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_ANALYZER_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    bail!(
                        "{ENV_ANALYZER_CONFIG_PATH} points to non-existent path {}",
                        path.display()
                    );
                }
                Self::load_from_file(&path)?
            }
            Err(_) => Self::from_toml_str(DEFAULT_ANALYZER_CONFIG)?,
        };

        if let Ok(b) = std::env::var(ENV_CLASSIFIER_BACKEND) {
            cfg.classifier.backend = b.parse()?;
        }
        if let Ok(e) = std::env::var(ENV_CLASSIFIER_ENDPOINT) {
            if !e.trim().is_empty() {
                cfg.classifier.endpoint = e.trim().to_string();
            }
        }
        Ok(cfg)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading analyzer config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing analyzer config {}", path.display()))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AnalyzerConfig = toml::from_str(s)?;
        cfg.clean();
        cfg.validate()?;
        Ok(cfg)
    }

    /// The embedded default configuration.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_ANALYZER_CONFIG)
    }

    fn clean(&mut self) {
        clean_list(&mut self.lexicon.positive);
        clean_list(&mut self.lexicon.negative);
        clean_list(&mut self.ngrams.stopwords);
        self.classifier.endpoint = self
            .classifier
            .endpoint
            .trim()
            .trim_end_matches('/')
            .to_string();
    }

    fn validate(&self) -> Result<()> {
        if self.lexicon.positive.is_empty() && self.lexicon.negative.is_empty() {
            bail!("lexicon must contain at least one keyword");
        }
        if self.ngrams.stopwords.is_empty() {
            bail!("stopword set must not be empty");
        }
        let e = &self.explanation;
        if !(0.0..=1.0).contains(&e.neutral_weight) {
            bail!(
                "explanation.neutral_weight must be within [0, 1], got {}",
                e.neutral_weight
            );
        }
        if e.positive_class_threshold > 5 {
            bail!(
                "explanation.positive_class_threshold must be a class index (0..=5), got {}",
                e.positive_class_threshold
            );
        }
        if e.max_words == 0 {
            bail!("explanation.max_words must be > 0");
        }
        if self.classifier.concurrency == 0 {
            bail!("classifier.concurrency must be > 0");
        }
        Ok(())
    }
}

/// Lowercase, trim, drop empties and duplicates (first occurrence wins).
fn clean_list(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain_mut(|s| {
        *s = s.trim().to_lowercase();
        !s.is_empty() && seen.insert(s.clone())
    });
}
