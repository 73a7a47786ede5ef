// src/error.rs
//! Error kinds surfaced by prediction, explanation and batch calls.
//!
//! Keyword and n-gram analysis are infallible; configuration problems are
//! reported as `anyhow::Error` at load time and never reach this type.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The model was never loaded, or its (single) initialization failed.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The model is loaded but failed while serving a call.
    #[error("inference failed: {0}")]
    Inference(String),

    /// A batch operation was called without any text.
    #[error("no texts supplied")]
    EmptyInput,
}

impl AnalysisError {
    /// Short machine-readable tag, used by the HTTP adapter and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::ModelUnavailable(_) => "model_unavailable",
            AnalysisError::Inference(_) => "inference",
            AnalysisError::EmptyInput => "empty_input",
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
