// src/classifier/remote.rs
//! HTTP inference backend.
//!
//! Expected server contract (JSON):
//! - `GET  /info`      → `{"model": "...", "num_labels": 5}`
//! - `POST /normalize` → `{"text": "..."}` in, `{"text": "..."}` out
//! - `POST /classify`  → `{"text": "..."}` in, `{"probabilities": [f32; 5]}` out
//! - `POST /attribute` → `{"text": "..."}` in,
//!   `{"probabilities": [...], "tokens": [{"token", "magnitude", "special"}]}` out
//!
//! `RemoteLoader::load` performs the `/info` handshake; it is what the lazy
//! guard retries. Failures after that are inference errors.

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::lazy::ModelLoader;
use super::{AttributedToken, Attribution, ClassProbabilities, Classifier, NUM_CLASSES};
use crate::error::{AnalysisError, AnalysisResult};

#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub model: String,
    pub num_labels: usize,
}

pub struct RemoteLoader {
    endpoint: String,
    timeout: Duration,
}

impl RemoteLoader {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl ModelLoader for RemoteLoader {
    type Model = RemoteModel;

    async fn load(&self) -> anyhow::Result<RemoteModel> {
        let http = reqwest::Client::builder()
            .user_agent("review-sentiment-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(self.timeout)
            .build()
            .context("building HTTP client")?;

        let url = format!("{}/info", self.endpoint);
        let resp = http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        if !resp.status().is_success() {
            bail!("GET {url} returned {}", resp.status());
        }
        let info: ModelInfo = resp.json().await.context("decoding /info")?;
        if info.num_labels != NUM_CLASSES {
            bail!(
                "model `{}` has {} labels, expected {NUM_CLASSES}",
                info.model,
                info.num_labels
            );
        }

        Ok(RemoteModel {
            http,
            endpoint: self.endpoint.clone(),
            info,
        })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

pub struct RemoteModel {
    http: reqwest::Client,
    endpoint: String,
    info: ModelInfo,
}

#[derive(Serialize)]
struct TextReq<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct TextResp {
    text: String,
}

#[derive(Deserialize)]
struct ClassifyResp {
    probabilities: Vec<f32>,
}

#[derive(Deserialize)]
struct AttributeResp {
    probabilities: Vec<f32>,
    tokens: Vec<AttributedToken>,
}

impl RemoteModel {
    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    async fn post<R: serde::de::DeserializeOwned>(&self, path: &str, text: &str) -> AnalysisResult<R> {
        let url = format!("{}/{path}", self.endpoint);
        let resp = self
            .http
            .post(&url)
            .json(&TextReq { text })
            .send()
            .await
            .map_err(|e| AnalysisError::Inference(format!("POST {url}: {e}")))?;
        if !resp.status().is_success() {
            return Err(AnalysisError::Inference(format!(
                "POST {url} returned {}",
                resp.status()
            )));
        }
        resp.json::<R>()
            .await
            .map_err(|e| AnalysisError::Inference(format!("decoding {path} response: {e}")))
    }
}

fn to_probabilities(v: Vec<f32>) -> AnalysisResult<ClassProbabilities> {
    let len = v.len();
    v.try_into().map_err(|_| {
        AnalysisError::Inference(format!(
            "expected {NUM_CLASSES} class probabilities, got {len}"
        ))
    })
}

#[async_trait]
impl Classifier for RemoteModel {
    async fn normalize(&self, text: &str) -> AnalysisResult<String> {
        let r: TextResp = self.post("normalize", text).await?;
        Ok(r.text)
    }

    async fn classify(&self, text: &str) -> AnalysisResult<ClassProbabilities> {
        let r: ClassifyResp = self.post("classify", text).await?;
        to_probabilities(r.probabilities)
    }

    async fn attribute(&self, text: &str) -> AnalysisResult<Attribution> {
        let r: AttributeResp = self.post("attribute", text).await?;
        Ok(Attribution {
            probabilities: to_probabilities(r.probabilities)?,
            tokens: r.tokens,
        })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LazyClassifier;

    #[test]
    fn probability_vectors_must_have_five_entries() {
        assert!(to_probabilities(vec![0.2; 5]).is_ok());
        let err = to_probabilities(vec![0.5, 0.5]).unwrap_err();
        assert!(err.to_string().contains("got 2"));
    }

    #[tokio::test]
    async fn unreachable_server_is_model_unavailable() {
        // Port 9 (discard) on localhost is not an inference server.
        let loader = RemoteLoader::new("http://127.0.0.1:9/", Duration::from_millis(300));
        let clf = LazyClassifier::new(loader, 1, Duration::from_millis(1));
        let err = clf.classify("tốt").await.unwrap_err();
        assert!(matches!(err, AnalysisError::ModelUnavailable(_)), "{err:?}");
    }
}
