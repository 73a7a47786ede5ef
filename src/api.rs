// src/api.rs
//! Thin JSON adapter over `ReviewService`.
//!
//! Routes:
//! - `GET  /health`
//! - `POST /api/predict/single`   `{comment, product_name?, include_explanation?}`
//! - `POST /api/predict/explain`  `{comment}`
//! - `POST /api/predict/batch`    `{texts: [...]}`
//! - `POST /api/analyze/ngrams`   `{texts: [...]}`
//! - `GET  /metrics`

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::analyze::NgramSummary;
use crate::batch::BatchSummary;
use crate::error::AnalysisError;
use crate::service::{ExplainedReview, ReviewService, SinglePrediction};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
}

impl AppState {
    pub fn new(service: ReviewService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/predict/single", post(predict_single))
        .route("/api/predict/explain", post(explain))
        .route("/api/predict/batch", post(predict_batch))
        .route("/api/analyze/ngrams", post(analyze_ngrams))
        .merge(crate::metrics::router::<AppState>())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct SingleReq {
    comment: String,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    include_explanation: bool,
}

#[derive(Deserialize)]
struct ExplainReq {
    comment: String,
}

#[derive(Serialize)]
struct SingleResp {
    product_name: String,
    #[serde(flatten)]
    prediction: SinglePrediction,
}

#[derive(Deserialize)]
struct TextsReq {
    texts: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

pub struct ApiError(AnalysisError);

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AnalysisError::EmptyInput => StatusCode::BAD_REQUEST,
            AnalysisError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AnalysisError::Inference(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            warn!(kind = self.0.kind(), error = %self.0, "request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}

async fn predict_single(
    State(state): State<AppState>,
    Json(body): Json<SingleReq>,
) -> Result<Json<SingleResp>, ApiError> {
    let prediction = state
        .service
        .predict_single(&body.comment, body.include_explanation)
        .await?;
    let product_name = body
        .product_name
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_default();
    Ok(Json(SingleResp {
        product_name,
        prediction,
    }))
}

async fn explain(
    State(state): State<AppState>,
    Json(body): Json<ExplainReq>,
) -> Result<Json<ExplainedReview>, ApiError> {
    Ok(Json(state.service.explain(&body.comment).await?))
}

/// Trim entries and drop blank ones before they reach the core.
fn clean_texts(texts: Vec<String>) -> Vec<String> {
    texts
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

async fn predict_batch(
    State(state): State<AppState>,
    Json(body): Json<TextsReq>,
) -> Result<Json<BatchSummary>, ApiError> {
    let texts = clean_texts(body.texts);
    let summary = state.service.predict_batch_with_analysis(&texts).await?;
    Ok(Json(summary))
}

async fn analyze_ngrams(
    State(state): State<AppState>,
    Json(body): Json<TextsReq>,
) -> Result<Json<NgramSummary>, ApiError> {
    let texts = clean_texts(body.texts);
    if texts.is_empty() {
        return Err(AnalysisError::EmptyInput.into());
    }
    Ok(Json(state.service.analyze_ngrams(&texts)))
}
