//! Review Sentiment Service: binary entrypoint.
//! Boots the Axum HTTP server, wiring the review service and middleware.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // This enables ANALYZER_CONFIG_PATH / CLASSIFIER_BACKEND from .env.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    review_sentiment_analyzer::telemetry::init_tracing();

    let router = review_sentiment_analyzer::app()
        .await
        .map_err(shuttle_runtime::Error::Custom)?;

    Ok(router.into())
}
