// src/telemetry.rs
//! Tracing setup and log-safe text identifiers.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs.
/// Activation requires `ANALYZER_DEV_LOG=1` or a debug build; `RUST_LOG`
/// overrides the default filter.
pub fn init_tracing() {
    let dev_flag = std::env::var("ANALYZER_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    if !(dev_flag || cfg!(debug_assertions)) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("review_sentiment_analyzer=info,classifier=info,warn"));

    // try_init: tests and the Shuttle runtime may already own a subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

/// Short anonymized id for a review text. Raw review text is never logged.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_stable_and_short() {
        let a = anon_hash("Sản phẩm rất tốt");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("Sản phẩm rất tốt"));
        assert_ne!(a, anon_hash("Sản phẩm rất tệ"));
    }
}
