// tests/config_env.rs
//
// Environment-driven config resolution. Tests touch process-wide env vars,
// so they run serially.

use serial_test::serial;
use std::path::PathBuf;

use review_sentiment_analyzer::config::analyzer::{
    ENV_ANALYZER_CONFIG_PATH, ENV_CLASSIFIER_BACKEND, ENV_CLASSIFIER_ENDPOINT,
};
use review_sentiment_analyzer::config::ClassifierBackend;
use review_sentiment_analyzer::{AnalyzerConfig, ReviewService};

fn clear_env() {
    std::env::remove_var(ENV_ANALYZER_CONFIG_PATH);
    std::env::remove_var(ENV_CLASSIFIER_BACKEND);
    std::env::remove_var(ENV_CLASSIFIER_ENDPOINT);
}

fn write_tmp(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{name}", std::process::id()));
    std::fs::write(&path, body).expect("write temp config");
    path
}

#[test]
#[serial]
fn falls_back_to_embedded_default() {
    clear_env();
    let cfg = AnalyzerConfig::from_env().expect("embedded");
    assert_eq!(cfg.classifier.backend, ClassifierBackend::Remote);
    assert!(cfg.lexicon.positive.len() > 10);
}

#[test]
#[serial]
fn config_path_and_backend_overrides_apply() {
    clear_env();
    let path = write_tmp(
        "analyzer.toml",
        r#"
[lexicon]
positive = ["xịn"]
negative = ["dỏm"]

[ngrams]
stopwords = ["và"]

[classifier]
backend = "lexicon"
endpoint = "http://localhost:9000/"
"#,
    );
    std::env::set_var(ENV_ANALYZER_CONFIG_PATH, &path);
    std::env::set_var(ENV_CLASSIFIER_BACKEND, " Remote ");
    std::env::set_var(ENV_CLASSIFIER_ENDPOINT, " http://10.0.0.5:8500 ");

    let cfg = AnalyzerConfig::from_env().expect("file config");
    clear_env();
    let _ = std::fs::remove_file(&path);

    assert_eq!(cfg.lexicon.positive, vec!["xịn"]);
    assert_eq!(cfg.classifier.backend, ClassifierBackend::Remote);
    assert_eq!(cfg.classifier.endpoint, "http://10.0.0.5:8500");

    // remote backend is lazy: building the service does no I/O
    let svc = ReviewService::from_config(&cfg);
    assert_eq!(svc.classifier_name(), "remote");
}

#[test]
#[serial]
fn env_can_opt_in_to_lexicon_backend() {
    clear_env();
    std::env::set_var(ENV_CLASSIFIER_BACKEND, "lexicon");
    let cfg = AnalyzerConfig::from_env().expect("embedded");
    clear_env();
    assert_eq!(cfg.classifier.backend, ClassifierBackend::Lexicon);
    assert_eq!(ReviewService::from_config(&cfg).classifier_name(), "lexicon");
}

#[test]
#[serial]
fn missing_config_path_is_an_error() {
    clear_env();
    std::env::set_var(ENV_ANALYZER_CONFIG_PATH, "/definitely/not/here.toml");
    let err = AnalyzerConfig::from_env().unwrap_err();
    clear_env();
    assert!(err.to_string().contains("non-existent"));
}

#[test]
#[serial]
fn unknown_backend_is_rejected() {
    clear_env();
    std::env::set_var(ENV_CLASSIFIER_BACKEND, "onnx");
    let res = AnalyzerConfig::from_env();
    clear_env();
    assert!(res.is_err());
}
