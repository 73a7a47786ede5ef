// tests/batch_e2e.rs
//
// End-to-end analysis over a small lexicon: single keyword counts, batch
// distribution, keyword frequency and n-gram totals.

use review_sentiment_analyzer::analyze::NgramOrder;
use review_sentiment_analyzer::batch::rating_distribution;
use review_sentiment_analyzer::{AnalysisError, AnalyzerConfig, ReviewService};

const MINIMAL: &str = r#"
[lexicon]
positive = ["tốt"]
negative = ["tệ"]

[ngrams]
stopwords = ["và", "rất", "sản phẩm"]

[classifier]
backend = "lexicon"
concurrency = 3
"#;

fn service() -> ReviewService {
    let cfg = AnalyzerConfig::from_toml_str(MINIMAL).expect("minimal config");
    ReviewService::from_config(&cfg)
}

#[test]
fn single_review_keyword_counts() {
    let svc = service();
    let kw = svc
        .keyword_analyzer()
        .analyze("Sản phẩm rất tốt, đóng gói cẩn thận");
    assert_eq!(kw.positive_count, 1);
    assert_eq!(kw.negative_count, 0);
    assert_eq!(kw.positive_keywords, vec!["tốt"]);
}

#[tokio::test]
async fn mixed_batch_summary() {
    let svc = service();
    let mut texts: Vec<String> = Vec::new();
    for i in 0..5 {
        texts.push(format!("Sản phẩm rất tốt, đóng gói cẩn thận {i}"));
        texts.push(format!("Hàng tệ quá, lần {i}"));
    }

    let summary = svc
        .predict_batch_with_analysis(&texts)
        .await
        .expect("batch summary");

    assert_eq!(summary.total_predictions, 10);
    assert_eq!(summary.rating_distribution.len(), 5);
    assert_eq!(summary.rating_distribution.values().sum::<usize>(), 10);

    let got: Vec<&str> = summary.predictions.iter().map(|p| p.text.as_str()).collect();
    let want: Vec<&str> = texts.iter().map(String::as_str).collect();
    assert_eq!(got, want, "input order preserved");

    let pos = &summary.keyword_frequency.positive;
    let neg = &summary.keyword_frequency.negative;
    assert_eq!(pos[0].word, "tốt");
    assert_eq!(pos[0].count, 5);
    assert_eq!(neg[0].word, "tệ");
    assert_eq!(neg[0].count, 5);

    // tốt texts lean positive, tệ texts negative
    assert_eq!(summary.rating_distribution[&4], 5);
    assert_eq!(summary.rating_distribution[&2], 5);

    assert!(summary.ngrams.unigrams.len() <= 15);
    assert!(summary.ngrams.trigrams.len() <= 10);
    assert!(summary
        .ngrams
        .bigrams
        .iter()
        .any(|r| r.ngram == "tốt đóng" && r.count == 5));
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let svc = service();
    let err = svc
        .predict_batch_with_analysis::<String>(&[])
        .await
        .unwrap_err();
    assert_eq!(err, AnalysisError::EmptyInput);
}

#[test]
fn unigram_totals_match_content_tokens() {
    let svc = service();
    let ng = svc.ngram_analyzer();
    let texts = [
        "Sản phẩm rất tốt, đóng gói cẩn thận",
        "tốt và rẻ, a b c",
        "",
    ];
    for t in texts {
        let total: usize = ng
            .extract_ngrams(&[t], NgramOrder::Unigram, usize::MAX)
            .iter()
            .map(|r| r.count)
            .sum();
        assert_eq!(total, ng.content_words(t).len(), "for {t:?}");
    }
    let summary = svc.analyze_ngrams(&texts);
    assert_eq!(summary.unigrams[0].ngram, "tốt");
    assert_eq!(summary.unigrams[0].count, 2);
}

#[test]
fn distribution_of_nothing_still_has_five_buckets() {
    let d = rating_distribution(&[]);
    assert_eq!(d.len(), 5);
    assert!(d.values().all(|&c| c == 0));
}
