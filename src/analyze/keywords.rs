// src/analyze/keywords.rs
//! Lexicon keyword detection and highlighting.
//!
//! Two phases:
//! 1) `KeywordAnalyzer::analyze` reads the original text and returns an
//!    immutable list of matched lexicon entries per polarity.
//! 2) `highlight` wraps those entries in markup. It is display-only and works
//!    on the progressively substituted string: the negative pass runs fully
//!    before the positive pass, so a positive entry occurring inside an
//!    already inserted negative span (or inside its tag text) gets wrapped
//!    too. `spans` + `render_spans` resolve everything against the original
//!    text instead and never nest markup.
//!
//! Matching is case-insensitive substring search without word boundaries:
//! "tốt" matches inside "không tốt".

use serde::{Deserialize, Serialize};

use crate::config::LexiconConfig;

pub const NEGATIVE_CLASS: &str = "highlight-negative";
pub const POSITIVE_CLASS: &str = "highlight-positive";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn css_class(self) -> &'static str {
        match self {
            Polarity::Positive => POSITIVE_CLASS,
            Polarity::Negative => NEGATIVE_CLASS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub polarity: Polarity,
}

/// Keyword hits for one text. Each lexicon entry appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub positive_count: usize,
    pub negative_count: usize,
}

impl KeywordAnalysis {
    /// Negative matches first, then positive, each in scan order.
    pub fn matches(&self) -> impl Iterator<Item = KeywordMatch> + '_ {
        let neg = self.negative_keywords.iter().map(|k| KeywordMatch {
            keyword: k.clone(),
            polarity: Polarity::Negative,
        });
        let pos = self.positive_keywords.iter().map(|k| KeywordMatch {
            keyword: k.clone(),
            polarity: Polarity::Positive,
        });
        neg.chain(pos)
    }

    pub fn is_empty(&self) -> bool {
        self.positive_count == 0 && self.negative_count == 0
    }
}

/// A highlighted region of the original text (byte offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub polarity: Polarity,
}

#[derive(Debug, Clone)]
pub struct KeywordAnalyzer {
    /// Longest entry first; equal lengths keep configuration order.
    positive: Vec<String>,
    negative: Vec<String>,
}

impl KeywordAnalyzer {
    pub fn new(lexicon: &LexiconConfig) -> Self {
        Self::from_lists(&lexicon.positive, &lexicon.negative)
    }

    pub fn from_lists<S: AsRef<str>>(positive: &[S], negative: &[S]) -> Self {
        Self {
            positive: longest_first(positive),
            negative: longest_first(negative),
        }
    }

    /// Lexicon entries found in `text`, negative scan first, then positive.
    pub fn analyze(&self, text: &str) -> KeywordAnalysis {
        let lower = text.to_lowercase();

        let negative_keywords: Vec<String> = self
            .negative
            .iter()
            .filter(|w| lower.contains(w.as_str()))
            .cloned()
            .collect();
        let positive_keywords: Vec<String> = self
            .positive
            .iter()
            .filter(|w| lower.contains(w.as_str()))
            .cloned()
            .collect();

        KeywordAnalysis {
            positive_count: positive_keywords.len(),
            negative_count: negative_keywords.len(),
            positive_keywords,
            negative_keywords,
        }
    }

    /// Polarity evidence for a single token; positive evidence wins when the
    /// token contains entries of both polarities.
    pub fn token_polarity(&self, token: &str) -> Option<Polarity> {
        let lower = token.to_lowercase();
        if self.positive.iter().any(|w| lower.contains(w.as_str())) {
            Some(Polarity::Positive)
        } else if self.negative.iter().any(|w| lower.contains(w.as_str())) {
            Some(Polarity::Negative)
        } else {
            None
        }
    }

    /// Analyze and highlight in one go.
    pub fn highlight_text(&self, text: &str) -> (KeywordAnalysis, String) {
        let kw = self.analyze(text);
        let marked = highlight(text, &kw.positive_keywords, &kw.negative_keywords);
        (kw, marked)
    }
}

fn longest_first<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    for w in words {
        let w = w.as_ref().trim().to_lowercase();
        if !w.is_empty() && !out.contains(&w) {
            out.push(w);
        }
    }
    // stable: equal lengths keep their configured order
    out.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    out
}

/// Wrap matched entries in polarity-tagged spans.
///
/// Negative entries are substituted first, then positive ones, longest-first
/// within each pass. Within a pass a shorter entry is not wrapped again where
/// it only occurs inside a region already wrapped by that pass. Across passes
/// no such protection exists.
pub fn highlight<S: AsRef<str>>(text: &str, positive: &[S], negative: &[S]) -> String {
    let mut out = text.to_string();
    substitute_pass(&mut out, &longest_first(negative), Polarity::Negative);
    substitute_pass(&mut out, &longest_first(positive), Polarity::Positive);
    out
}

fn wrap(segment: &str, polarity: Polarity) -> String {
    format!(
        "<span class=\"{}\">{}</span>",
        polarity.css_class(),
        segment
    )
}

fn substitute_pass(s: &mut String, entries: &[String], polarity: Polarity) {
    // Regions (byte ranges in `s`) already wrapped during this pass.
    let mut claimed: Vec<(usize, usize)> = Vec::new();

    for entry in entries {
        let hits: Vec<(usize, usize)> = find_all_ci(s, entry)
            .into_iter()
            .filter(|&(a, b)| !overlaps_any(&claimed, a, b))
            .collect();

        // Right to left keeps earlier offsets valid.
        for &(a, b) in hits.iter().rev() {
            let wrapped = wrap(&s[a..b], polarity);
            let delta = wrapped.len() - (b - a);
            s.replace_range(a..b, &wrapped);
            for r in claimed.iter_mut() {
                if r.0 >= b {
                    r.0 += delta;
                    r.1 += delta;
                }
            }
            claimed.push((a, a + wrapped.len()));
        }
    }
}

/// Non-overlapping highlight regions resolved against the original text:
/// negative entries claim first, then positive, longest-first within each.
pub fn spans(text: &str, analysis: &KeywordAnalysis) -> Vec<HighlightSpan> {
    let mut out: Vec<HighlightSpan> = Vec::new();
    let passes = [
        (longest_first(&analysis.negative_keywords), Polarity::Negative),
        (longest_first(&analysis.positive_keywords), Polarity::Positive),
    ];
    for (entries, polarity) in passes.iter() {
        for entry in entries {
            for (start, end) in find_all_ci(text, entry) {
                let taken = out.iter().any(|sp| start < sp.end && sp.start < end);
                if !taken {
                    out.push(HighlightSpan {
                        start,
                        end,
                        polarity: *polarity,
                    });
                }
            }
        }
    }
    out.sort_by_key(|sp| sp.start);
    out
}

/// Render spans as HTML; text outside and inside spans is escaped.
pub fn render_spans(text: &str, spans: &[HighlightSpan]) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * 48);
    let mut cursor = 0;
    for sp in spans {
        if sp.start < cursor || sp.end > text.len() {
            continue;
        }
        out.push_str(&html_escape::encode_text(&text[cursor..sp.start]));
        out.push_str(&wrap(
            &html_escape::encode_text(&text[sp.start..sp.end]),
            sp.polarity,
        ));
        cursor = sp.end;
    }
    out.push_str(&html_escape::encode_text(&text[cursor..]));
    out
}

fn overlaps_any(regions: &[(usize, usize)], a: usize, b: usize) -> bool {
    regions.iter().any(|&(s, e)| a < e && s < b)
}

/// Left-to-right, non-overlapping, case-insensitive occurrences of a
/// lowercase `needle` in `hay`, as byte ranges of `hay`.
fn find_all_ci(hay: &str, needle: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    if needle.is_empty() {
        return out;
    }
    let mut pos = 0;
    while pos < hay.len() {
        match match_at(hay, pos, needle) {
            Some(end) => {
                out.push((pos, end));
                pos = end;
            }
            None => {
                pos += hay[pos..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    out
}

fn match_at(hay: &str, start: usize, needle: &str) -> Option<usize> {
    let mut want = needle.chars().peekable();
    for (off, c) in hay[start..].char_indices() {
        if want.peek().is_none() {
            return Some(start + off);
        }
        for lc in c.to_lowercase() {
            if want.next() != Some(lc) {
                return None;
            }
        }
    }
    if want.peek().is_none() {
        Some(hay.len())
    } else {
        None
    }
}
