// src/tokenizer.rs
//! Unicode-aware word tokenizer shared by keyword and n-gram analysis.
//!
//! A token is a maximal run of word characters (`\w`, which covers `_`,
//! digits and every Vietnamese letter) in the source text. Everything else,
//! punctuation, symbols and emoji included, separates tokens. Token text is
//! the lowercased run; `start..end` is its byte range in the source.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Vietnamese letters kept verbatim even if a regex engine treated them as
/// non-word characters.
pub const VIETNAMESE_DIACRITICS: &str =
    "àáảãạăắằẳẵặâấầẩẫậèéẻẽẹêếềểễệìíỉĩịòóỏõọôốồổỗộơớờởỡợùúủũụưứừửữựỳýỷỹỵđ";

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    // \w is Unicode-aware by default in the regex crate.
    Regex::new(&format!(r"[\w{VIETNAMESE_DIACRITICS}]+")).expect("tokenizer word regex")
});

/// A single token: lowercased surface form, byte span in the source text and
/// 0-based position in the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: Cow<'a, str>,
    pub start: usize,
    pub end: usize,
    pub index: usize,
}

/// Source text plus lazy access to its tokens.
///
/// `iter()` can be called any number of times; each call walks the same
/// source from the start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    source: String,
}

impl Tokens {
    pub fn iter(&self) -> impl Iterator<Item = Token<'_>> + '_ {
        WORD_RE
            .find_iter(&self.source)
            .enumerate()
            .map(|(index, m)| Token {
                text: lowercase(m.as_str()),
                start: m.start(),
                end: m.end(),
                index,
            })
    }

    /// Token surface forms only.
    pub fn words(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        self.iter().map(|t| t.text)
    }

    /// The text the token spans index into.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Borrow when the run is already lowercase.
fn lowercase(s: &str) -> Cow<'_, str> {
    if s.chars().all(|c| c.is_lowercase() || !c.is_alphabetic()) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.to_lowercase())
    }
}

/// Tokenize `text`. Empty or whitespace-only input yields no tokens.
pub fn tokenize(text: &str) -> Tokens {
    Tokens {
        source: text.to_string(),
    }
}

/// Tokens rejoined by single spaces.
pub fn normalize(text: &str) -> String {
    tokenize(text).words().collect::<Vec<_>>().join(" ")
}
