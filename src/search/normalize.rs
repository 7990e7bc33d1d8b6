//! Query and field-value normalization
//!
//! Every string that takes part in matching (queries, dictionary terms and
//! record values) passes through [`normalize_text`] so comparisons happen in
//! one canonical form.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Script family of a normalized string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Japanese,
    /// Japanese script and Latin letters together
    Mixed,
    /// Neither pattern applies (digits, symbols, other scripts)
    Unknown,
}

/// A canonicalized string plus its detected language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedText {
    pub text: String,
    pub language: Language,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}

/// Normalize a raw string and detect its language.
pub fn normalize(raw: &str) -> NormalizedText {
    let text = normalize_text(raw);
    let language = detect_language(&text);
    NormalizedText { text, language }
}

/// Canonical form: NFKC-folded, Latin diacritics stripped, lowercased, most
/// punctuation replaced by spaces, whitespace collapsed.
pub fn normalize_text(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for c in raw.nfkc() {
        if is_accented_latin(c) {
            folded.extend(std::iter::once(c).nfd().filter(|m| !is_combining_mark(*m)));
        } else {
            folded.push(c);
        }
    }

    let chars: Vec<char> = folded.to_lowercase().chars().collect();
    let mut out = String::with_capacity(chars.len());
    for (idx, &c) in chars.iter().enumerate() {
        let keep = if c.is_alphanumeric() || c == '+' || c == '#' {
            true
        } else if c == '.' || c == '-' {
            let before = idx > 0 && chars[idx - 1].is_alphanumeric();
            let after = chars.get(idx + 1).is_some_and(|next| next.is_alphanumeric());
            before && after
        } else {
            false
        };
        out.push(if keep { c } else { ' ' });
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Detect the script family of an already-normalized string.
pub fn detect_language(text: &str) -> Language {
    if text.trim().is_empty() {
        return Language::default();
    }
    let has_japanese = text.chars().any(is_japanese_char);
    let has_latin = text.chars().any(|c| c.is_ascii_alphabetic());
    match (has_japanese, has_latin) {
        (true, true) => Language::Mixed,
        (true, false) => Language::Japanese,
        (false, true) if is_plain_latin(text) => Language::English,
        _ => Language::Unknown,
    }
}

/// Hiragana, Katakana (full and half width) or CJK ideographs.
pub const fn is_japanese_char(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'
        | '\u{30A0}'..='\u{30FF}'
        | '\u{31F0}'..='\u{31FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FF66}'..='\u{FF9F}')
}

/// True when the string contains any kana (the part that can be romanized).
pub fn has_kana(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}'))
}

/// Length in characters, which is what all ratios are computed over.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn is_plain_latin(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || c == '-')
}

const fn is_accented_latin(c: char) -> bool {
    matches!(c, '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}')
}
