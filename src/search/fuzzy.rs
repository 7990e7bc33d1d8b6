//! Typo- and script-tolerant string matching
//!
//! Matching stages, in order:
//! 1. exact equality
//! 2. substring containment (both short-circuit)
//! 3. known-typo correction table
//! 4. weighted Damerau-Levenshtein similarity
//! 5. cross-script phonetic comparison through romaji
//!
//! Stages 3-5 are all evaluated and the best accepted one wins.

use std::collections::HashMap;

use crate::search::normalize::{char_len, has_kana, is_japanese_char};
use crate::search::transliterate::{collapse_long_vowels, romanize};
use crate::search::types::MatchKind;

/// Score band for substring matches: `PARTIAL_BASE + PARTIAL_SPAN * ratio`.
const PARTIAL_BASE: f64 = 0.6;
const PARTIAL_SPAN: f64 = 0.3;
const TYPO_SCORE: f64 = 0.85;
const TYPO_CONFIDENCE: f64 = 0.8;
const FUZZY_FACTOR: f64 = 0.9;
const PHONETIC_SCORE_FACTOR: f64 = 0.9;
const PHONETIC_CONFIDENCE_FACTOR: f64 = 0.8;
/// Longer strings are compared word by word only.
const MAX_EDIT_LEN: usize = 48;

/// Cost of substituting two characters that look or sound alike.
const SIMILAR_SUBSTITUTION_COST: f64 = 0.5;

const SIMILAR_PAIRS: &[(char, char)] = &[
    ('m', 'n'),
    ('l', 'r'),
    ('b', 'v'),
    ('c', 'k'),
    ('s', 'z'),
    ('i', 'y'),
    ('d', 't'),
    ('g', 'j'),
    ('o', 'u'),
    ('0', 'o'),
    ('1', 'l'),
];

const BUILTIN_TYPOS: &[(&str, &str)] = &[
    ("pyhton", "python"),
    ("pyton", "python"),
    ("phyton", "python"),
    ("javscript", "javascript"),
    ("javasript", "javascript"),
    ("javascirpt", "javascript"),
    ("typscript", "typescript"),
    ("tyepscript", "typescript"),
    ("raect", "react"),
    ("kubernates", "kubernetes"),
    ("kuberentes", "kubernetes"),
    ("dokcer", "docker"),
    ("golnag", "golang"),
    ("kotiln", "kotlin"),
    ("swfit", "swift"),
    ("figam", "figma"),
    ("desinger", "designer"),
    ("disigner", "designer"),
    ("desiner", "designer"),
    ("enginer", "engineer"),
    ("engeneer", "engineer"),
    ("enginner", "engineer"),
    ("devloper", "developer"),
    ("developper", "developer"),
    ("manger", "manager"),
    ("managr", "manager"),
    ("marketting", "marketing"),
    ("blockchian", "blockchain"),
    ("machin learning", "machine learning"),
    ("machne learning", "machine learning"),
    ("エンジニヤ", "エンジニア"),
    ("デサイナー", "デザイナー"),
];

/// Outcome of one accepted comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch {
    pub kind: MatchKind,
    /// Match strength in 0.0 - 1.0, before field weighting
    pub score: f64,
    pub confidence: f64,
}

impl FuzzyMatch {
    const fn new(kind: MatchKind, score: f64, confidence: f64) -> Self {
        Self {
            kind,
            score,
            confidence,
        }
    }
}

pub struct FuzzyMatcher {
    typos: HashMap<String, String>,
    min_fuzzy_len: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(4)
    }
}

impl FuzzyMatcher {
    /// `min_fuzzy_len`: queries shorter than this skip edit-distance matching.
    pub fn new(min_fuzzy_len: usize) -> Self {
        let typos = BUILTIN_TYPOS
            .iter()
            .map(|(typo, fixed)| ((*typo).to_string(), (*fixed).to_string()))
            .collect();
        Self {
            typos,
            min_fuzzy_len: min_fuzzy_len.max(1),
        }
    }

    /// Add or replace typo corrections (both sides already normalized).
    pub fn with_typos(mut self, typos: impl IntoIterator<Item = (String, String)>) -> Self {
        self.typos.extend(typos);
        self
    }

    /// Known correction for a misspelled query, if any.
    pub fn correction(&self, query: &str) -> Option<&str> {
        self.typos.get(query).map(String::as_str)
    }

    /// Compare a normalized query term with a normalized candidate value.
    /// `None` means no stage cleared the threshold.
    pub fn compare(&self, query: &str, candidate: &str, threshold: f64) -> Option<FuzzyMatch> {
        if query.is_empty() || candidate.is_empty() {
            return None;
        }
        if query == candidate {
            return Some(FuzzyMatch::new(MatchKind::Exact, 1.0, 1.0));
        }
        if let Some(partial) = partial_match(query, candidate) {
            return Some(partial);
        }

        let mut best: Option<FuzzyMatch> = None;
        let mut consider = |found: FuzzyMatch| {
            if best.is_none_or(|current| found.score > current.score) {
                best = Some(found);
            }
        };

        if let Some(fixed) = self.correction(query) {
            if candidate == fixed || contains_term(candidate, fixed) {
                consider(FuzzyMatch::new(MatchKind::Fuzzy, TYPO_SCORE, TYPO_CONFIDENCE));
            }
        }

        if char_len(query) >= self.min_fuzzy_len {
            let similarity = best_word_similarity(query, candidate);
            if similarity >= threshold {
                let score = FUZZY_FACTOR * similarity;
                consider(FuzzyMatch::new(MatchKind::Fuzzy, score, score));
            }
        }

        if has_kana(query) || has_kana(candidate) {
            let similarity = phonetic_similarity(query, candidate);
            if similarity >= threshold {
                consider(FuzzyMatch::new(
                    MatchKind::Phonetic,
                    PHONETIC_SCORE_FACTOR * similarity,
                    PHONETIC_CONFIDENCE_FACTOR * similarity,
                ));
            }
        }

        best
    }
}

/// Containment in either direction, scored by length ratio. A candidate
/// inside the query must line up with the query's words.
fn partial_match(query: &str, candidate: &str) -> Option<FuzzyMatch> {
    let query_len = char_len(query);
    let candidate_len = char_len(candidate);

    let ratio = if query_len >= 2 && contains_term(candidate, query) {
        query_len as f64 / candidate_len as f64
    } else if candidate_len >= min_contained_len(candidate) && contains_words(query, candidate) {
        candidate_len as f64 / query_len as f64
    } else {
        return None;
    };
    let score = PARTIAL_SPAN.mul_add(ratio.min(1.0), PARTIAL_BASE);
    Some(FuzzyMatch::new(MatchKind::Partial, score, score))
}

/// Short Latin terms ("ai", "go") must match a whole word; everything else is
/// a plain substring test.
pub fn contains_term(haystack: &str, needle: &str) -> bool {
    if char_len(needle) < 3 && !needle.chars().any(is_japanese_char) {
        return words(haystack).any(|word| word == needle);
    }
    haystack.contains(needle)
}

/// `needle` occurs in `haystack` as a run of whole words. Japanese text has
/// no word breaks, so it falls back to substring containment.
fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.chars().any(is_japanese_char) {
        return haystack.contains(needle);
    }
    let haystack: Vec<&str> = words(haystack).collect();
    let needle: Vec<&str> = words(needle).collect();
    !needle.is_empty()
        && haystack
            .windows(needle.len())
            .any(|window| window == needle.as_slice())
}

const fn min_contained_len_for(japanese: bool) -> usize {
    if japanese { 2 } else { 3 }
}

fn min_contained_len(candidate: &str) -> usize {
    min_contained_len_for(candidate.chars().any(is_japanese_char))
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || c == '-' || c == '.')
        .filter(|word| !word.is_empty())
}

fn best_word_similarity(query: &str, candidate: &str) -> f64 {
    let query_len = char_len(query);
    let mut best = 0.0_f64;
    if char_len(candidate) <= MAX_EDIT_LEN {
        best = similarity(query, candidate);
    }
    for word in words(candidate) {
        let word_len = char_len(word);
        if word_len.abs_diff(query_len) * 2 > query_len.max(word_len) {
            continue;
        }
        best = best.max(similarity(query, word));
    }
    best
}

fn phonetic_similarity(query: &str, candidate: &str) -> f64 {
    let query_forms = phonetic_forms(query);
    let mut candidate_forms = phonetic_forms(candidate);
    for word in words(candidate) {
        if word != candidate {
            candidate_forms.extend(phonetic_forms(word));
        }
    }

    let mut best = 0.0_f64;
    for q in &query_forms {
        for c in &candidate_forms {
            if char_len(q) > MAX_EDIT_LEN || char_len(c) > MAX_EDIT_LEN {
                continue;
            }
            best = best.max(similarity(q, c));
            if best >= 1.0 {
                return best;
            }
        }
    }
    best
}

fn phonetic_forms(text: &str) -> Vec<String> {
    let mut forms = if has_kana(text) {
        romanize(text)
    } else {
        vec![text.to_string()]
    };
    let collapsed: Vec<String> = forms
        .iter()
        .map(|form| collapse_long_vowels(form))
        .filter(|form| !forms.contains(form))
        .collect();
    forms.extend(collapsed);
    forms
}

/// Normalized similarity: 1 - weighted distance / longer length.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = char_len(a).max(char_len(b));
    if longest == 0 {
        return 1.0;
    }
    (1.0 - weighted_distance(a, b) / longest as f64).max(0.0)
}

/// Damerau-Levenshtein distance where look-alike substitutions cost less.
pub fn weighted_distance(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());
    if n == 0 {
        return m as f64;
    }
    if m == 0 {
        return n as f64;
    }

    let width = m + 1;
    let mut d = vec![0.0_f64; (n + 1) * width];
    for i in 0..=n {
        d[i * width] = i as f64;
    }
    for j in 0..=m {
        d[j] = j as f64;
    }

    for i in 1..=n {
        for j in 1..=m {
            let substitution = substitution_cost(a[i - 1], b[j - 1]);
            let mut best = (d[(i - 1) * width + j] + 1.0)
                .min(d[i * width + j - 1] + 1.0)
                .min(d[(i - 1) * width + j - 1] + substitution);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[(i - 2) * width + j - 2] + 1.0);
            }
            d[i * width + j] = best;
        }
    }
    d[n * width + m]
}

fn substitution_cost(a: char, b: char) -> f64 {
    if a == b {
        0.0
    } else if SIMILAR_PAIRS
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    {
        SIMILAR_SUBSTITUTION_COST
    } else {
        1.0
    }
}
