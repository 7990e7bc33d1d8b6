//! Synonym/term expansion
//!
//! Maps a query token to its concept group and back out to every spelling in
//! that group, so "エンジニア" finds records labelled "Engineer" and vice versa.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::trace;

use crate::search::normalize::{NormalizedText, char_len, is_japanese_char, normalize_text};
use crate::search::synonyms::SynonymIndex;

/// Shortest overlap accepted for partial (substring) expansion of
/// Japanese-script tokens. Latin tokens use the configured minimum.
const MIN_JAPANESE_OVERLAP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    /// Typed by the user (the full phrase or one of its tokens)
    Original,
    /// Added by synonym expansion
    Synonym,
}

/// One term handed to the field scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryTerm {
    pub text: String,
    /// The original term this one was derived from
    pub origin: String,
    pub kind: TermKind,
}

pub struct TermExpander {
    index: SynonymIndex,
    partial: bool,
    min_overlap: usize,
}

impl TermExpander {
    pub fn new(index: SynonymIndex, partial: bool, min_overlap: usize) -> Self {
        Self {
            index,
            partial,
            min_overlap: min_overlap.max(1),
        }
    }

    pub fn index(&self) -> &SynonymIndex {
        &self.index
    }

    /// Concept group for a normalized token: exact lookup first, then the
    /// best substring match when partial expansion is enabled.
    pub fn resolve(&self, token: &str) -> Option<usize> {
        if let Some(group) = self.index.group_of(token) {
            return Some(group);
        }
        if self.partial {
            return self.partial_group(token);
        }
        None
    }

    /// Longest overlap wins; ties go to the closest length, then dictionary
    /// order, then the term itself.
    fn partial_group(&self, token: &str) -> Option<usize> {
        let token_len = char_len(token);
        let min = if token.chars().any(is_japanese_char) {
            MIN_JAPANESE_OVERLAP
        } else {
            self.min_overlap
        };
        if token_len < min {
            return None;
        }

        let best = self
            .index
            .terms()
            .filter_map(|(term, group)| {
                let term_len = char_len(term);
                let overlap = if term.contains(token) {
                    token_len
                } else if token.contains(term) {
                    term_len
                } else {
                    return None;
                };
                (overlap >= min).then_some((overlap, token_len.abs_diff(term_len), group, term))
            })
            .min_by(|a, b| {
                b.0.cmp(&a.0)
                    .then(a.1.cmp(&b.1))
                    .then(a.2.cmp(&b.2))
                    .then(a.3.cmp(b.3))
            });

        if let Some((_, _, group, term)) = best {
            trace!(target: "search", token, term, group, "partial expansion");
        }
        best.map(|(_, _, group, _)| group)
    }

    /// Every spelling sharing the token's concept group, including the token.
    pub fn expand(&self, token: &str) -> BTreeSet<String> {
        let token = normalize_text(token);
        let mut out = BTreeSet::new();
        if token.is_empty() {
            return out;
        }
        if let Some(members) = self.resolve(&token).and_then(|g| self.index.members(g)) {
            out.extend(members.iter().cloned());
        }
        out.insert(token);
        out
    }

    /// Union of the expansions of several terms.
    pub fn expand_all<'a>(&self, terms: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        terms
            .into_iter()
            .flat_map(|term| self.expand(term))
            .collect()
    }

    /// Terms for the scorer: the full phrase, its tokens (unless the phrase is
    /// itself a dictionary term), then their synonyms.
    pub fn expand_query(&self, query: &NormalizedText) -> Vec<QueryTerm> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut units = vec![query.text.as_str()];
        let tokens: Vec<&str> = query.tokens().collect();
        if tokens.len() > 1 && self.index.group_of(&query.text).is_none() {
            units.extend(tokens);
        }

        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        for unit in &units {
            if seen.insert((*unit).to_string()) {
                terms.push(QueryTerm {
                    text: (*unit).to_string(),
                    origin: (*unit).to_string(),
                    kind: TermKind::Original,
                });
            }
        }
        for unit in &units {
            for synonym in self.expand(unit) {
                if seen.insert(synonym.clone()) {
                    terms.push(QueryTerm {
                        text: synonym,
                        origin: (*unit).to_string(),
                        kind: TermKind::Synonym,
                    });
                }
            }
        }
        terms
    }
}
