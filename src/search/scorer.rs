//! Weighted multi-field scoring of one participant record.
//!
//! Each field keeps only its best interpretation (weight x match score), so a
//! record that mentions "python" in five repositories is not counted five
//! times. The record total is the sum over fields, then boosted for profile
//! completeness and for a direct role/skill hit on the raw query.

use std::collections::HashSet;

use tracing::trace;

use crate::config::SearchConfig;
use crate::roster::PersonRecord;
use crate::search::expand::{QueryTerm, TermKind};
use crate::search::fuzzy::{FuzzyMatch, FuzzyMatcher, contains_term};
use crate::search::normalize::{char_len, normalize_text};
use crate::search::types::{MatchKind, MatchedField, SearchField, SearchResult, Strategy};

/// A role label that must not match queries carrying any of the triggers.
struct RoleRule {
    triggers: HashSet<String>,
    excluded: HashSet<String>,
}

pub struct FieldScorer {
    config: SearchConfig,
    matcher: FuzzyMatcher,
    role_rules: Vec<RoleRule>,
}

struct FieldHit<'a> {
    value: &'a str,
    kind: MatchKind,
    score: f64,
}

impl FieldScorer {
    pub fn new(config: SearchConfig) -> Self {
        let role_rules = config
            .role_exclusions
            .iter()
            .map(|rule| RoleRule {
                triggers: rule.query_terms.iter().map(|t| normalize_text(t)).collect(),
                excluded: rule.excluded_roles.iter().map(|r| normalize_text(r)).collect(),
            })
            .collect();
        let matcher = FuzzyMatcher::new(config.min_fuzzy_len);
        Self {
            config,
            matcher,
            role_rules,
        }
    }

    pub fn with_matcher(mut self, matcher: FuzzyMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn weight(&self, field: SearchField) -> f64 {
        self.config.field_weights.get(&field).copied().unwrap_or(0.0)
    }

    /// Score every record and return the survivors, best first.
    pub fn rank(
        &self,
        records: &[PersonRecord],
        terms: &[QueryTerm],
        normalized_query: &str,
    ) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = records
            .iter()
            .filter_map(|record| self.score(record, terms, normalized_query))
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }

    /// Aggregate score for one record, or `None` when it falls below the
    /// minimum.
    pub fn score(
        &self,
        record: &PersonRecord,
        terms: &[QueryTerm],
        normalized_query: &str,
    ) -> Option<SearchResult> {
        if terms.is_empty() {
            return None;
        }
        let excluded_roles = self.excluded_roles(terms);

        let mut matched_fields = Vec::new();
        let mut base = 0.0;
        let mut matched_weight = 0.0;

        for field in SearchField::ALL {
            let weight = self.weight(field);
            if weight <= 0.0 {
                continue;
            }

            let mut best: Option<FieldHit<'_>> = None;
            let mut matched_terms: Vec<String> = Vec::new();
            for value in record.values_for(field) {
                let normalized = normalize_text(value);
                if normalized.is_empty() {
                    continue;
                }
                if field == SearchField::Role && excluded_roles.contains(normalized.as_str()) {
                    trace!(target: "search", id = record.id, role = value, "role excluded for query");
                    continue;
                }
                for term in terms {
                    let Some(found) = self.match_term(term, &normalized) else {
                        continue;
                    };
                    if !matched_terms.contains(&term.origin) {
                        matched_terms.push(term.origin.clone());
                    }
                    if best.as_ref().is_none_or(|hit| found.score > hit.score) {
                        best = Some(FieldHit {
                            value,
                            kind: found.kind,
                            score: found.score,
                        });
                    }
                }
            }

            if let Some(hit) = best {
                let contribution = weight * hit.score;
                base += contribution;
                matched_weight += weight;
                matched_fields.push(MatchedField {
                    field,
                    value: hit.value.to_string(),
                    kind: hit.kind,
                    score: contribution,
                    matched_terms,
                });
            }
        }

        if matched_fields.is_empty() || base <= 0.0 {
            return None;
        }

        let mut total = base * self.config.completeness_boost.mul_add(record.completeness(), 1.0);
        if self.direct_hit(record, normalized_query) {
            total *= 1.0 + self.config.direct_match_boost;
        }
        if total < self.config.min_score {
            return None;
        }

        Some(SearchResult {
            id: record.id,
            score: total,
            strategy: Strategy::Structured,
            matched_fields,
            confidence: (base / matched_weight).clamp(0.0, 1.0),
        })
    }

    fn match_term(&self, term: &QueryTerm, value: &str) -> Option<FuzzyMatch> {
        match term.kind {
            TermKind::Original => {
                self.matcher
                    .compare(&term.text, value, self.config.fuzzy_threshold)
            }
            TermKind::Synonym => {
                let factor = self.config.synonym_factor;
                let score = if value == term.text {
                    factor
                } else if contains_term(value, &term.text) {
                    let ratio = char_len(&term.text) as f64 / char_len(value) as f64;
                    factor * 0.3_f64.mul_add(ratio.min(1.0), 0.6)
                } else {
                    return None;
                };
                Some(FuzzyMatch {
                    kind: MatchKind::Synonym,
                    score,
                    confidence: score,
                })
            }
        }
    }

    /// Role labels this query must not match.
    fn excluded_roles(&self, terms: &[QueryTerm]) -> HashSet<&str> {
        let mut excluded = HashSet::new();
        for rule in &self.role_rules {
            let triggered = terms
                .iter()
                .filter(|term| term.kind == TermKind::Original)
                .any(|term| {
                    rule.triggers.contains(&term.text)
                        || term
                            .text
                            .split_whitespace()
                            .any(|token| rule.triggers.contains(token))
                });
            if triggered {
                excluded.extend(rule.excluded.iter().map(String::as_str));
            }
        }
        excluded
    }

    fn direct_hit(&self, record: &PersonRecord, normalized_query: &str) -> bool {
        if normalized_query.is_empty() {
            return false;
        }
        [SearchField::Role, SearchField::Skill]
            .into_iter()
            .flat_map(|field| record.values_for(field))
            .any(|value| contains_term(&normalize_text(value), normalized_query))
    }
}
