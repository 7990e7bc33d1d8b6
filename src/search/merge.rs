//! Blending of per-strategy result lists
//!
//! Every strategy produces its own ranked list. The merger collapses them to
//! one entry per record id: ids seen by a single strategy pass through as-is,
//! ids seen by several are blended with the configured per-strategy weights.

use std::collections::{BTreeMap, HashMap};

use crate::search::types::{MatchedField, SearchResult, Strategy};

/// Weight used for a strategy missing from the blend map.
const DEFAULT_BLEND: f64 = 1.0;

pub fn default_blend() -> BTreeMap<Strategy, f64> {
    BTreeMap::from([(Strategy::Structured, 0.6), (Strategy::Ai, 0.4)])
}

pub struct ResultMerger {
    blend: BTreeMap<Strategy, f64>,
}

impl Default for ResultMerger {
    fn default() -> Self {
        Self::new(default_blend())
    }
}

/// Contributions collected for one id, in first-seen strategy order.
struct Pending {
    parts: Vec<(Strategy, SearchResult)>,
}

impl ResultMerger {
    pub fn new(blend: BTreeMap<Strategy, f64>) -> Self {
        Self { blend }
    }

    pub fn blend_for(&self, strategy: Strategy) -> f64 {
        self.blend.get(&strategy).copied().unwrap_or(DEFAULT_BLEND)
    }

    /// Merge ranked lists into one list with at most one entry per id,
    /// sorted by descending score. Ties keep first-seen order.
    pub fn merge(&self, sources: Vec<(Strategy, Vec<SearchResult>)>) -> Vec<SearchResult> {
        let mut order: Vec<Pending> = Vec::new();
        let mut slot: HashMap<u32, usize> = HashMap::new();

        for (strategy, results) in sources {
            for result in results {
                let idx = *slot.entry(result.id).or_insert_with(|| {
                    order.push(Pending { parts: Vec::new() });
                    order.len() - 1
                });
                let parts = &mut order[idx].parts;
                match parts.iter_mut().find(|(s, _)| *s == strategy) {
                    // A strategy listing an id twice keeps its better entry.
                    Some((_, existing)) => {
                        if result.score > existing.score {
                            *existing = result;
                        }
                    }
                    None => parts.push((strategy, result)),
                }
            }
        }

        let mut merged: Vec<SearchResult> = order
            .into_iter()
            .filter_map(|pending| self.blend_parts(pending.parts))
            .collect();
        merged.sort_by(|a, b| b.score.total_cmp(&a.score));
        merged
    }

    fn blend_parts(&self, mut parts: Vec<(Strategy, SearchResult)>) -> Option<SearchResult> {
        if parts.len() <= 1 {
            return parts.pop().map(|(_, result)| result);
        }

        let id = parts[0].1.id;
        let mut score = 0.0;
        let mut weighted_confidence = 0.0;
        let mut weight_sum = 0.0;
        let mut matched_fields: Vec<MatchedField> = Vec::new();

        for (strategy, result) in parts.iter() {
            let weight = self.blend_for(*strategy);
            score += weight * result.score;
            weighted_confidence += weight * result.confidence;
            weight_sum += weight;
            for field in &result.matched_fields {
                union_field(&mut matched_fields, field);
            }
        }

        let confidence = if weight_sum > 0.0 {
            weighted_confidence / weight_sum
        } else {
            parts.iter().map(|(_, r)| r.confidence).sum::<f64>() / parts.len() as f64
        };

        Some(SearchResult {
            id,
            score,
            strategy: Strategy::Hybrid,
            matched_fields,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

/// Add a matched field unless the same field/value pair is already present,
/// keeping the higher-scoring copy.
fn union_field(fields: &mut Vec<MatchedField>, field: &MatchedField) {
    match fields
        .iter_mut()
        .find(|f| f.field == field.field && f.value == field.value)
    {
        Some(existing) => {
            if field.score > existing.score {
                *existing = field.clone();
            }
        }
        None => fields.push(field.clone()),
    }
}
