//! Result types shared by the scorer, merger, cache and engine.

use serde::{Deserialize, Serialize};

/// A searchable part of a participant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    Team,
    Role,
    Skill,
    Interest,
    Idea,
    Bio,
    Company,
    Language,
    Repository,
}

impl SearchField {
    pub const ALL: [Self; 10] = [
        Self::Name,
        Self::Team,
        Self::Role,
        Self::Skill,
        Self::Interest,
        Self::Idea,
        Self::Bio,
        Self::Company,
        Self::Language,
        Self::Repository,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Team => "team",
            Self::Role => "role",
            Self::Skill => "skill",
            Self::Interest => "interest",
            Self::Idea => "idea",
            Self::Bio => "bio",
            Self::Company => "company",
            Self::Language => "language",
            Self::Repository => "repository",
        }
    }
}

/// How a query term matched a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Partial,
    Fuzzy,
    Phonetic,
    Synonym,
}

impl MatchKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Partial => "partial",
            Self::Fuzzy => "fuzzy",
            Self::Phonetic => "phonetic",
            Self::Synonym => "synonym",
        }
    }
}

/// Which search strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Local field scoring (exact, partial, synonym and fuzzy signals).
    Structured,
    /// External natural-language matcher.
    Ai,
    /// Blend of two or more strategies.
    Hybrid,
}

impl Strategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Ai => "ai",
            Self::Hybrid => "hybrid",
        }
    }
}

/// The best interpretation of one field of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedField {
    pub field: SearchField,
    /// The record's value as stored (not normalized)
    pub value: String,
    pub kind: MatchKind,
    /// Weighted contribution to the record total
    pub score: f64,
    /// Original query terms that matched this field
    pub matched_terms: Vec<String>,
}

/// One ranked record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u32,
    pub score: f64,
    pub strategy: Strategy,
    pub matched_fields: Vec<MatchedField>,
    /// Normalized 0.0 - 1.0
    pub confidence: f64,
}

/// Outcome of the remote strategy for one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemoteStatus {
    /// No remote matcher configured or it was skipped for this search
    Disabled,
    Ok { matches: usize },
    Failed { reason: String },
}

/// Wall-clock timings for one search, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTiming {
    pub total_ms: u64,
    pub local_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_ms: Option<u64>,
}

/// What the search entry point hands back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub normalized: String,
    pub results: Vec<SearchResult>,
    pub total: usize,
    pub timing: SearchTiming,
    pub cached: bool,
    pub remote: RemoteStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl SearchResponse {
    /// A response whose remote strategy failed and fell back to local results.
    pub const fn is_degraded(&self) -> bool {
        matches!(self.remote, RemoteStatus::Failed { .. })
    }
}
