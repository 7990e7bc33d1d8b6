//! Participant search
//!
//! Pipeline: [`normalize`] the raw query, [`expand`] it through the bilingual
//! synonym dictionary, score every record with the [`scorer`] (falling back to
//! [`fuzzy`] matching per field), optionally consult the [`remote`] matcher,
//! blend the strategies with the [`merge`] step and memoize the response in
//! the [`cache`]. [`engine::SearchEngine`] wires the stages together.

pub mod cache;
pub mod engine;
pub mod expand;
pub mod fuzzy;
pub mod merge;
pub mod normalize;
pub mod remote;
pub mod scorer;
pub mod synonyms;
pub mod transliterate;
pub mod types;

pub use engine::{SearchEngine, SearchOptions};
pub use types::{
    MatchKind, MatchedField, RemoteStatus, SearchField, SearchResponse, SearchResult,
    SearchTiming, Strategy,
};
