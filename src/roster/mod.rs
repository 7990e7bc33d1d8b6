//! Participant dataset loading
//!
//! The dataset is a single JSON document fetched once at startup, either from
//! disk or over HTTP. It is never mutated after loading.

pub mod record;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{RosterError, Result};

pub use record::{Bilingual, Enrichment, PersonRecord, Repository};

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// Interpret a configured location: `http(s)://` prefixes are URLs,
    /// everything else is a filesystem path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetDocument {
    Wrapped { participants: Vec<PersonRecord> },
    Bare(Vec<PersonRecord>),
}

/// The loaded, immutable participant roster.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    records: Vec<PersonRecord>,
    by_id: HashMap<u32, usize>,
}

impl Roster {
    /// Build a roster from records, rejecting duplicate ids.
    pub fn new(records: Vec<PersonRecord>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if by_id.insert(record.id, idx).is_some() {
                return Err(RosterError::Dataset(format!(
                    "duplicate participant id {}",
                    record.id
                )));
            }
        }
        Ok(Self { records, by_id })
    }

    /// Parse a dataset document (`{"participants": [...]}` or a bare array).
    pub fn from_json(raw: &str) -> Result<Self> {
        let document: DatasetDocument = serde_json::from_str(raw)
            .map_err(|err| RosterError::Dataset(format!("parse dataset: {err}")))?;
        let records = match document {
            DatasetDocument::Wrapped { participants } => participants,
            DatasetDocument::Bare(records) => records,
        };
        Self::new(records)
    }

    /// Load the dataset from its source.
    pub async fn load(source: &DatasetSource, timeout: Duration) -> Result<Self> {
        debug!(target: "dataset", source = %source, "loading dataset");
        let raw = match source {
            DatasetSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|err| {
                RosterError::Dataset(format!("read {}: {err}", path.display()))
            })?,
            DatasetSource::Url(url) => fetch(url, timeout).await?,
        };
        let roster = Self::from_json(&raw)?;
        info!(target: "dataset", participants = roster.len(), "dataset loaded");
        Ok(roster)
    }

    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    pub fn get(&self, id: u32) -> Option<&PersonRecord> {
        self.by_id.get(&id).map(|idx| &self.records[*idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

async fn fetch(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| RosterError::Dataset(format!("http client: {err}")))?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| RosterError::Dataset(format!("fetch {url}: {err}")))?;
    if !response.status().is_success() {
        return Err(RosterError::Dataset(format!(
            "fetch {url}: HTTP {}",
            response.status()
        )));
    }
    response
        .text()
        .await
        .map_err(|err| RosterError::Dataset(format!("read body {url}: {err}")))
}
