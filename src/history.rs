//! Recent search queries, persisted as a small JSON file.
//!
//! Most recent first, de-duplicated on the normalized query text and capped
//! at a configurable length. Independent of the ranking core.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, RosterError};
use crate::search::normalize::normalize_text;

pub const DEFAULT_MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentQuery {
    pub query: String,
    pub searched_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    queries: Vec<RecentQuery>,
}

#[derive(Debug)]
pub struct RecentQueries {
    path: PathBuf,
    max_entries: usize,
    entries: Vec<RecentQuery>,
}

impl RecentQueries {
    /// `recent_queries.json` under the user data directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("roster/recent_queries.json"))
    }

    /// Open the history file. A missing file is an empty history; a corrupt
    /// one is logged and replaced on the next save.
    pub fn load(path: impl Into<PathBuf>, max_entries: usize) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<HistoryFile>(&raw) {
                Ok(file) => file.queries,
                Err(err) => {
                    warn!(target: "history", path = %path.display(), error = %err, "ignoring unreadable history file");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let mut history = Self {
            path,
            max_entries: max_entries.max(1),
            entries,
        };
        history.entries.truncate(history.max_entries);
        Ok(history)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[RecentQuery] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move `query` to the front. Blank queries are ignored.
    pub fn record(&mut self, query: &str) -> bool {
        self.record_at(query, Utc::now())
    }

    pub fn record_at(&mut self, query: &str, at: DateTime<Utc>) -> bool {
        let trimmed = query.trim();
        let key = normalize_text(trimmed);
        if key.is_empty() {
            return false;
        }
        self.entries.retain(|entry| normalize_text(&entry.query) != key);
        self.entries.insert(
            0,
            RecentQuery {
                query: trimmed.to_string(),
                searched_at: at,
            },
        );
        self.entries.truncate(self.max_entries);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write the history atomically (temp file in the same directory, then
    /// rename).
    pub fn save(&self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let file = HistoryFile {
            queries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(json.as_bytes())?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|err| {
            RosterError::Io(std::io::Error::new(
                err.error.kind(),
                format!("write {}: {}", self.path.display(), err.error),
            ))
        })?;
        Ok(())
    }
}
