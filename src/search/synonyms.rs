//! Bilingual synonym dictionary
//!
//! Term groups tie English, Japanese and mixed-script spellings of one concept
//! to a canonical label. The built-in groups ship with the binary; extra groups
//! can be appended from a TOML file with the same layout.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RosterError, Result};
use crate::roster::Bilingual;
use crate::search::normalize::normalize_text;

const BUILTIN_DICTIONARY: &str = include_str!("synonyms.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermCategory {
    Role,
    Skill,
    Technology,
    Domain,
}

/// A canonical concept and its spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymGroup {
    pub canonical: Bilingual,
    pub category: TermCategory,
    #[serde(default)]
    pub english: Vec<String>,
    #[serde(default)]
    pub japanese: Vec<String>,
    #[serde(default)]
    pub mixed: Vec<String>,
}

impl SynonymGroup {
    /// Every spelling in the group, canonical labels first.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        self.canonical
            .values()
            .chain(self.english.iter().map(String::as_str))
            .chain(self.japanese.iter().map(String::as_str))
            .chain(self.mixed.iter().map(String::as_str))
    }
}

#[derive(Debug, Default, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    group: Vec<SynonymGroup>,
}

/// Normalized term -> group lookup built once from the dictionary.
#[derive(Debug, Clone, Default)]
pub struct SynonymIndex {
    groups: Vec<SynonymGroup>,
    terms: HashMap<String, usize>,
    /// Indexed terms in dictionary order, for deterministic scans
    ordered: Vec<(String, usize)>,
    members: Vec<BTreeSet<String>>,
}

impl SynonymIndex {
    /// The dictionary compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_DICTIONARY)
    }

    /// Built-in groups followed by the groups in `path`.
    pub fn builtin_with_file(path: &Path) -> Result<Self> {
        let mut groups = parse_groups(BUILTIN_DICTIONARY)?;
        let raw = std::fs::read_to_string(path).map_err(|err| {
            RosterError::Dictionary(format!("read {}: {err}", path.display()))
        })?;
        groups.extend(parse_groups(&raw)?);
        Ok(Self::from_groups(groups))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(Self::from_groups(parse_groups(raw)?))
    }

    /// Build the index. A term listed by several groups stays with the first.
    pub fn from_groups(groups: Vec<SynonymGroup>) -> Self {
        let mut terms: HashMap<String, usize> = HashMap::new();
        let mut ordered = Vec::new();
        let mut members = Vec::with_capacity(groups.len());

        for (idx, group) in groups.iter().enumerate() {
            let mut owned = BTreeSet::new();
            for spelling in group.spellings() {
                let term = normalize_text(spelling);
                if term.is_empty() {
                    continue;
                }
                match terms.get(&term) {
                    Some(&owner) if owner != idx => {
                        debug!(
                            target: "search",
                            term = %term,
                            kept = %groups[owner].canonical.display(),
                            dropped = %group.canonical.display(),
                            "duplicate synonym"
                        );
                    }
                    Some(_) => {}
                    None => {
                        terms.insert(term.clone(), idx);
                        ordered.push((term.clone(), idx));
                        owned.insert(term);
                    }
                }
            }
            members.push(owned);
        }

        Self {
            groups,
            terms,
            ordered,
            members,
        }
    }

    /// Group owning an already-normalized term.
    pub fn group_of(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    pub fn group(&self, idx: usize) -> Option<&SynonymGroup> {
        self.groups.get(idx)
    }

    /// Normalized terms owned by a group.
    pub fn members(&self, idx: usize) -> Option<&BTreeSet<String>> {
        self.members.get(idx)
    }

    /// All indexed terms in dictionary order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, usize)> {
        self.ordered.iter().map(|(term, idx)| (term.as_str(), *idx))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn parse_groups(raw: &str) -> Result<Vec<SynonymGroup>> {
    let file: DictionaryFile = toml::from_str(raw)
        .map_err(|err| RosterError::Dictionary(format!("parse dictionary: {err}")))?;
    Ok(file.group)
}
