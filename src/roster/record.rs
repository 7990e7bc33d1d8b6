//! Participant records as they appear in the dataset file.

use serde::{Deserialize, Serialize};

use crate::search::types::SearchField;

/// An English/Japanese label pair. Either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub ja: String,
}

impl Bilingual {
    pub fn new(en: impl Into<String>, ja: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ja: ja.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.en.trim().is_empty() && self.ja.trim().is_empty()
    }

    /// Non-empty sides, English first.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        [self.en.as_str(), self.ja.as_str()]
            .into_iter()
            .filter(|value| !value.trim().is_empty())
    }

    /// Preferred display label.
    pub fn display(&self) -> &str {
        if self.en.trim().is_empty() {
            &self.ja
        } else {
            &self.en
        }
    }
}

/// A public repository from the enrichment block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stars: u32,
}

/// Code-hosting profile statistics merged into the dataset offline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub top_languages: Vec<String>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// One bootcamp participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub id: u32,
    pub name: Bilingual,
    #[serde(default)]
    pub team: Bilingual,
    #[serde(default)]
    pub roles: Vec<Bilingual>,
    #[serde(default, alias = "specialties")]
    pub skills: Vec<Bilingual>,
    #[serde(default)]
    pub interests: Vec<Bilingual>,
    #[serde(default, alias = "projects")]
    pub ideas: Vec<Bilingual>,
    #[serde(default, alias = "enrichment")]
    pub github: Option<Enrichment>,
}

impl PersonRecord {
    /// Searchable values for one field, in a stable order.
    pub fn values_for(&self, field: SearchField) -> Vec<&str> {
        match field {
            SearchField::Name => self.name.values().collect(),
            SearchField::Team => self.team.values().collect(),
            SearchField::Role => self.roles.iter().flat_map(Bilingual::values).collect(),
            SearchField::Skill => self.skills.iter().flat_map(Bilingual::values).collect(),
            SearchField::Interest => self.interests.iter().flat_map(Bilingual::values).collect(),
            SearchField::Idea => self.ideas.iter().flat_map(Bilingual::values).collect(),
            SearchField::Bio => self
                .github
                .as_ref()
                .and_then(|g| g.bio.as_deref())
                .filter(|bio| !bio.trim().is_empty())
                .into_iter()
                .collect(),
            SearchField::Company => self
                .github
                .as_ref()
                .and_then(|g| g.company.as_deref())
                .filter(|company| !company.trim().is_empty())
                .into_iter()
                .collect(),
            SearchField::Language => self
                .github
                .as_ref()
                .map(|g| g.top_languages.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            SearchField::Repository => self
                .github
                .as_ref()
                .map(|g| {
                    g.repositories
                        .iter()
                        .flat_map(|repo| {
                            std::iter::once(repo.name.as_str())
                                .chain(repo.description.as_deref())
                        })
                        .filter(|value| !value.trim().is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Share of searchable fields that carry at least one value (0.0 - 1.0).
    pub fn completeness(&self) -> f64 {
        let filled = SearchField::ALL
            .iter()
            .filter(|field| !self.values_for(**field).is_empty())
            .count();
        filled as f64 / SearchField::ALL.len() as f64
    }
}
