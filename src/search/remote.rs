//! Client for the external natural-language matching service.
//!
//! The service receives the query plus a CSV projection of the roster and
//! answers with the ids it considers relevant. It is strictly best effort: the
//! engine bounds every call with a timeout and falls back to local results on
//! any error.

use std::future::Future;
use std::time::Duration;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::{Result, RosterError};
use crate::roster::{Bilingual, PersonRecord};

/// One id the remote matcher returned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemoteHit {
    pub id: u32,
    /// 0.0 - 1.0 when the service reports it
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// A natural-language matcher over the roster catalog.
pub trait RemoteMatcher: Send + Sync {
    fn match_records(
        &self,
        query: &str,
        catalog: &str,
    ) -> impl Future<Output = Result<Vec<RemoteHit>>> + Send;
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query: &'a str,
    records: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MatchReply {
    Matches { matches: Vec<RemoteHit> },
    Ids { ids: Vec<u32> },
}

impl MatchReply {
    fn into_hits(self) -> Vec<RemoteHit> {
        match self {
            Self::Matches { matches } => matches,
            Self::Ids { ids } => ids
                .into_iter()
                .map(|id| RemoteHit {
                    id,
                    confidence: None,
                })
                .collect(),
        }
    }
}

/// JSON-over-HTTP matcher.
pub struct HttpMatcher {
    endpoint: String,
    client: reqwest::Client,
    api_key: Option<String>,
}

impl HttpMatcher {
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(RosterError::Config(
                "remote matcher endpoint is empty; set [remote].endpoint".to_string(),
            ));
        }
        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty());
        Self::new(&config.endpoint, config.timeout, api_key)
    }

    pub fn new(endpoint: &str, timeout: Duration, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout.max(Duration::from_millis(1)))
            .build()
            .map_err(|err| RosterError::Remote(format!("http client: {err}")))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RemoteMatcher for HttpMatcher {
    async fn match_records(&self, query: &str, catalog: &str) -> Result<Vec<RemoteHit>> {
        let mut request = self.client.post(&self.endpoint).json(&MatchRequest {
            query,
            records: catalog,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| RosterError::Remote(format!("request failed: {err}")))?;
        if !response.status().is_success() {
            return Err(RosterError::Remote(format!("HTTP {}", response.status())));
        }

        let reply: MatchReply = response
            .json()
            .await
            .map_err(|err| RosterError::Remote(format!("response parse: {err}")))?;
        let hits = reply.into_hits();
        debug!(target: "remote", endpoint = %self.endpoint, hits = hits.len(), "remote matcher replied");
        Ok(hits)
    }
}

const CATALOG_HEADER: &str = "id,name,team,roles,skills,interests,ideas,languages,bio";

/// CSV projection of the roster sent to the remote matcher.
pub fn catalog_csv(records: &[PersonRecord]) -> String {
    let mut out = String::from(CATALOG_HEADER);
    for record in records {
        let languages = record
            .github
            .as_ref()
            .map(|g| g.top_languages.join("; "))
            .unwrap_or_default();
        let bio = record
            .github
            .as_ref()
            .and_then(|g| g.bio.clone())
            .unwrap_or_default();
        let row = [
            record.id.to_string(),
            bilingual_cell(std::slice::from_ref(&record.name)),
            bilingual_cell(std::slice::from_ref(&record.team)),
            bilingual_cell(&record.roles),
            bilingual_cell(&record.skills),
            bilingual_cell(&record.interests),
            bilingual_cell(&record.ideas),
            languages,
            bio,
        ];
        out.push('\n');
        out.push_str(&row.iter().map(|cell| escape_csv(cell)).join(","));
    }
    out
}

fn bilingual_cell(values: &[Bilingual]) -> String {
    values
        .iter()
        .filter(|value| !value.is_empty())
        .map(|value| value.values().join(" / "))
        .join("; ")
}

fn escape_csv(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
