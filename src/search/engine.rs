//! The search entry point.
//!
//! `SearchEngine` owns the roster and every pipeline stage. One search runs:
//! normalize, expand, score each record locally, optionally ask the remote
//! matcher (bounded by a timeout), merge, then memoize the response.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, RosterError};
use crate::roster::{PersonRecord, Roster};
use crate::search::cache::{CacheStats, QueryCache};
use crate::search::expand::TermExpander;
use crate::search::fuzzy::FuzzyMatcher;
use crate::search::merge::ResultMerger;
use crate::search::normalize::normalize;
use crate::search::remote::{HttpMatcher, RemoteHit, RemoteMatcher, catalog_csv};
use crate::search::scorer::FieldScorer;
use crate::search::synonyms::SynonymIndex;
use crate::search::types::{
    RemoteStatus, SearchResponse, SearchResult, SearchTiming, Strategy,
};

/// Confidence assigned to the first remote hit that carries none; later hits
/// step down by `RANK_CONFIDENCE_STEP` to a floor of `RANK_CONFIDENCE_FLOOR`.
const RANK_CONFIDENCE_TOP: f64 = 1.0;
const RANK_CONFIDENCE_STEP: f64 = 0.05;
const RANK_CONFIDENCE_FLOOR: f64 = 0.5;

/// Per-call switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum results returned; `None` uses the configured default
    pub limit: Option<usize>,
    pub use_remote: bool,
    pub use_cache: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: None,
            use_remote: true,
            use_cache: true,
        }
    }
}

struct RemoteOutcome {
    status: RemoteStatus,
    results: Vec<SearchResult>,
    elapsed_ms: Option<u64>,
    warning: Option<String>,
}

pub struct SearchEngine<M = HttpMatcher> {
    roster: Roster,
    expander: TermExpander,
    scorer: FieldScorer,
    merger: ResultMerger,
    cache: Option<QueryCache>,
    remote: Option<M>,
    remote_timeout: Duration,
    remote_score_scale: f64,
    default_limit: usize,
    catalog: String,
    latest: watch::Sender<u64>,
}

impl SearchEngine<HttpMatcher> {
    /// Engine with the HTTP remote matcher when `[remote]` is enabled.
    pub fn from_config(roster: Roster, config: &Config) -> Result<Self> {
        let remote = if config.remote.enabled {
            Some(HttpMatcher::from_config(&config.remote)?)
        } else {
            None
        };
        Self::new(roster, config, remote)
    }

    /// Engine without a remote strategy.
    pub fn local(roster: Roster, config: &Config) -> Result<Self> {
        Self::new(roster, config, None)
    }
}

impl<M: RemoteMatcher> SearchEngine<M> {
    pub fn new(roster: Roster, config: &Config, remote: Option<M>) -> Result<Self> {
        let index = match &config.search.dictionary_path {
            Some(path) => SynonymIndex::builtin_with_file(path)?,
            None => SynonymIndex::builtin()?,
        };
        let expander = TermExpander::new(
            index,
            config.search.partial_expansion,
            config.search.min_partial_overlap,
        );
        let scorer = FieldScorer::new(config.search.clone())
            .with_matcher(FuzzyMatcher::new(config.search.min_fuzzy_len));
        let cache = config
            .cache
            .enabled
            .then(|| QueryCache::new(config.cache.capacity, config.cache.ttl));
        let catalog = if remote.is_some() {
            catalog_csv(roster.records())
        } else {
            String::new()
        };
        let (latest, _) = watch::channel(0);

        info!(
            target: "search",
            participants = roster.len(),
            synonym_groups = expander.index().len(),
            remote = remote.is_some(),
            cache = cache.is_some(),
            "search engine ready"
        );

        Ok(Self {
            roster,
            expander,
            scorer,
            merger: ResultMerger::new(config.merge.blend.clone()),
            cache,
            remote,
            remote_timeout: config.remote.timeout,
            remote_score_scale: config.merge.remote_score_scale,
            default_limit: config.search.default_limit,
            catalog,
            latest,
        })
    }

    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    pub const fn expander(&self) -> &TermExpander {
        &self.expander
    }

    pub const fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn record(&self, id: u32) -> Result<&PersonRecord> {
        self.roster.get(id).ok_or(RosterError::RecordNotFound(id))
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(QueryCache::stats)
    }

    /// Token of the most recent `search_latest` call.
    pub fn current_token(&self) -> u64 {
        *self.latest.borrow()
    }

    /// Run one search.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        let started = Instant::now();
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Err(RosterError::EmptyQuery);
        }
        let limit = options.limit.unwrap_or(self.default_limit);
        let use_remote = options.use_remote && self.remote.is_some();
        let key = cache_key(&normalized.text, use_remote);

        if options.use_cache {
            if let Some(mut response) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
                debug!(target: "search", query = %normalized.text, "served from cache");
                response.query = query.to_string();
                response.cached = true;
                response.timing = SearchTiming {
                    total_ms: elapsed_ms(started),
                    local_ms: 0,
                    remote_ms: None,
                };
                response.results.truncate(limit);
                return Ok(response);
            }
        }

        let local_started = Instant::now();
        let terms = self.expander.expand_query(&normalized);
        let local = self
            .scorer
            .rank(self.roster.records(), &terms, &normalized.text);
        let local_ms = elapsed_ms(local_started);
        debug!(
            target: "search",
            query = %normalized.text,
            language = ?normalized.language,
            terms = terms.len(),
            local_hits = local.len(),
            local_ms,
            "local scoring done"
        );

        let remote = if use_remote {
            self.run_remote(query.trim()).await
        } else {
            RemoteOutcome {
                status: RemoteStatus::Disabled,
                results: Vec::new(),
                elapsed_ms: None,
                warning: None,
            }
        };

        let mut sources = vec![(Strategy::Structured, local)];
        if !remote.results.is_empty() {
            sources.push((Strategy::Ai, remote.results));
        }
        let results = self.merger.merge(sources);

        let mut warnings: Vec<String> = remote.warning.into_iter().collect();
        if let (true, RemoteStatus::Failed { reason }) = (results.is_empty(), &remote.status) {
            warn!(target: "remote", query = %normalized.text, "remote matcher failed and nothing matched locally");
            warnings = vec![format!(
                "remote matcher unavailable ({reason}) and no local matches; results may be incomplete"
            )];
        }

        let mut response = SearchResponse {
            query: query.to_string(),
            normalized: normalized.text,
            total: results.len(),
            results,
            timing: SearchTiming {
                total_ms: elapsed_ms(started),
                local_ms,
                remote_ms: remote.elapsed_ms,
            },
            cached: false,
            remote: remote.status,
            warnings,
        };

        if options.use_cache {
            if let Some(cache) = &self.cache {
                cache.put(&key, response.clone());
            }
        }

        debug!(
            target: "search",
            query = %response.normalized,
            total = response.total,
            total_ms = response.timing.total_ms,
            degraded = response.is_degraded(),
            "search complete"
        );
        response.results.truncate(limit);
        Ok(response)
    }

    /// Search on behalf of the most recent caller only. Starting another
    /// `search_latest` supersedes this one: it stops waiting on the remote
    /// matcher and returns `Ok(None)`.
    pub async fn search_latest(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Option<SearchResponse>> {
        let mut token = 0;
        self.latest.send_modify(|latest| {
            *latest += 1;
            token = *latest;
        });
        let mut updates = self.latest.subscribe();

        let superseded = async move {
            loop {
                if *updates.borrow_and_update() != token {
                    return;
                }
                if updates.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            biased;
            () = superseded => {
                debug!(target: "search", token, query, "request superseded");
                Ok(None)
            }
            result = self.search(query, options) => {
                if self.current_token() == token {
                    result.map(Some)
                } else {
                    debug!(target: "search", token, query, "request superseded");
                    Ok(None)
                }
            }
        }
    }

    async fn run_remote(&self, query: &str) -> RemoteOutcome {
        let Some(remote) = &self.remote else {
            return RemoteOutcome {
                status: RemoteStatus::Disabled,
                results: Vec::new(),
                elapsed_ms: None,
                warning: None,
            };
        };

        let started = Instant::now();
        let outcome =
            tokio::time::timeout(self.remote_timeout, remote.match_records(query, &self.catalog))
                .await;
        let elapsed = Some(elapsed_ms(started));

        let reason = match outcome {
            Ok(Ok(hits)) => {
                let results = self.remote_results(hits);
                return RemoteOutcome {
                    status: RemoteStatus::Ok {
                        matches: results.len(),
                    },
                    results,
                    elapsed_ms: elapsed,
                    warning: None,
                };
            }
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!(
                "remote matcher timed out after {}ms",
                self.remote_timeout.as_millis()
            ),
        };

        warn!(target: "remote", query, reason = %reason, "remote matcher failed, using local results");
        RemoteOutcome {
            warning: Some(format!(
                "remote matcher unavailable ({reason}); showing local results only"
            )),
            status: RemoteStatus::Failed { reason },
            results: Vec::new(),
            elapsed_ms: elapsed,
        }
    }

    /// Turn remote hits into ranked results, dropping unknown and repeated ids.
    fn remote_results(&self, hits: Vec<RemoteHit>) -> Vec<SearchResult> {
        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            if self.roster.get(hit.id).is_none() {
                debug!(target: "remote", id = hit.id, "ignoring unknown id from remote matcher");
                continue;
            }
            if !seen.insert(hit.id) {
                continue;
            }
            let rank_confidence = RANK_CONFIDENCE_STEP
                .mul_add(-(results.len() as f64), RANK_CONFIDENCE_TOP)
                .max(RANK_CONFIDENCE_FLOOR);
            let confidence = hit.confidence.unwrap_or(rank_confidence).clamp(0.0, 1.0);
            results.push(SearchResult {
                id: hit.id,
                score: confidence * self.remote_score_scale,
                strategy: Strategy::Ai,
                matched_fields: Vec::new(),
                confidence,
            });
        }
        results
    }
}

/// Local-only and remote-backed responses for one query are cached apart.
fn cache_key(normalized: &str, with_remote: bool) -> String {
    if with_remote {
        format!("{normalized}\u{1f}remote")
    } else {
        normalized.to_string()
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}
