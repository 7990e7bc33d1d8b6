use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};
use crate::search::types::{SearchField, Strategy};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub robot: RobotConfig,
}

impl Config {
    /// Defaults, then the global and project files (or only the explicit
    /// file when one is given), then `ROSTER_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("ROSTER_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                RosterError::MissingConfig(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(project_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a complete config document on top of the defaults.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let patch: ConfigPatch =
            toml::from_str(raw).map_err(|err| RosterError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.validate()?;
        Ok(config)
    }

    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("roster/config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let path = Self::global_path()
            .ok_or_else(|| RosterError::MissingConfig("config directory not found".to_string()))?;
        Self::load_patch(&path)
    }

    fn load_project(project_root: &Path) -> Result<Option<ConfigPatch>> {
        let path = project_root.join(".roster/config.toml");
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| RosterError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| RosterError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.dataset {
            self.dataset.merge(patch);
        }
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.merge {
            self.merge.merge(patch);
        }
        if let Some(patch) = patch.remote {
            self.remote.merge(patch);
        }
        if let Some(patch) = patch.cache {
            self.cache.merge(patch);
        }
        if let Some(patch) = patch.history {
            self.history.merge(patch);
        }
        if let Some(patch) = patch.robot {
            self.robot.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if env_bool("ROSTER_ROBOT").unwrap_or(false) {
            self.robot.format = "json".to_string();
            self.robot.include_metadata = true;
        }
        if env_bool("ROSTER_CACHE_DISABLED").unwrap_or(false) {
            self.cache.enabled = false;
        }

        if let Some(value) = env_string("ROSTER_DATASET") {
            self.dataset.location = value;
        }
        if let Some(value) = env_u64("ROSTER_DATASET_TIMEOUT_SECS")? {
            self.dataset.timeout = Duration::from_secs(value);
        }

        if let Some(value) = env_f64("ROSTER_SEARCH_FUZZY_THRESHOLD")? {
            self.search.fuzzy_threshold = value;
        }
        if let Some(value) = env_f64("ROSTER_SEARCH_MIN_SCORE")? {
            self.search.min_score = value;
        }
        if let Some(value) = env_bool("ROSTER_SEARCH_PARTIAL_EXPANSION") {
            self.search.partial_expansion = value;
        }
        if let Some(value) = env_u32("ROSTER_SEARCH_DEFAULT_LIMIT")? {
            self.search.default_limit = value as usize;
        }
        if let Some(value) = env_string("ROSTER_SEARCH_DICTIONARY") {
            self.search.dictionary_path = Some(PathBuf::from(value));
        }

        if let Some(value) = env_f64("ROSTER_MERGE_REMOTE_SCORE_SCALE")? {
            self.merge.remote_score_scale = value;
        }

        if let Some(value) = env_bool("ROSTER_REMOTE_ENABLED") {
            self.remote.enabled = value;
        }
        if let Some(value) = env_string("ROSTER_REMOTE_ENDPOINT") {
            self.remote.endpoint = value;
        }
        if let Some(value) = env_u64("ROSTER_REMOTE_TIMEOUT_MS")? {
            self.remote.timeout = Duration::from_millis(value);
        }

        if let Some(value) = env_bool("ROSTER_CACHE_ENABLED") {
            self.cache.enabled = value;
        }
        if let Some(value) = env_u32("ROSTER_CACHE_CAPACITY")? {
            self.cache.capacity = value as usize;
        }
        if let Some(value) = env_u64("ROSTER_CACHE_TTL_SECONDS")? {
            self.cache.ttl = Duration::from_secs(value);
        }

        if let Some(value) = env_bool("ROSTER_HISTORY_ENABLED") {
            self.history.enabled = value;
        }
        if let Some(value) = env_u32("ROSTER_HISTORY_MAX_ENTRIES")? {
            self.history.max_entries = value as usize;
        }

        if let Some(value) = env_string("ROSTER_ROBOT_FORMAT") {
            self.robot.format = value;
        }
        if let Some(value) = env_bool("ROSTER_ROBOT_INCLUDE_METADATA") {
            self.robot.include_metadata = value;
        }

        Ok(())
    }

    /// Reject values the search pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.search.fuzzy_threshold) {
            return Err(RosterError::Config(format!(
                "search.fuzzy_threshold must be within 0.0..=1.0, got {}",
                self.search.fuzzy_threshold
            )));
        }
        for (key, value) in [
            ("search.min_score", self.search.min_score),
            ("search.synonym_factor", self.search.synonym_factor),
            ("search.completeness_boost", self.search.completeness_boost),
            ("search.direct_match_boost", self.search.direct_match_boost),
            ("merge.remote_score_scale", self.merge.remote_score_scale),
        ] {
            ensure_non_negative(key, value)?;
        }
        for (field, weight) in &self.search.field_weights {
            ensure_non_negative(&format!("search.field_weights.{}", field.as_str()), *weight)?;
        }
        for (strategy, weight) in &self.merge.blend {
            ensure_non_negative(&format!("merge.blend.{}", strategy.as_str()), *weight)?;
        }
        if self.cache.capacity == 0 {
            return Err(RosterError::Config(
                "cache.capacity must be at least 1".to_string(),
            ));
        }
        if self.remote.enabled && self.remote.endpoint.trim().is_empty() {
            return Err(RosterError::Config(
                "remote matcher is enabled but [remote].endpoint is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// File path or `http(s)://` URL of the participants document
    #[serde(default)]
    pub location: String,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            location: "data/participants.json".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl DatasetConfig {
    fn merge(&mut self, patch: DatasetPatch) {
        if let Some(value) = patch.location {
            self.location = value;
        }
        if let Some(value) = patch.timeout {
            self.timeout = value;
        }
    }
}

/// A query-side trigger list and the role labels it must never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleExclusion {
    pub query_terms: Vec<String>,
    pub excluded_roles: Vec<String>,
}

pub fn default_role_exclusions() -> Vec<RoleExclusion> {
    vec![RoleExclusion {
        query_terms: ["designer", "デザイナー", "design", "デザイン"]
            .map(String::from)
            .to_vec(),
        excluded_roles: ["pm engineer", "pm エンジニア", "engineer pm", "エンジニア pm"]
            .map(String::from)
            .to_vec(),
    }]
}

pub fn default_field_weights() -> BTreeMap<SearchField, f64> {
    BTreeMap::from([
        (SearchField::Name, 10.0),
        (SearchField::Role, 9.0),
        (SearchField::Skill, 8.0),
        (SearchField::Team, 5.0),
        (SearchField::Interest, 5.0),
        (SearchField::Idea, 4.0),
        (SearchField::Language, 4.0),
        (SearchField::Bio, 3.0),
        (SearchField::Company, 2.0),
        (SearchField::Repository, 2.0),
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum similarity for fuzzy and phonetic matches
    #[serde(default)]
    pub fuzzy_threshold: f64,
    #[serde(default)]
    pub min_score: f64,
    #[serde(default)]
    pub synonym_factor: f64,
    #[serde(default)]
    pub completeness_boost: f64,
    #[serde(default)]
    pub direct_match_boost: f64,
    #[serde(default)]
    pub partial_expansion: bool,
    #[serde(default)]
    pub min_partial_overlap: usize,
    /// Queries shorter than this skip edit-distance matching
    #[serde(default)]
    pub min_fuzzy_len: usize,
    #[serde(default)]
    pub default_limit: usize,
    /// Extra synonym groups appended to the built-in dictionary
    #[serde(default)]
    pub dictionary_path: Option<PathBuf>,
    #[serde(default)]
    pub field_weights: BTreeMap<SearchField, f64>,
    #[serde(default)]
    pub role_exclusions: Vec<RoleExclusion>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.75,
            min_score: 0.5,
            synonym_factor: 0.9,
            completeness_boost: 0.1,
            direct_match_boost: 0.2,
            partial_expansion: true,
            min_partial_overlap: 3,
            min_fuzzy_len: 4,
            default_limit: 20,
            dictionary_path: None,
            field_weights: default_field_weights(),
            role_exclusions: default_role_exclusions(),
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.fuzzy_threshold {
            self.fuzzy_threshold = value;
        }
        if let Some(value) = patch.min_score {
            self.min_score = value;
        }
        if let Some(value) = patch.synonym_factor {
            self.synonym_factor = value;
        }
        if let Some(value) = patch.completeness_boost {
            self.completeness_boost = value;
        }
        if let Some(value) = patch.direct_match_boost {
            self.direct_match_boost = value;
        }
        if let Some(value) = patch.partial_expansion {
            self.partial_expansion = value;
        }
        if let Some(value) = patch.min_partial_overlap {
            self.min_partial_overlap = value;
        }
        if let Some(value) = patch.min_fuzzy_len {
            self.min_fuzzy_len = value;
        }
        if let Some(value) = patch.default_limit {
            self.default_limit = value;
        }
        if let Some(value) = patch.dictionary_path {
            self.dictionary_path = Some(value);
        }
        if let Some(values) = patch.field_weights {
            self.field_weights.extend(values);
        }
        if let Some(values) = patch.role_exclusions {
            self.role_exclusions = values;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default)]
    pub blend: BTreeMap<Strategy, f64>,
    /// Multiplier turning a remote confidence (0..=1) into a score
    #[serde(default)]
    pub remote_score_scale: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            blend: crate::search::merge::default_blend(),
            remote_score_scale: 10.0,
        }
    }
}

impl MergeConfig {
    fn merge(&mut self, patch: MergePatch) {
        if let Some(values) = patch.blend {
            self.blend.extend(values);
        }
        if let Some(value) = patch.remote_score_scale {
            self.remote_score_scale = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Duration,
    /// Environment variable holding the bearer token, if any
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            timeout: Duration::from_secs(3),
            api_key_env: Some("ROSTER_REMOTE_API_KEY".to_string()),
        }
    }
}

impl RemoteConfig {
    fn merge(&mut self, patch: RemotePatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.endpoint {
            self.endpoint = value;
        }
        if let Some(value) = patch.timeout {
            self.timeout = value;
        }
        if let Some(value) = patch.api_key_env {
            self.api_key_env = Some(value);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub capacity: usize,
    #[serde(default, with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: crate::search::cache::DEFAULT_CAPACITY,
            ttl: crate::search::cache::DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    fn merge(&mut self, patch: CachePatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.capacity {
            self.capacity = value;
        }
        if let Some(value) = patch.ttl {
            self.ttl = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub max_entries: usize,
    /// Defaults to `recent_queries.json` in the user data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: crate::history::DEFAULT_MAX_ENTRIES,
            path: None,
        }
    }
}

impl HistoryConfig {
    fn merge(&mut self, patch: HistoryPatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.max_entries {
            self.max_entries = value;
        }
        if let Some(value) = patch.path {
            self.path = Some(value);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub include_metadata: bool,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            include_metadata: true,
        }
    }
}

impl RobotConfig {
    fn merge(&mut self, patch: RobotPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
        if let Some(value) = patch.include_metadata {
            self.include_metadata = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub dataset: Option<DatasetPatch>,
    pub search: Option<SearchPatch>,
    pub merge: Option<MergePatch>,
    pub remote: Option<RemotePatch>,
    pub cache: Option<CachePatch>,
    pub history: Option<HistoryPatch>,
    pub robot: Option<RobotPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatasetPatch {
    pub location: Option<String>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub fuzzy_threshold: Option<f64>,
    pub min_score: Option<f64>,
    pub synonym_factor: Option<f64>,
    pub completeness_boost: Option<f64>,
    pub direct_match_boost: Option<f64>,
    pub partial_expansion: Option<bool>,
    pub min_partial_overlap: Option<usize>,
    pub min_fuzzy_len: Option<usize>,
    pub default_limit: Option<usize>,
    pub dictionary_path: Option<PathBuf>,
    pub field_weights: Option<BTreeMap<SearchField, f64>>,
    pub role_exclusions: Option<Vec<RoleExclusion>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MergePatch {
    pub blend: Option<BTreeMap<Strategy, f64>>,
    pub remote_score_scale: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RemotePatch {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CachePatch {
    pub enabled: Option<bool>,
    pub capacity: Option<usize>,
    #[serde(default, with = "humantime_serde")]
    pub ttl: Option<Duration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct HistoryPatch {
    pub enabled: Option<bool>,
    pub max_entries: Option<usize>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RobotPatch {
    pub format: Option<String>,
    pub include_metadata: Option<bool>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u32(key: &str) -> Result<Option<u32>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<u32>().map(Some).map_err(|err| {
            RosterError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<u64>().map(Some).map_err(|err| {
            RosterError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}

/// Finite and not negative; NaN would break score ordering.
fn ensure_non_negative(key: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RosterError::Config(format!(
            "{key} must be a finite, non-negative number, got {value}"
        )))
    }
}

fn env_f64(key: &str) -> Result<Option<f64>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<f64>().map(Some).map_err(|err| {
            RosterError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}
