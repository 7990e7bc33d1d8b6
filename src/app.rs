use std::path::PathBuf;

use crate::cli::output::{OutputMode, RobotResponse, emit_robot};
use crate::config::Config;
use crate::error::{Result, RosterError};
use crate::history::RecentQueries;
use crate::roster::{DatasetSource, Roster};
use crate::search::SearchEngine;
use crate::search::expand::TermExpander;
use crate::search::synonyms::SynonymIndex;

pub struct AppContext {
    pub project_root: PathBuf,
    pub config: Config,
    pub output_mode: OutputMode,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let project_root = std::env::current_dir()?;
        let mut config = Config::load(cli.config.as_deref(), &project_root)?;
        if let Some(dataset) = &cli.dataset {
            config.dataset.location.clone_from(dataset);
        }

        Ok(Self {
            project_root,
            config,
            output_mode: cli.output_mode(),
            verbosity: cli.verbose,
        })
    }

    pub fn robot(&self) -> bool {
        self.output_mode == OutputMode::Robot
    }

    pub fn dataset_source(&self) -> Result<DatasetSource> {
        let location = self.config.dataset.location.trim();
        if location.is_empty() {
            return Err(RosterError::MissingConfig(
                "no dataset configured; pass --dataset or set [dataset].location".to_string(),
            ));
        }
        let source = DatasetSource::parse(location);
        // Relative dataset paths resolve against the working directory.
        Ok(match source {
            DatasetSource::File(path) if path.is_relative() => {
                DatasetSource::File(self.project_root.join(path))
            }
            other => other,
        })
    }

    /// Load the dataset and build the search engine.
    pub async fn load_engine(&self) -> Result<SearchEngine> {
        let source = self.dataset_source()?;
        let roster = Roster::load(&source, self.config.dataset.timeout).await?;
        SearchEngine::from_config(roster, &self.config)
    }

    /// Term expander alone; needs no dataset.
    pub fn expander(&self) -> Result<TermExpander> {
        let search = &self.config.search;
        let index = match &search.dictionary_path {
            Some(path) => SynonymIndex::builtin_with_file(path)?,
            None => SynonymIndex::builtin()?,
        };
        Ok(TermExpander::new(
            index,
            search.partial_expansion,
            search.min_partial_overlap,
        ))
    }

    /// Recent-query store, or `None` when history is disabled.
    pub fn history(&self) -> Result<Option<RecentQueries>> {
        if !self.config.history.enabled {
            return Ok(None);
        }
        let path = self
            .config
            .history
            .path
            .clone()
            .or_else(RecentQueries::default_path)
            .ok_or_else(|| RosterError::MissingConfig("data directory not found".to_string()))?;
        RecentQueries::load(path, self.config.history.max_entries).map(Some)
    }

    pub fn emit<T: serde::Serialize>(&self, response: &RobotResponse<T>) -> Result<()> {
        emit_robot(response, &self.config.robot)
    }
}
