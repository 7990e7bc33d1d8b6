//! Error types for roster

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("search query is empty; type a name, role, skill or keyword")]
    EmptyQuery,

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("participant not found: {0}")]
    RecordNotFound(u32),

    #[error("remote matcher error: {0}")]
    Remote(String),

    #[error("dictionary error: {0}")]
    Dictionary(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RosterError {
    /// Stable machine-readable code used by robot output.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "empty_query",
            Self::Dataset(_) => "dataset",
            Self::RecordNotFound(_) => "not_found",
            Self::Remote(_) => "remote",
            Self::Dictionary(_) => "dictionary",
            Self::Config(_) | Self::MissingConfig(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
