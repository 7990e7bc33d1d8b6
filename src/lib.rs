//! roster - multilingual participant search
//!
//! Normalization, bilingual synonym expansion, typo- and script-tolerant
//! matching, weighted field scoring, strategy merging and a result cache over
//! a static roster of bilingual participant records.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod roster;
pub mod search;
pub mod test_utils;

pub use error::{Result, RosterError};
