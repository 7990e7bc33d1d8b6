//! CLI command implementations
//!
//! Each subcommand has its own module with an Args struct and a `run()`
//! function.

use clap::Subcommand;

pub mod expand;
pub mod recent;
pub mod search;
pub mod show;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search participants
    Search(search::SearchArgs),

    /// Show one participant by id
    Show(show::ShowArgs),

    /// Show how a term expands through the synonym dictionary
    Expand(expand::ExpandArgs),

    /// List or clear recent queries
    Recent(recent::RecentArgs),
}

/// Dispatch a command to its handler
pub async fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Search(args) => search::run(ctx, args).await,
        Commands::Show(args) => show::run(ctx, args).await,
        Commands::Expand(args) => expand::run(ctx, args),
        Commands::Recent(args) => recent::run(ctx, args),
    }
}
