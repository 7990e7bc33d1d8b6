//! roster recent - List or clear recent queries

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, robot_ok};
use crate::error::Result;
use crate::history::RecentQuery;

#[derive(Args, Debug)]
pub struct RecentArgs {
    /// Forget all recent queries
    #[arg(long)]
    pub clear: bool,
}

#[derive(Debug, Serialize)]
struct RecentReport<'a> {
    enabled: bool,
    cleared: bool,
    queries: &'a [RecentQuery],
}

pub fn run(ctx: &AppContext, args: &RecentArgs) -> Result<()> {
    let Some(mut history) = ctx.history()? else {
        if ctx.robot() {
            return ctx.emit(&robot_ok(RecentReport {
                enabled: false,
                cleared: false,
                queries: &[],
            }));
        }
        let mut layout = HumanLayout::new();
        layout.push_line("Query history is disabled ([history].enabled = false).");
        emit_human(layout);
        return Ok(());
    };

    if args.clear {
        history.clear();
        history.save()?;
    }

    if ctx.robot() {
        return ctx.emit(&robot_ok(RecentReport {
            enabled: true,
            cleared: args.clear,
            queries: history.entries(),
        }));
    }

    let mut layout = HumanLayout::new();
    if args.clear {
        layout.push_line("Recent queries cleared.");
    } else if history.is_empty() {
        layout.push_line("No recent queries.");
    } else {
        layout.title("Recent queries");
        for entry in history.entries() {
            layout.bullet(&format!(
                "{}  ({})",
                entry.query,
                entry.searched_at.format("%Y-%m-%d %H:%M")
            ));
        }
    }
    emit_human(layout);
    Ok(())
}
