//! roster search - Search participants

use clap::Args;
use console::style;
use tracing::warn;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, robot_ok};
use crate::error::Result;
use crate::roster::Roster;
use crate::search::{SearchOptions, SearchResponse, SearchResult};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Name, role, skill or keyword, in English or Japanese
    pub query: String,

    /// Maximum number of results
    #[arg(long, short)]
    pub limit: Option<usize>,

    /// Skip the remote natural-language matcher
    #[arg(long)]
    pub no_remote: bool,

    /// Bypass the result cache
    #[arg(long)]
    pub no_cache: bool,
}

pub async fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let engine = ctx.load_engine().await?;
    let options = SearchOptions {
        limit: args.limit,
        use_remote: !args.no_remote,
        use_cache: !args.no_cache,
    };
    let response = engine.search(&args.query, &options).await?;
    remember(ctx, &args.query);

    if ctx.robot() {
        let warnings = response.warnings.clone();
        return ctx.emit(&robot_ok(&response).with_warnings(warnings));
    }

    emit_human(render(&response, engine.roster()));
    Ok(())
}

/// History is a convenience; failing to update it never fails the search.
fn remember(ctx: &AppContext, query: &str) {
    let outcome = ctx.history().and_then(|history| match history {
        Some(mut history) => {
            if history.record(query) {
                history.save()?;
            }
            Ok(())
        }
        None => Ok(()),
    });
    if let Err(err) = outcome {
        warn!(target: "history", error = %err, "could not update recent queries");
    }
}

fn render(response: &SearchResponse, roster: &Roster) -> HumanLayout {
    let mut layout = HumanLayout::new();
    let heading = if response.total == response.results.len() {
        format!("{} result(s) for \"{}\"", response.total, response.query.trim())
    } else {
        format!(
            "{} of {} result(s) for \"{}\"",
            response.results.len(),
            response.total,
            response.query.trim()
        )
    };
    layout.title(&heading);

    for warning in &response.warnings {
        layout.warning(warning);
    }

    if response.results.is_empty() {
        layout.push_line("No participants matched. Try a broader term or a synonym.");
        return layout;
    }

    for (rank, result) in response.results.iter().enumerate() {
        render_result(&mut layout, rank + 1, result, roster);
    }

    let mut footer = format!("{} ms", response.timing.total_ms);
    if response.cached {
        footer.push_str(" (cached)");
    }
    layout.push_line(style(footer).dim().to_string());
    layout
}

fn render_result(layout: &mut HumanLayout, rank: usize, result: &SearchResult, roster: &Roster) {
    let name = roster
        .get(result.id)
        .map_or_else(|| format!("#{}", result.id), |record| {
            record.name.values().collect::<Vec<_>>().join(" / ")
        });
    layout.push_line(format!(
        "{rank:>2}. {}  {}",
        style(name).bold(),
        style(format!(
            "score {:.2} | confidence {:.0}% | {} | id {}",
            result.score,
            result.confidence * 100.0,
            result.strategy.as_str(),
            result.id
        ))
        .dim()
    ));
    for field in &result.matched_fields {
        layout.bullet(&format!(
            "{}: {} ({}, {:.2})",
            field.field.as_str(),
            field.value,
            field.kind.as_str(),
            field.score
        ));
    }
    layout.blank();
}
