//! roster show - Show one participant
//!
//! Human mode prints a key/value card; robot mode emits the record as stored.

use clap::Args;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, robot_ok};
use crate::error::Result;
use crate::roster::{Bilingual, PersonRecord};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Participant id
    pub id: u32,
}

pub async fn run(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let engine = ctx.load_engine().await?;
    let record = engine.record(args.id)?;
    debug!(target: "show", id = record.id, "showing participant");

    if ctx.robot() {
        return ctx.emit(&robot_ok(record));
    }
    emit_human(card(record));
    Ok(())
}

fn card(record: &PersonRecord) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title(&record.name.values().collect::<Vec<_>>().join(" / "));
    layout
        .kv("Id", &record.id.to_string())
        .kv("Team", &joined(std::slice::from_ref(&record.team)))
        .kv("Roles", &joined(&record.roles))
        .kv("Skills", &joined(&record.skills))
        .kv("Interests", &joined(&record.interests))
        .kv("Ideas", &joined(&record.ideas));

    if let Some(github) = &record.github {
        layout.blank().section("Code profile");
        layout
            .kv("Bio", github.bio.as_deref().unwrap_or_default())
            .kv("Company", github.company.as_deref().unwrap_or_default())
            .kv("Languages", &github.top_languages.join(", "));
        for repo in &github.repositories {
            let mut line = format!("{} ({} stars)", repo.name, repo.stars);
            if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
                line.push_str(": ");
                line.push_str(description);
            }
            layout.bullet(&line);
        }
    }
    layout
}

fn joined(values: &[Bilingual]) -> String {
    values
        .iter()
        .filter(|value| !value.is_empty())
        .map(|value| value.values().collect::<Vec<_>>().join(" / "))
        .collect::<Vec<_>>()
        .join(", ")
}
