//! roster expand - Show synonym expansion for a term

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, robot_ok};
use crate::error::Result;
use crate::search::normalize::{Language, normalize};
use crate::search::synonyms::TermCategory;

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Term to expand
    pub term: String,
}

#[derive(Debug, Serialize)]
pub struct ExpandReport {
    pub term: String,
    pub normalized: String,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TermCategory>,
    pub terms: Vec<String>,
}

pub fn run(ctx: &AppContext, args: &ExpandArgs) -> Result<()> {
    let expander = ctx.expander()?;
    let normalized = normalize(&args.term);
    let group = expander
        .resolve(&normalized.text)
        .and_then(|idx| expander.index().group(idx));

    let report = ExpandReport {
        term: args.term.clone(),
        normalized: normalized.text.clone(),
        language: normalized.language,
        canonical: group.map(|g| g.canonical.values().collect::<Vec<_>>().join(" / ")),
        category: group.map(|g| g.category),
        terms: expander.expand(&normalized.text).into_iter().collect(),
    };

    if ctx.robot() {
        return ctx.emit(&robot_ok(&report));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Expansion of \"{}\"", report.term.trim()));
    layout
        .kv("Normalized", &report.normalized)
        .kv("Language", &format!("{:?}", report.language).to_lowercase());
    match (&report.canonical, report.category) {
        (Some(canonical), Some(category)) => {
            layout
                .kv("Group", canonical)
                .kv("Category", &format!("{category:?}").to_lowercase());
        }
        _ => {
            layout.kv("Group", "(none)");
        }
    }
    layout.blank().section("Terms");
    for term in &report.terms {
        layout.bullet(term);
    }
    emit_human(layout);
    Ok(())
}
