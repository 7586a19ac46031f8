//! `civ report` — file a new issue into the local ledger.

use anyhow::Result;
use civica_core::model::{Category, IssueDraft};
use clap::Args;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, kv, render};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Short summary of the problem.
    #[arg(short, long)]
    pub title: String,

    /// What is wrong and where.
    #[arg(short, long)]
    pub description: String,

    /// Category: infrastructure, healthcare, education, environment,
    /// transportation, public-safety.
    #[arg(short, long)]
    pub category: Category,
}

pub fn run_report(args: &ReportArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let draft = IssueDraft {
        title: args.title.clone(),
        description: args.description.clone(),
        category: args.category,
    };
    let issue = ctx.engine().report(&draft)?;
    tracing::info!(id = %issue.id, "issue reported");
    render(output, &issue, |issue, w| {
        kv(w, "id", issue.id.as_str())?;
        kv(w, "title", &issue.title)?;
        kv(w, "category", issue.category.as_str())?;
        kv(w, "status", issue.status.as_str())?;
        kv(w, "upvotes", issue.upvotes.to_string())
    })
}
