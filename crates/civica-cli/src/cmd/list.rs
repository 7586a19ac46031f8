//! `civ list` — the merged issue list with presentation filters.
//!
//! Filters narrow what is shown, never what is stored: `--mine` keeps
//! issues reported by the current session identity, and `--status` /
//! `--category` match exact values. Order is local ledger first
//! (most recent first), then remote issues in store order.

use anyhow::Result;
use civica_core::Error;
use civica_core::model::{Category, Issue, Status};
use clap::Args;
use std::io::Write;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only issues reported by the current session.
    #[arg(long)]
    pub mine: bool,

    /// Filter by status: pending, in-progress, resolved.
    #[arg(short, long)]
    pub status: Option<Status>,

    /// Filter by category.
    #[arg(short, long)]
    pub category: Option<Category>,

    /// Maximum issues to show.
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,
}

fn write_row(issue: &Issue, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{:<14} {:<12} {:<16} {:>3}  {}",
        issue.id.as_str(),
        issue.status.as_str(),
        issue.category.as_str(),
        issue.upvotes,
        issue.title
    )
}

pub fn run_list(args: &ListArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let engine = ctx.engine();

    let reporter = if args.mine {
        Some(engine.current_session().ok_or(Error::Auth)?.id)
    } else {
        None
    };

    let issues: Vec<Issue> = engine
        .all_issues()?
        .into_iter()
        .filter(|issue| reporter.is_none_or(|id| issue.reporter_id == id))
        .filter(|issue| args.status.is_none_or(|status| issue.status == status))
        .filter(|issue| args.category.is_none_or(|category| issue.category == category))
        .take(args.limit)
        .collect();

    render(output, &issues, |issues, w| {
        if issues.is_empty() {
            return writeln!(w, "No issues found");
        }
        for issue in issues {
            write_row(issue, w)?;
        }
        Ok(())
    })
}
