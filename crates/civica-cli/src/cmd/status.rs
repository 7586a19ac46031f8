//! `civ status` — move an issue to a new lifecycle status.
//!
//! Any status reaches any other; resolved issues can be reopened. Only
//! politician, moderator, and admin sessions may move status.

use anyhow::Result;
use civica_core::model::{IssueId, Status};
use clap::Args;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, kv, render};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Issue id to update.
    pub id: String,

    /// New status: pending, in-progress, resolved.
    pub status: Status,
}

pub fn run_status(args: &StatusArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let issue = ctx
        .engine()
        .set_status(&IssueId::from(args.id.as_str()), args.status)?;
    tracing::info!(id = %issue.id, status = %issue.status, "status updated");
    render(output, &issue, |issue, w| {
        kv(w, "id", issue.id.as_str())?;
        kv(w, "title", &issue.title)?;
        kv(w, "status", issue.status.as_str())
    })
}
