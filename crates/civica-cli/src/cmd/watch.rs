//! `civ watch` — a polling dashboard in the terminal.
//!
//! A background timer re-pulls the merged issue list and assignment
//! mapping on the configured cadence; the foreground loop prints each
//! snapshot wholesale. A failed pull keeps the prior snapshot and shows
//! the error instead of a partial view.

use anyhow::Result;
use civica_core::sync::{Dashboard, Snapshot, ThreadSchedule};
use clap::Args;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::context::AppContext;
use crate::output::{OutputMode, render, rule};

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Refresh cadence in seconds. Defaults to the project config.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many refreshes (default: run until interrupted).
    #[arg(long)]
    pub ticks: Option<u64>,
}

fn write_snapshot(snapshot: &Snapshot, w: &mut dyn Write) -> std::io::Result<()> {
    if let Some(error) = &snapshot.error {
        writeln!(w, "refresh failed: {error}")?;
    }
    match snapshot.refreshed_at {
        Some(at) => writeln!(w, "as of {} — {} issues", at, snapshot.issues.len())?,
        None => writeln!(w, "no data yet")?,
    }
    for issue in &snapshot.issues {
        let tracked = snapshot.assignments.get(issue.id.as_str());
        let holder = tracked
            .and_then(|record| record.assigned_to.as_ref())
            .map_or("-", |assignee| assignee.name.as_str());
        writeln!(
            w,
            "{:<14} {:<12} {:<20} {}",
            issue.id.as_str(),
            issue.status.as_str(),
            holder,
            issue.title
        )?;
    }
    rule(w)
}

pub fn run_watch(args: &WatchArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let interval = Duration::from_secs(args.interval.unwrap_or(ctx.config.sync.interval_secs));
    let dashboard = Arc::new(Dashboard::new(ctx.engine(), ctx.clock()));

    // First pull up front so the screen is never empty.
    let snapshot = dashboard.refresh();
    render(output, &snapshot_rows(&snapshot), |_, w| {
        write_snapshot(&snapshot, w)
    })?;

    let schedule = ThreadSchedule;
    let handle = dashboard.start(&schedule, interval);

    let mut remaining = args.ticks;
    loop {
        if let Some(0) = remaining {
            break;
        }
        std::thread::sleep(interval);
        let snapshot = dashboard.snapshot();
        render(output, &snapshot_rows(&snapshot), |_, w| {
            write_snapshot(&snapshot, w)
        })?;
        remaining = remaining.map(|n| n.saturating_sub(1));
    }
    handle.cancel();
    Ok(())
}

/// JSON shape for one snapshot: the issues plus refresh metadata.
fn snapshot_rows(snapshot: &Snapshot) -> serde_json::Value {
    serde_json::json!({
        "refreshedAt": snapshot.refreshed_at,
        "error": snapshot.error,
        "issues": snapshot.issues,
        "assignments": snapshot.assignments,
    })
}
