//! `civ show` — full detail for a single issue.
//!
//! Issue, comments, and the assignment record load as one unit; if any
//! part fails, nothing renders.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use civica_core::engine::IssueView;
use civica_core::model::IssueId;
use clap::Args;
use std::io::Write;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, kv, render, rule, section};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Issue id, remote ("42") or local ("local-1717243200000").
    pub id: String,
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn write_view(view: &IssueView, w: &mut dyn Write) -> std::io::Result<()> {
    section(w, &view.issue.title)?;
    kv(w, "id", view.issue.id.as_str())?;
    kv(w, "status", view.issue.status.as_str())?;
    kv(w, "category", view.issue.category.as_str())?;
    kv(w, "reporter", &view.issue.reporter_name)?;
    kv(w, "reported", local_time(view.issue.created_at))?;
    kv(w, "upvotes", view.issue.upvotes.to_string())?;
    writeln!(w)?;
    writeln!(w, "{}", view.issue.description)?;

    if let Some(record) = &view.record {
        writeln!(w)?;
        section(w, "Assignment")?;
        match &record.in_charge {
            Some(holder) => kv(w, "in charge", format!("{} ({})", holder.name, holder.role))?,
            None => kv(w, "in charge", "-")?,
        }
        match &record.assigned_to {
            Some(holder) => kv(w, "assigned", format!("{} ({})", holder.name, holder.role))?,
            None => kv(w, "assigned", "-")?,
        }
        kv(w, "updated", local_time(record.last_updated))?;
        for note in &record.status_updates {
            writeln!(
                w,
                "  [{}] {} ({}): {}",
                local_time(note.timestamp),
                note.updated_by.name,
                note.updated_by.role,
                note.note
            )?;
        }
    }

    if !view.comments.is_empty() {
        writeln!(w)?;
        section(w, &format!("Comments ({})", view.comments.len()))?;
        for comment in &view.comments {
            writeln!(
                w,
                "{} ({}) at {}",
                comment.author,
                comment.author_role,
                local_time(comment.created_at)
            )?;
            writeln!(w, "  {}", comment.body)?;
            rule(w)?;
        }
    }
    Ok(())
}

pub fn run_show(args: &ShowArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let view = ctx.engine().view(&IssueId::from(args.id.as_str()))?;
    render(output, &view, |view, w| write_view(view, w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_args_take_a_positional_id() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ShowArgs,
        }
        let w = Wrapper::parse_from(["test", "local-1717243200000"]);
        assert_eq!(w.args.id, "local-1717243200000");
    }
}
