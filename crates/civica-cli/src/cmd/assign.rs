//! `civ assign` / `civ unassign` — the two assignment slots per issue.
//!
//! Each issue has at most one "assigned to" (operational) and one
//! "in charge" (supervisory) holder. Assigning overwrites the previous
//! holder; there is no queue and no approval step.

use anyhow::Result;
use civica_core::model::{AssignmentRecord, IssueId, Person, Role};
use clap::Args;
use std::io::Write;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, kv, render, render_success};

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Issue id to assign.
    pub id: String,

    /// Claim the supervisory "in charge" slot instead of "assigned to".
    #[arg(long)]
    pub in_charge: bool,

    /// Assign someone other than yourself: their user id.
    #[arg(long, requires = "name")]
    pub user_id: Option<u64>,

    /// Display name for --user-id.
    #[arg(long, requires = "user_id")]
    pub name: Option<String>,

    /// Role for --user-id. Defaults to politician.
    #[arg(long, default_value = "politician")]
    pub role: Role,
}

#[derive(Args, Debug)]
pub struct UnassignArgs {
    /// Issue id to release.
    pub id: String,

    /// Release the "in charge" slot instead of "assigned to".
    #[arg(long)]
    pub in_charge: bool,
}

fn write_record(record: &AssignmentRecord, w: &mut dyn Write) -> std::io::Result<()> {
    match &record.in_charge {
        Some(holder) => kv(w, "in charge", format!("{} ({})", holder.name, holder.role))?,
        None => kv(w, "in charge", "-")?,
    }
    match &record.assigned_to {
        Some(holder) => kv(w, "assigned", format!("{} ({})", holder.name, holder.role))?,
        None => kv(w, "assigned", "-")?,
    }
    Ok(())
}

pub fn run_assign(args: &AssignArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let engine = ctx.engine();
    let id = IssueId::from(args.id.as_str());

    // Default to claiming the slot yourself.
    let person = match (args.user_id, &args.name) {
        (Some(user_id), Some(name)) => Person {
            id: user_id,
            name: name.clone(),
            role: args.role,
        },
        _ => engine
            .current_session()
            .ok_or(civica_core::Error::Auth)?
            .person(),
    };

    let record = if args.in_charge {
        engine.set_in_charge(&id, &person)?
    } else {
        engine.assign(&id, &person)?
    };
    tracing::info!(issue = %id, person = person.id, in_charge = args.in_charge, "assigned");
    render(output, &record, |record, w| write_record(record, w))
}

pub fn run_unassign(args: &UnassignArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let engine = ctx.engine();
    let id = IssueId::from(args.id.as_str());

    let released = if args.in_charge {
        engine.remove_in_charge(&id)?
    } else {
        engine.unassign(&id)?
    };
    match released {
        Some(record) => render(output, &record, |record, w| write_record(record, w)),
        None => render_success(output, "Nothing to release"),
    }
}
