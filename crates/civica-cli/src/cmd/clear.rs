//! `civ clear-tracking` — administrative reset of all assignment records.

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct ClearTrackingArgs {
    /// Confirm the reset. Without this flag nothing is deleted.
    #[arg(long)]
    pub force: bool,
}

pub fn run_clear_tracking(
    args: &ClearTrackingArgs,
    output: OutputMode,
    cwd: &Path,
) -> Result<()> {
    if !args.force {
        anyhow::bail!("This deletes every assignment record. Re-run with --force to confirm.");
    }
    let ctx = AppContext::load(cwd)?;
    ctx.engine().clear_tracking()?;
    tracing::info!("assignment tracking cleared");
    render_success(output, "Assignment tracking cleared")
}
