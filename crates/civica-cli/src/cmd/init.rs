use anyhow::Result;
use civica_core::config::{CIVICA_DIR, init_project};
use clap::Args;
use std::path::Path;

use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Re-initialize even if `.civica/` already exists.
    #[arg(long)]
    pub force: bool,
}

/// Execute `civ init`. Creates the project skeleton:
///
/// ```text
/// .civica/
///   state/            (one JSON file per persisted store)
///   config.toml       (default project config template)
/// ```
///
/// # Errors
///
/// Returns an error if `.civica/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let civica_dir = project_root.join(CIVICA_DIR);
    if civica_dir.exists() && !args.force {
        anyhow::bail!(".civica/ already exists. Use `civ init --force` to reinitialize.");
    }

    let civica_dir = init_project(project_root)?;
    tracing::info!(dir = %civica_dir.display(), "project initialized");
    render_success(
        output,
        &format!("Initialized civica project in {}", civica_dir.display()),
    )
}
