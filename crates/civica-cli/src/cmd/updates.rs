//! `civ updates` — politician updates feed.

use anyhow::Result;
use civica_core::Error;
use civica_core::model::UpdateDraft;
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, render, rule};

#[derive(Args, Debug)]
pub struct UpdatesArgs {
    #[command(subcommand)]
    pub command: UpdatesCommand,
}

#[derive(Subcommand, Debug)]
pub enum UpdatesCommand {
    /// List recent updates.
    List {
        /// Only updates posted by the current session.
        #[arg(long)]
        mine: bool,
    },
    /// Post a new update (politicians only).
    Post {
        /// Headline.
        #[arg(short, long)]
        title: String,
        /// Body text.
        #[arg(short, long)]
        content: String,
    },
}

pub fn run_updates(args: &UpdatesArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let engine = ctx.engine();
    match &args.command {
        UpdatesCommand::List { mine } => {
            let author = if *mine {
                Some(engine.current_session().ok_or(Error::Auth)?.id)
            } else {
                None
            };
            let updates: Vec<_> = engine
                .list_updates()?
                .into_iter()
                .filter(|update| author.is_none_or(|id| update.politician_id == id))
                .collect();
            render(output, &updates, |updates, w| {
                if updates.is_empty() {
                    return writeln!(w, "No updates");
                }
                for update in updates {
                    writeln!(
                        w,
                        "{}  {} ({} likes)",
                        update.politician_name, update.title, update.likes
                    )?;
                    writeln!(w, "  {}", update.content)?;
                    rule(w)?;
                }
                Ok(())
            })
        }
        UpdatesCommand::Post { title, content } => {
            let update = engine.post_update(&UpdateDraft {
                title: title.clone(),
                content: content.clone(),
            })?;
            tracing::info!(id = update.id, "update posted");
            render(output, &update, |update, w| {
                writeln!(w, "Posted: {}", update.title)
            })
        }
    }
}
