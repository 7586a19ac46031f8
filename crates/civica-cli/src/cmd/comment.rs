//! `civ comment` — append a comment to a remote issue.

use anyhow::Result;
use civica_core::model::{CommentDraft, IssueId};
use clap::Args;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, kv, render};

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Issue id to comment on.
    pub id: String,

    /// Comment text.
    pub body: String,
}

pub fn run_comment(args: &CommentArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let comment = ctx.engine().add_comment(
        &IssueId::from(args.id.as_str()),
        &CommentDraft {
            body: args.body.clone(),
        },
    )?;
    render(output, &comment, |comment, w| {
        kv(w, "issue", comment.issue_id.as_str())?;
        kv(w, "author", &comment.author)?;
        kv(w, "body", &comment.body)
    })
}
