//! `civ note` — append a status note to an issue's assignment record.

use anyhow::Result;
use civica_core::model::IssueId;
use clap::Args;
use std::io::Write;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct NoteArgs {
    /// Issue id the note belongs to.
    pub id: String,

    /// Note text.
    pub note: String,
}

pub fn run_note(args: &NoteArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let record = ctx
        .engine()
        .add_status_note(&IssueId::from(args.id.as_str()), &args.note)?;
    render(output, &record, |record, w| {
        for note in &record.status_updates {
            writeln!(w, "{} ({}): {}", note.updated_by.name, note.updated_by.role, note.note)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_args_parse() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: NoteArgs,
        }
        let w = Wrapper::parse_from(["test", "42", "Crew scheduled for Monday"]);
        assert_eq!(w.args.id, "42");
        assert_eq!(w.args.note, "Crew scheduled for Monday");
    }
}
