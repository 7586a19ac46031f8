//! `civ users` — admin-only user administration against the remote store.

use anyhow::Result;
use civica_core::model::{Role, UserAccount};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, kv, render, render_success};

#[derive(Args, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List all user accounts.
    List,
    /// Change a user's role.
    SetRole {
        /// User id to change.
        user_id: u64,
        /// New role: citizen, politician, moderator, admin.
        role: Role,
    },
    /// Delete a user account.
    Delete {
        /// User id to delete.
        user_id: u64,
    },
}

fn write_account(account: &UserAccount, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "{:<6} {:<12} {:<8} {:<28} {}",
        account.id,
        account.role.as_str(),
        if account.active { "active" } else { "inactive" },
        account.email,
        account.name
    )
}

pub fn run_users(args: &UsersArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let engine = ctx.engine();
    match &args.command {
        UsersCommand::List => {
            let users = engine.list_users()?;
            render(output, &users, |users, w| {
                for account in users {
                    write_account(account, w)?;
                }
                Ok(())
            })
        }
        UsersCommand::SetRole { user_id, role } => {
            let account = engine.set_user_role(*user_id, *role)?;
            tracing::info!(user = account.id, role = %account.role, "role changed");
            render(output, &account, |account, w| {
                kv(w, "id", account.id.to_string())?;
                kv(w, "name", &account.name)?;
                kv(w, "role", account.role.as_str())
            })
        }
        UsersCommand::Delete { user_id } => {
            engine.delete_user(*user_id)?;
            render_success(output, &format!("Deleted user {user_id}"))
        }
    }
}
