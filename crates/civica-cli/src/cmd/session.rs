//! `civ login`, `civ logout`, and `civ whoami` — mock session management.
//!
//! Login is a stub: any email is accepted, the identity gets a random id,
//! and the token is an opaque timestamp marker. The role is fixed at login
//! and never re-derived from server state.

use anyhow::Result;
use civica_core::Error;
use civica_core::model::{Role, Session};
use clap::Args;
use std::path::Path;

use crate::context::AppContext;
use crate::output::{OutputMode, kv, render, render_success};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Email address to log in with.
    pub email: String,

    /// Display name. Defaults to the part of the email before '@'.
    #[arg(long)]
    pub name: Option<String>,

    /// Role to assume: citizen, politician, moderator, admin.
    #[arg(long, default_value = "citizen")]
    pub role: Role,
}

fn render_session(output: OutputMode, session: &Session) -> Result<()> {
    render(output, session, |session, w| {
        kv(w, "id", session.id.to_string())?;
        kv(w, "name", &session.name)?;
        kv(w, "email", &session.email)?;
        kv(w, "role", session.role.as_str())
    })
}

pub fn run_login(args: &LoginArgs, output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let session = ctx
        .sessions()
        .login(&args.email, args.name.as_deref(), args.role)?;
    tracing::info!(id = session.id, role = %session.role, "logged in");
    render_session(output, &session)
}

pub fn run_logout(output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    ctx.sessions().logout()?;
    render_success(output, "Logged out")
}

pub fn run_whoami(output: OutputMode, cwd: &Path) -> Result<()> {
    let ctx = AppContext::load(cwd)?;
    let session = ctx.sessions().current().ok_or(Error::Auth)?;
    render_session(output, &session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_args_default_to_citizen() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: LoginArgs,
        }
        let w = Wrapper::parse_from(["test", "ada@example.com"]);
        assert_eq!(w.args.email, "ada@example.com");
        assert!(w.args.name.is_none());
        assert_eq!(w.args.role, Role::Citizen);
    }

    #[test]
    fn login_args_accept_role_override() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: LoginArgs,
        }
        let w = Wrapper::parse_from(["test", "rep@example.com", "--role", "politician"]);
        assert_eq!(w.args.role, Role::Politician);
    }
}
