#![forbid(unsafe_code)]

mod cmd;
mod context;
mod output;

use clap::{Parser, Subcommand};
use context::AppContext;
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "civ: civic issue tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Project",
        about = "Initialize a civica project",
        long_about = "Initialize a civica project in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    civ init\n\n    # Emit machine-readable output\n    civ init --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Session",
        about = "Log in with an email and role",
        long_about = "Start a mock session. Any email is accepted; the role is fixed for the session.",
        after_help = "EXAMPLES:\n    # Log in as a citizen\n    civ login ada@example.com\n\n    # Log in as a moderator\n    civ login mod@example.com --role moderator"
    )]
    Login(cmd::session::LoginArgs),

    #[command(next_help_heading = "Session", about = "End the current session")]
    Logout,

    #[command(next_help_heading = "Session", about = "Show the current session")]
    Whoami,

    #[command(
        next_help_heading = "Issues",
        about = "File a new issue",
        long_about = "File a new issue into the local ledger. Citizens only.",
        after_help = "EXAMPLES:\n    civ report --title \"Pothole on 5th Ave\" --description \"Deep pothole near the crosswalk\" --category infrastructure"
    )]
    Report(cmd::report::ReportArgs),

    #[command(
        next_help_heading = "Issues",
        about = "List issues",
        long_about = "List the merged issue view: local ledger first, then remote issues.",
        after_help = "EXAMPLES:\n    # All issues\n    civ list\n\n    # Your own pending issues\n    civ list --mine --status pending"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Issues",
        about = "Show one issue",
        long_about = "Show full details for a single issue: fields, comments, and assignment record."
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Issues",
        about = "Move an issue to a new status",
        long_about = "Move an issue between pending, in-progress, and resolved. Politician, moderator, or admin sessions only.",
        after_help = "EXAMPLES:\n    civ status 42 in-progress\n\n    # Reopen a resolved issue\n    civ status 42 pending"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Issues",
        about = "Comment on an issue",
        long_about = "Append a comment to a remote issue."
    )]
    Comment(cmd::comment::CommentArgs),

    #[command(
        next_help_heading = "Assignment",
        about = "Claim or hand out an assignment slot",
        long_about = "Set an issue's \"assigned to\" slot (or \"in charge\" with --in-charge). Overwrites the current holder.",
        after_help = "EXAMPLES:\n    # Claim an issue yourself\n    civ assign 42\n\n    # Put someone else in charge\n    civ assign 42 --in-charge --user-id 7 --name \"A. Smith\""
    )]
    Assign(cmd::assign::AssignArgs),

    #[command(
        next_help_heading = "Assignment",
        about = "Release an assignment slot",
        long_about = "Clear an issue's \"assigned to\" slot (or \"in charge\" with --in-charge). No-op when the slot is empty."
    )]
    Unassign(cmd::assign::UnassignArgs),

    #[command(
        next_help_heading = "Assignment",
        about = "Add a status note to an issue"
    )]
    Note(cmd::note::NoteArgs),

    #[command(
        next_help_heading = "Assignment",
        about = "Delete every assignment record",
        long_about = "Administrative reset of the assignment tracking store. Admin sessions only."
    )]
    ClearTracking(cmd::clear::ClearTrackingArgs),

    #[command(
        next_help_heading = "Read",
        about = "Watch the merged dashboard",
        long_about = "Poll the merged issue view on a fixed cadence and print each snapshot.",
        after_help = "EXAMPLES:\n    # Refresh every 5 seconds (config default)\n    civ watch\n\n    # Three refreshes, two seconds apart\n    civ watch --interval 2 --ticks 3"
    )]
    Watch(cmd::watch::WatchArgs),

    #[command(
        next_help_heading = "Community",
        about = "List or post politician updates"
    )]
    Updates(cmd::updates::UpdatesArgs),

    #[command(
        next_help_heading = "Admin",
        about = "Administer user accounts",
        long_about = "List users, change roles, or delete accounts. Admin sessions only."
    )]
    Users(cmd::users::UsersArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CIVICA_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "civica=debug,civ=debug,info"
        } else {
            "civica=info,civ=info,warn"
        })
    });

    let format = env::var("CIVICA_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

/// Render a failure and apply the rejected-credential policy: an auth
/// failure drops the stored session so the next command starts from the
/// login boundary.
fn handle_failure(err: &anyhow::Error, output: OutputMode, cwd: &Path) {
    if let Some(domain) = err.downcast_ref::<civica_core::Error>() {
        if matches!(domain, civica_core::Error::Auth) {
            if let Ok(ctx) = AppContext::load(cwd) {
                ctx.clear_session();
            }
        }
        let error = match domain.hint() {
            Some(hint) => CliError::with_details(domain.to_string(), hint, domain.code()),
            None => CliError {
                message: domain.to_string(),
                suggestion: None,
                error_code: Some(domain.code().to_string()),
            },
        };
        let _ = render_error(output, &error);
    } else {
        let _ = render_error(output, &CliError::new(format!("{err:#}")));
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let cwd = std::env::current_dir()?;
    let output = cli.output_mode();

    let command_result = match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, output, &cwd),
        Commands::Login(ref args) => cmd::session::run_login(args, output, &cwd),
        Commands::Logout => cmd::session::run_logout(output, &cwd),
        Commands::Whoami => cmd::session::run_whoami(output, &cwd),
        Commands::Report(ref args) => cmd::report::run_report(args, output, &cwd),
        Commands::List(ref args) => cmd::list::run_list(args, output, &cwd),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &cwd),
        Commands::Status(ref args) => cmd::status::run_status(args, output, &cwd),
        Commands::Comment(ref args) => cmd::comment::run_comment(args, output, &cwd),
        Commands::Assign(ref args) => cmd::assign::run_assign(args, output, &cwd),
        Commands::Unassign(ref args) => cmd::assign::run_unassign(args, output, &cwd),
        Commands::Note(ref args) => cmd::note::run_note(args, output, &cwd),
        Commands::ClearTracking(ref args) => cmd::clear::run_clear_tracking(args, output, &cwd),
        Commands::Watch(ref args) => cmd::watch::run_watch(args, output, &cwd),
        Commands::Updates(ref args) => cmd::updates::run_updates(args, output, &cwd),
        Commands::Users(ref args) => cmd::users::run_users(args, output, &cwd),
    };

    if let Err(err) = command_result {
        handle_failure(&err, output, &cwd);
        std::process::exit(1);
    }
    Ok(())
}
