//! Command handlers for the `civ` CLI.

pub mod assign;
pub mod clear;
pub mod comment;
pub mod init;
pub mod list;
pub mod note;
pub mod report;
pub mod session;
pub mod show;
pub mod status;
pub mod updates;
pub mod users;
pub mod watch;
