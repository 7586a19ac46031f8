//! Domain records: issues, comments, users, politician updates, and the
//! assignment-tracking shapes persisted per issue.

mod comment;
mod issue;
mod tracking;
mod update;
mod user;

pub use comment::{Comment, CommentDraft};
pub use issue::{Category, Issue, IssueDraft, IssueId, ParseEnumError, Status};
pub use tracking::{Assignee, AssignmentRecord, StatusNote};
pub use update::{Update, UpdateDraft};
pub use user::{Person, Role, Session, UserAccount};
