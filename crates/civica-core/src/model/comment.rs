use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::issue::IssueId;
use super::user::Role;
use crate::error::{Error, Result};

/// A comment on an issue. Append-only; no edit or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub issue_id: IssueId,
    pub author: String,
    pub author_role: Role,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// The body a participant submits; author identity comes from the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDraft {
    pub body: String,
}

impl CommentDraft {
    pub fn validate(&self) -> Result<()> {
        if self.body.trim().is_empty() {
            return Err(Error::Validation("comment body is required".to_string()));
        }
        Ok(())
    }
}
