use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A public progress update posted by a politician.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub politician_id: u64,
    pub politician_name: String,
    pub created_at: DateTime<Utc>,
    pub likes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDraft {
    pub title: String,
    pub content: String,
}

impl UpdateDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("update title is required".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(Error::Validation("update content is required".to_string()));
        }
        Ok(())
    }
}
