use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// The three lifecycle states of an issue.
///
/// Transitions are unrestricted in direction (a resolved issue may be
/// reopened); who may transition is gated by [`Role::can_update_status`]
/// at the engine boundary, not here.
///
/// [`Role::can_update_status`]: crate::model::Role::can_update_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Resolved,
}

impl Status {
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Resolved];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }
}

/// Civic categories an issue may be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Infrastructure,
    Healthcare,
    Education,
    Environment,
    Transportation,
    #[serde(rename = "Public Safety")]
    PublicSafety,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Infrastructure,
        Self::Healthcare,
        Self::Education,
        Self::Environment,
        Self::Transportation,
        Self::PublicSafety,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Infrastructure => "Infrastructure",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Environment => "Environment",
            Self::Transportation => "Transportation",
            Self::PublicSafety => "Public Safety",
        }
    }
}

/// Issue identity. Remote issues use the backing store's numeric id;
/// locally filed issues live in the `local-` namespace so a merge can
/// never collide with a remote record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(String);

const LOCAL_PREFIX: &str = "local-";

impl IssueId {
    /// Identity of a remotely sourced issue.
    #[must_use]
    pub fn remote(id: u64) -> Self {
        Self(id.to_string())
    }

    /// Identity of a locally filed issue: `local-<millis>` with an
    /// optional disambiguating sequence.
    #[must_use]
    pub fn local(stamp_ms: i64, seq: u32) -> Self {
        if seq == 0 {
            Self(format!("{LOCAL_PREFIX}{stamp_ms}"))
        } else {
            Self(format!("{LOCAL_PREFIX}{stamp_ms}-{seq}"))
        }
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_PREFIX)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IssueId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A citizen-reported concern with a lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: Status,
    pub reporter_id: u64,
    pub reporter_name: String,
    pub created_at: DateTime<Utc>,
    pub upvotes: u32,
}

/// Fields a reporter supplies when filing an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
}

impl IssueDraft {
    /// Reject drafts with missing required fields.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(Error::Validation("description is required".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

pub(crate) fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(Self::Pending),
            "in-progress" | "in progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "infrastructure" => Ok(Self::Infrastructure),
            "healthcare" => Ok(Self::Healthcare),
            "education" => Ok(Self::Education),
            "environment" => Ok(Self::Environment),
            "transportation" => Ok(Self::Transportation),
            "public safety" | "public-safety" | "publicsafety" => Ok(Self::PublicSafety),
            _ => Err(ParseEnumError {
                expected: "category",
                got: s.to_string(),
            }),
        }
    }
}
