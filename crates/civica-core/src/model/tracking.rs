use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::{Person, Role};

/// A held assignment slot: who, and since when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub id: u64,
    pub name: String,
    pub role: Role,
    pub assigned_at: DateTime<Utc>,
}

impl Assignee {
    #[must_use]
    pub fn new(person: &Person, assigned_at: DateTime<Utc>) -> Self {
        Self {
            id: person.id,
            name: person.name.clone(),
            role: person.role,
            assigned_at,
        }
    }
}

/// One entry in an issue's ordered status-note log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusNote {
    pub note: String,
    pub updated_by: Person,
    pub timestamp: DateTime<Utc>,
}

/// The in-charge/assigned-to/notes ledger entry for one issue.
///
/// Lives independently of the issue's own status: at most one active
/// holder per slot, and assigning a new holder overwrites, never appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_charge: Option<Assignee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Assignee>,
    #[serde(default)]
    pub status_updates: Vec<StatusNote>,
    pub last_updated: DateTime<Utc>,
}

impl AssignmentRecord {
    /// A fresh record with both slots empty.
    #[must_use]
    pub const fn empty(last_updated: DateTime<Utc>) -> Self {
        Self {
            in_charge: None,
            assigned_to: None,
            status_updates: Vec::new(),
            last_updated,
        }
    }
}
