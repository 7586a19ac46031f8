use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::issue::{ParseEnumError, normalize};

/// The four participant roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Politician,
    Moderator,
    Admin,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Citizen, Self::Politician, Self::Moderator, Self::Admin];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Politician => "politician",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// The single decision point for status transitions: citizens (and
    /// unauthenticated actors) may only read.
    #[must_use]
    pub const fn can_update_status(self) -> bool {
        match self {
            Self::Politician | Self::Moderator | Self::Admin => true,
            Self::Citizen => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "citizen" => Ok(Self::Citizen),
            "politician" => Ok(Self::Politician),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseEnumError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}

/// The logged-in user. Role is fixed at login and never re-derived from
/// server state; the token is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

impl Session {
    /// The session user as an assignable person.
    #[must_use]
    pub fn person(&self) -> Person {
        Person {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// An identity that can hold an assignment slot or author a status note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: u64,
    pub name: String,
    pub role: Role,
}

/// A user record from the remote store, as the admin dashboard sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub joined_at: DateTime<Utc>,
}
