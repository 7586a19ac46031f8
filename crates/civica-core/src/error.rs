use thiserror::Error;

use crate::model::Role;

/// Error taxonomy for all civica-core operations.
///
/// Every variant carries a stable machine code (`E####`) so CLI output and
/// agents can branch on failures without string matching.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure, timeout, or a remote error response.
    #[error("network error: {0}")]
    Network(String),

    /// Remote or local resource absent.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Required field missing or malformed on create/comment.
    #[error("validation error: {0}")]
    Validation(String),

    /// Local persistence read/write failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Expired or invalid session; the caller must force a re-login.
    #[error("session expired or invalid")]
    Auth,

    /// The actor's role does not permit this operation.
    #[error("role '{role}' may not {action}")]
    Forbidden { role: Role, action: &'static str },
}

impl Error {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E1001",
            Self::NotFound { .. } => "E2001",
            Self::Forbidden { .. } => "E2002",
            Self::Network(_) => "E3001",
            Self::Auth => "E3002",
            Self::Storage(_) => "E5001",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Validation(_) | Self::NotFound { .. } => None,
            Self::Forbidden { .. } => {
                Some("Only politician, moderator, or admin roles may perform this.")
            }
            Self::Network(_) => Some("Check connectivity and retry the command."),
            Self::Auth => Some("Run `civ login` to start a new session."),
            Self::Storage(_) => Some("Check permissions on the .civica directory."),
        }
    }
}

/// A specialized Result type for civica-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::model::Role;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            Error::Network("down".to_string()),
            Error::NotFound {
                kind: "issue",
                id: "42".to_string(),
            },
            Error::Validation("title is required".to_string()),
            Error::Storage("disk full".to_string()),
            Error::Auth,
            Error::Forbidden {
                role: Role::Citizen,
                action: "update issue status",
            },
        ];

        let mut seen = HashSet::new();
        for err in &all {
            assert!(seen.insert(err.code()), "duplicate code {}", err.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = Error::Auth.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn forbidden_names_the_role_and_action() {
        let err = Error::Forbidden {
            role: Role::Citizen,
            action: "update issue status",
        };
        assert_eq!(err.to_string(), "role 'citizen' may not update issue status");
    }
}
