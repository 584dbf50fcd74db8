//! Participant identity
//!
//! Every chat participant is identified by a pair of ids: the chat-scoped id
//! and the global (gaia) account id. Two records describe the same person only
//! when both halves match exactly.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Separator used by the textual `chat_id:gaia_id` form
const SEPARATOR: char = ':';

/// Composite identity of a chat user, used as the registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId {
    /// Chat-scoped identifier
    pub chat_id: CompactString,
    /// Global account identifier
    pub gaia_id: CompactString,
}

/// Errors that can occur when parsing a textual user id
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum IdError {
    #[error("Invalid user ID format: {0}")]
    #[diagnostic(
        code(roster_core::id::missing_separator),
        help("User IDs must be written as 'chat_id:gaia_id'")
    )]
    MissingSeparator(String),

    #[error("Invalid user ID: {field} is empty in '{input}'")]
    #[diagnostic(
        code(roster_core::id::empty_component),
        help("Both halves of a user ID must be non-empty")
    )]
    EmptyComponent { field: &'static str, input: String },
}

impl UserId {
    pub fn new(chat_id: impl Into<CompactString>, gaia_id: impl Into<CompactString>) -> Self {
        Self {
            chat_id: chat_id.into(),
            gaia_id: gaia_id.into(),
        }
    }

    /// Parse an id written as `chat_id:gaia_id`
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let (chat_id, gaia_id) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| IdError::MissingSeparator(s.to_string()))?;

        if gaia_id.contains(SEPARATOR) {
            return Err(IdError::MissingSeparator(s.to_string()));
        }
        if chat_id.is_empty() {
            return Err(IdError::EmptyComponent {
                field: "chat_id",
                input: s.to_string(),
            });
        }
        if gaia_id.is_empty() {
            return Err(IdError::EmptyComponent {
                field: "gaia_id",
                input: s.to_string(),
            });
        }

        Ok(Self::new(chat_id, gaia_id))
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.chat_id, SEPARATOR, self.gaia_id)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.to_string()
    }
}
