use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::UserId;
use crate::protocol::{ConversationParticipantData, Entity};

/// Name shown for users nothing is known about
pub const DEFAULT_NAME: &str = "Unknown";

/// Confidence tier of a resolved display name
///
/// Ordered so that a later, better name can replace an earlier one:
/// `Default < Numeric < Real`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameType {
    /// No usable name, showing [`DEFAULT_NAME`]
    Default = 0,
    /// A name without letters, usually a phone number
    Numeric = 1,
    /// A real human name
    Real = 2,
}

impl fmt::Display for NameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameType::Default => write!(f, "default"),
            NameType::Numeric => write!(f, "numeric"),
            NameType::Real => write!(f, "real"),
        }
    }
}

/// A chat participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,

    /// Best known display name, never empty
    pub full_name: String,

    /// Short form of the name, never empty
    pub first_name: String,

    pub name_type: NameType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[serde(default)]
    pub emails: Vec<String>,

    /// Whether this is the account the client is logged in as
    pub is_self: bool,
}

impl User {
    /// Create a user, resolving the display name from whatever is available.
    ///
    /// A missing or empty `full_name` yields [`DEFAULT_NAME`]. A name without
    /// any alphabetic character (identity services fill in phone numbers
    /// before a real name is known) is kept verbatim as both names. Anything
    /// else is a real name, and `first_name` falls back to its first word.
    pub fn new(
        id: UserId,
        full_name: Option<&str>,
        first_name: Option<&str>,
        photo_url: Option<String>,
        emails: Vec<String>,
        is_self: bool,
    ) -> Self {
        let (full_name, first_name, name_type) = match full_name.filter(|n| !n.is_empty()) {
            None => (
                DEFAULT_NAME.to_string(),
                DEFAULT_NAME.to_string(),
                NameType::Default,
            ),
            Some(name) if !name.chars().any(char::is_alphabetic) => {
                (name.to_string(), name.to_string(), NameType::Numeric)
            }
            Some(name) => {
                let first = first_name
                    .filter(|n| !n.is_empty())
                    .or_else(|| name.split_whitespace().next())
                    .unwrap_or(name);
                (name.to_string(), first.to_string(), NameType::Real)
            }
        };

        Self {
            id,
            full_name,
            first_name,
            name_type,
            photo_url,
            emails,
            is_self,
        }
    }

    /// Placeholder for an id that was never registered
    pub fn unknown(id: UserId) -> Self {
        Self::new(id, None, None, None, Vec::new(), false)
    }

    /// Build a user from a directory entity.
    ///
    /// `self_user_id` of `None` means the entity describes the self user.
    pub fn from_entity(entity: &Entity, self_user_id: Option<&UserId>) -> Self {
        let id = UserId::from(&entity.id);
        let is_self = is_self(&id, self_user_id);
        let props = &entity.properties;

        Self::new(
            id,
            props.display_name.as_deref(),
            props.first_name.as_deref(),
            props.photo_url.clone(),
            props.emails.clone(),
            is_self,
        )
    }

    /// Build a user from a conversation participant record.
    ///
    /// `self_user_id` of `None` means the record describes the self user.
    pub fn from_conv_part_data(
        data: &ConversationParticipantData,
        self_user_id: Option<&UserId>,
    ) -> Self {
        let id = UserId::from(&data.id);
        let is_self = is_self(&id, self_user_id);

        Self::new(
            id,
            data.fallback_name.as_deref(),
            None,
            None,
            Vec::new(),
            is_self,
        )
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Take the other user's name if it is of a strictly better tier.
    ///
    /// Returns whether the name changed. Identity, photo, emails and the self
    /// flag are never touched.
    pub fn upgrade_name(&mut self, other: &User) -> bool {
        if other.name_type <= self.name_type {
            return false;
        }

        self.full_name = other.full_name.clone();
        self.first_name = other.first_name.clone();
        self.name_type = other.name_type;
        tracing::debug!(
            "Added {} name to User \"{}\": {}",
            self.name_type,
            self.full_name,
            self.id
        );
        true
    }
}

fn is_self(id: &UserId, self_user_id: Option<&UserId>) -> bool {
    self_user_id.is_none_or(|self_id| self_id == id)
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name, self.id)
    }
}
