//! Records delivered by the chat protocol client
//!
//! These mirror the shapes the network layer hands over: directory entities
//! with rich profile data, per-conversation participant records that only
//! carry a fallback name, and the state updates pushed by the server.

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Identity pair as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantId {
    pub chat_id: String,
    pub gaia_id: String,
}

impl ParticipantId {
    pub fn new(chat_id: impl Into<String>, gaia_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            gaia_id: gaia_id.into(),
        }
    }
}

impl From<&ParticipantId> for UserId {
    fn from(id: &ParticipantId) -> Self {
        UserId::new(id.chat_id.as_str(), id.gaia_id.as_str())
    }
}

/// Profile fields of a directory entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
}

/// A directory record describing a known user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: ParticipantId,
    #[serde(default)]
    pub properties: EntityProperties,
}

impl Entity {
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            properties: EntityProperties::default(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.properties.display_name = Some(name.into());
        self
    }

    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.properties.first_name = Some(name.into());
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.properties.photo_url = Some(url.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.properties.emails.push(email.into());
        self
    }
}

/// Participant record attached to a conversation
///
/// Only the identity and a fallback display name are available here, so
/// these are used when no directory entity exists for the participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationParticipantData {
    pub id: ParticipantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_name: Option<String>,
}

impl ConversationParticipantData {
    pub fn new(id: ParticipantId, fallback_name: Option<String>) -> Self {
        Self { id, fallback_name }
    }
}

/// Conversation payload carried by a state update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub participant_data: Vec<ConversationParticipantData>,
}

/// Server-pushed state notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
}

impl StateUpdate {
    /// An update carrying a conversation payload
    pub fn conversation(
        conversation_id: impl Into<String>,
        participant_data: Vec<ConversationParticipantData>,
    ) -> Self {
        Self {
            conversation: Some(Conversation {
                conversation_id: conversation_id.into(),
                participant_data,
            }),
        }
    }
}
