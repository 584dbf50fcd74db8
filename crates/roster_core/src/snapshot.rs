//! JSON fixtures for seeding and replaying a user list
//!
//! A snapshot holds the records available at login; updates are stored one
//! JSON [`StateUpdate`] per line.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::feed::StateUpdateSource;
use crate::protocol::{ConversationParticipantData, Entity, StateUpdate};
use crate::user_list::UserList;
use crate::{Result, RosterError};

/// Records available when a chat session starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub self_entity: Entity,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub conv_parts: Vec<ConversationParticipantData>,
}

impl RosterSnapshot {
    pub fn from_json(path: &str, content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| RosterError::FixtureError {
            path: path.to_string(),
            line: None,
            expected: "a snapshot object with self_entity, entities and conv_parts".to_string(),
            cause: e,
        })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RosterError::io(path, e))?;
        Self::from_json(&path.display().to_string(), &content)
    }

    /// Build a user list from this snapshot, observing `source`
    pub fn build<S>(&self, source: &S) -> UserList
    where
        S: StateUpdateSource + ?Sized,
    {
        UserList::new(source, &self.self_entity, &self.entities, &self.conv_parts)
    }
}

/// Parse JSON-lines state updates, skipping blank lines
pub fn parse_updates(path: &str, content: &str) -> Result<Vec<StateUpdate>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| RosterError::FixtureError {
                path: path.to_string(),
                line: Some(idx + 1),
                expected: "one JSON state update per line".to_string(),
                cause: e,
            })
        })
        .collect()
}

pub async fn load_updates(path: &Path) -> Result<Vec<StateUpdate>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RosterError::io(path, e))?;
    parse_updates(&path.display().to_string(), &content)
}
