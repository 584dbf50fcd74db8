//! Roster Core - chat participant registry
//!
//! This crate keeps track of everyone a chat client has seen, resolving
//! incomplete identity data into one display name per user and refining it
//! as better data arrives through server state updates.

pub mod config;
pub mod error;
pub mod error_logging;
pub mod feed;
pub mod id;
pub mod protocol;
pub mod snapshot;
pub mod user;
pub mod user_list;

pub use error::{Result, RosterError};
pub use feed::{StateUpdateHub, StateUpdateObserver, StateUpdateSource, Subscription};
pub use id::{IdError, UserId};
pub use protocol::{
    Conversation, ConversationParticipantData, Entity, EntityProperties, ParticipantId,
    StateUpdate,
};
pub use user::{DEFAULT_NAME, NameType, User};
pub use user_list::{UserHandle, UserList, UserRef};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        ConversationParticipantData, Entity, NameType, ParticipantId, Result, RosterError,
        StateUpdate, StateUpdateHub, StateUpdateSource, User, UserHandle, UserId, UserList,
    };
}
