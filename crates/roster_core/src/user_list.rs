//! Registry of every user seen during a chat session
//!
//! The list is seeded from the directory entities and conversation
//! participants available at login, then kept current by observing state
//! updates. Users are never removed; their names only ever improve (see
//! [`User::upgrade_name`]).

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{RwLock, RwLockReadGuard};

use crate::feed::{StateUpdateObserver, StateUpdateSource, Subscription};
use crate::id::UserId;
use crate::protocol::{Conversation, ConversationParticipantData, Entity, StateUpdate};
use crate::user::User;

type SharedUser = Arc<RwLock<User>>;

fn shared(user: User) -> SharedUser {
    Arc::new(RwLock::new(user))
}

/// A user returned by [`UserList`] lookups.
///
/// A registered handle shares the record stored in the registry, so name
/// upgrades delivered after the lookup show through handles already held.
/// Holding a handle never blocks update delivery; only the guard returned by
/// [`UserHandle::read`] locks the record.
#[derive(Clone)]
pub enum UserHandle {
    /// A user stored in the registry
    Registered(SharedUser),
    /// A placeholder for an id the registry has never seen
    Unregistered(User),
}

impl UserHandle {
    pub fn is_registered(&self) -> bool {
        matches!(self, UserHandle::Registered(_))
    }

    /// Borrow the current state of the user
    pub fn read(&self) -> UserRef<'_> {
        match self {
            UserHandle::Registered(user) => UserRef::Shared(user.read()),
            UserHandle::Unregistered(user) => UserRef::Owned(user),
        }
    }

    /// Copy of the current state of the user
    pub fn to_user(&self) -> User {
        User::clone(&self.read())
    }
}

impl fmt::Debug for UserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserHandle")
            .field("registered", &self.is_registered())
            .field("user", &*self.read())
            .finish()
    }
}

/// Read guard over a [`UserHandle`]
pub enum UserRef<'a> {
    Shared(RwLockReadGuard<'a, User>),
    Owned(&'a User),
}

impl Deref for UserRef<'_> {
    type Target = User;

    fn deref(&self) -> &User {
        match self {
            UserRef::Shared(guard) => &**guard,
            UserRef::Owned(user) => *user,
        }
    }
}

/// Shared state between the list and its state update observer
#[derive(Debug)]
struct Registry {
    self_user_id: UserId,
    users: DashMap<UserId, SharedUser>,
}

impl Registry {
    fn add_user_from_conv_part(&self, data: &ConversationParticipantData) -> UserHandle {
        let candidate = User::from_conv_part_data(data, Some(&self.self_user_id));

        let user = match self.users.entry(candidate.id().clone()) {
            Entry::Occupied(existing) => {
                existing.get().write().upgrade_name(&candidate);
                Arc::clone(existing.get())
            }
            Entry::Vacant(vacant) => {
                tracing::warn!(
                    "Adding fallback User with {} name \"{}\": {}",
                    candidate.name_type,
                    candidate.full_name,
                    candidate.id()
                );
                let user = shared(candidate);
                vacant.insert(Arc::clone(&user));
                user
            }
        };

        UserHandle::Registered(user)
    }

    fn handle_conversation(&self, conversation: &Conversation) {
        tracing::debug!(
            "Updating users from conversation {} ({} participant(s))",
            conversation.conversation_id,
            conversation.participant_data.len()
        );
        for participant in &conversation.participant_data {
            self.add_user_from_conv_part(participant);
        }
    }
}

impl StateUpdateObserver for Registry {
    fn on_state_update(&self, update: &StateUpdate) {
        if let Some(conversation) = &update.conversation {
            self.handle_conversation(conversation);
        }
    }
}

/// Collection of the users known to this chat session
pub struct UserList {
    registry: Arc<Registry>,
    _subscription: Subscription,
}

impl UserList {
    /// Build the list and start observing `source`.
    ///
    /// Entities are authoritative and replace whatever is stored for their
    /// id. Conversation participants are only a fallback: they add users no
    /// entity described, or upgrade the name of an existing one.
    pub fn new<S>(
        source: &S,
        self_entity: &Entity,
        entities: &[Entity],
        conv_parts: &[ConversationParticipantData],
    ) -> Self
    where
        S: StateUpdateSource + ?Sized,
    {
        let self_user = User::from_entity(self_entity, None);
        let self_user_id = self_user.id().clone();

        let users = DashMap::new();
        users.insert(self_user_id.clone(), shared(self_user));

        for entity in entities {
            let user = User::from_entity(entity, Some(&self_user_id));
            users.insert(user.id().clone(), shared(user));
        }

        let registry = Arc::new(Registry {
            self_user_id,
            users,
        });

        for participant in conv_parts {
            registry.add_user_from_conv_part(participant);
        }

        tracing::info!(
            "UserList initialized with {} user(s)",
            registry.users.len()
        );

        let observer: Arc<dyn StateUpdateObserver> = registry.clone();
        let subscription = source.add_observer(observer);

        Self {
            registry,
            _subscription: subscription,
        }
    }

    /// Look up a user.
    ///
    /// Never fails: an id the registry has not seen yields a placeholder
    /// named [`crate::user::DEFAULT_NAME`], which is not stored.
    pub fn get(&self, user_id: &UserId) -> UserHandle {
        let found = self
            .registry
            .users
            .get(user_id)
            .map(|entry| Arc::clone(entry.value()));

        match found {
            Some(user) => UserHandle::Registered(user),
            None => {
                tracing::warn!("UserList returning unknown User for UserID {}", user_id);
                UserHandle::Unregistered(User::unknown(user_id.clone()))
            }
        }
    }

    /// Snapshot of every known user, in no particular order
    pub fn all(&self) -> Vec<User> {
        self.registry
            .users
            .iter()
            .map(|entry| entry.value().read().clone())
            .collect()
    }

    /// Add a user from a conversation participant, or upgrade the name of
    /// the existing user with that id.
    pub fn add_user_from_conv_part(&self, data: &ConversationParticipantData) -> UserHandle {
        self.registry.add_user_from_conv_part(data)
    }

    /// The account this session is logged in as
    pub fn self_user(&self) -> UserHandle {
        self.get(&self.registry.self_user_id)
    }

    pub fn self_user_id(&self) -> &UserId {
        &self.registry.self_user_id
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.registry.users.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.registry.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.users.is_empty()
    }
}

impl fmt::Debug for UserList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserList")
            .field("self_user_id", &self.registry.self_user_id)
            .field("users", &self.registry.users.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::StateUpdateHub;
    use crate::protocol::ParticipantId;
    use crate::user::{DEFAULT_NAME, NameType};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn pid(n: &str) -> ParticipantId {
        ParticipantId::new(n, n)
    }

    fn uid(n: &str) -> UserId {
        UserId::new(n, n)
    }

    fn part(n: &str, fallback: Option<&str>) -> ConversationParticipantData {
        ConversationParticipantData::new(pid(n), fallback.map(str::to_string))
    }

    fn self_entity() -> Entity {
        Entity::new(pid("self")).with_display_name("Self Person")
    }

    #[test]
    fn test_construction_registers_self_and_entities() {
        let hub = StateUpdateHub::new();
        let entities = vec![
            Entity::new(pid("a")).with_display_name("Alice Example"),
            Entity::new(pid("b")).with_display_name("+15550001111"),
        ];
        let list = UserList::new(&hub, &self_entity(), &entities, &[]);

        assert_eq!(list.len(), 3);
        assert_eq!(list.self_user_id(), &uid("self"));
        assert!(list.self_user().read().is_self);
        assert_eq!(list.get(&uid("a")).read().first_name, "Alice");
        assert_eq!(list.get(&uid("b")).read().name_type, NameType::Numeric);

        let selves: Vec<_> = list.all().into_iter().filter(|u| u.is_self).collect();
        assert_eq!(selves.len(), 1);
        assert_eq!(selves[0].id(), &uid("self"));
    }

    #[test]
    fn test_entity_for_self_id_stays_self() {
        let hub = StateUpdateHub::new();
        let entities = vec![Entity::new(pid("self")).with_display_name("Renamed Self")];
        let list = UserList::new(&hub, &self_entity(), &entities, &[]);

        assert_eq!(list.len(), 1);
        let me = list.self_user().to_user();
        assert!(me.is_self);
        assert_eq!(me.full_name, "Renamed Self");
    }

    #[test]
    fn test_fallback_never_downgrades_entity() {
        let hub = StateUpdateHub::new();
        let entities = vec![Entity::new(pid("a")).with_display_name("Alice Example")];
        let parts = vec![part("a", Some("+15550001111")), part("a", None)];
        let list = UserList::new(&hub, &self_entity(), &entities, &parts);

        let alice = list.get(&uid("a")).to_user();
        assert_eq!(alice.full_name, "Alice Example");
        assert_eq!(alice.name_type, NameType::Real);
    }

    #[test]
    fn test_fallback_upgrades_nameless_entity() {
        let hub = StateUpdateHub::new();
        let entities = vec![Entity::new(pid("a")).with_photo_url("https://example.com/a.png")];
        let parts = vec![part("a", Some("+15550001111"))];
        let list = UserList::new(&hub, &self_entity(), &entities, &parts);

        let a = list.get(&uid("a")).to_user();
        assert_eq!(a.name_type, NameType::Numeric);
        assert_eq!(a.full_name, "+15550001111");
        assert_eq!(a.photo_url.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    #[traced_test]
    fn test_add_unseen_participant() {
        let hub = StateUpdateHub::new();
        let list = UserList::new(&hub, &self_entity(), &[], &[]);

        let added = list.add_user_from_conv_part(&part("x", Some("+12125551212")));
        assert!(added.is_registered());
        assert_eq!(added.read().name_type, NameType::Numeric);
        assert!(!added.read().is_self);

        assert_eq!(list.len(), 2);
        assert!(logs_contain("Adding fallback User with numeric name"));
    }

    #[test]
    fn test_add_returns_existing_user_after_upgrade() {
        let hub = StateUpdateHub::new();
        let list = UserList::new(&hub, &self_entity(), &[], &[part("x", None)]);

        let upgraded = list.add_user_from_conv_part(&part("x", Some("Xavier Doe")));
        assert_eq!(upgraded.read().full_name, "Xavier Doe");
        assert_eq!(upgraded.read().first_name, "Xavier");

        assert_eq!(list.len(), 2);
    }

    #[test]
    #[traced_test]
    fn test_get_unknown_is_placeholder() {
        let hub = StateUpdateHub::new();
        let list = UserList::new(&hub, &self_entity(), &[], &[]);

        let ghost = list.get(&uid("ghost"));
        assert!(!ghost.is_registered());
        assert_eq!(ghost.read().full_name, DEFAULT_NAME);
        assert!(!ghost.read().is_self);

        assert_eq!(list.len(), 1);
        assert!(!list.contains(&uid("ghost")));
        assert!(logs_contain("UserList returning unknown User"));
    }

    #[test]
    fn test_state_updates_add_and_upgrade() {
        let hub = StateUpdateHub::new();
        let list = UserList::new(&hub, &self_entity(), &[], &[]);

        hub.fire(&StateUpdate::conversation(
            "conv-1",
            vec![part("x", Some("+12125551212"))],
        ));
        assert_eq!(list.get(&uid("x")).read().name_type, NameType::Numeric);

        hub.fire(&StateUpdate::conversation("conv-1", vec![part("x", Some(""))]));
        assert_eq!(list.get(&uid("x")).read().full_name, "+12125551212");

        hub.fire(&StateUpdate::conversation(
            "conv-1",
            vec![part("x", Some("Xavier Doe")), part("y", None)],
        ));
        assert_eq!(list.get(&uid("x")).read().name_type, NameType::Real);
        assert_eq!(list.get(&uid("y")).read().name_type, NameType::Default);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_updates_without_conversation_are_ignored() {
        let hub = StateUpdateHub::new();
        let list = UserList::new(&hub, &self_entity(), &[], &[]);

        hub.fire(&StateUpdate::default());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_participant_update_for_self_keeps_self_flag() {
        let hub = StateUpdateHub::new();
        let list = UserList::new(&hub, &self_entity(), &[], &[]);

        hub.fire(&StateUpdate::conversation("conv", vec![part("self", None)]));
        let me = list.self_user();
        assert!(me.read().is_self);
        assert_eq!(me.read().full_name, "Self Person");
    }

    #[test]
    fn test_held_handles_see_later_upgrades() {
        let hub = StateUpdateHub::new();
        let list = UserList::new(&hub, &self_entity(), &[], &[part("x", Some("+12125551212"))]);

        let me = list.self_user();
        let x = list.get(&uid("x"));
        assert_eq!(x.read().name_type, NameType::Numeric);

        hub.fire(&StateUpdate::conversation(
            "conv",
            vec![part("self", None), part("x", Some("Xavier Doe"))],
        ));

        assert_eq!(x.read().full_name, "Xavier Doe");
        assert_eq!(x.read().name_type, NameType::Real);
        assert_eq!(me.read().full_name, "Self Person");
        assert_eq!(x.to_user(), list.get(&uid("x")).to_user());
    }

    #[test]
    fn test_placeholder_handle_is_not_updated() {
        let hub = StateUpdateHub::new();
        let list = UserList::new(&hub, &self_entity(), &[], &[]);

        let ghost = list.get(&uid("ghost"));
        hub.fire(&StateUpdate::conversation(
            "conv",
            vec![part("ghost", Some("Gus Host"))],
        ));

        assert!(!ghost.is_registered());
        assert_eq!(ghost.read().name_type, NameType::Default);
        assert_eq!(list.get(&uid("ghost")).read().full_name, "Gus Host");
    }

    #[test]
    fn test_drop_releases_subscription() {
        let hub = StateUpdateHub::new();
        let list = UserList::new(&hub, &self_entity(), &[], &[]);
        assert_eq!(hub.observer_count(), 1);

        drop(list);
        assert_eq!(hub.observer_count(), 0);
        hub.fire(&StateUpdate::conversation("conv", vec![part("x", None)]));
    }
}
