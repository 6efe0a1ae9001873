//! Thread-safe handle around a [`MessageRelay`].

use crate::errors::Result;
use crate::events::RelayEvent;
use crate::relay::MessageRelay;
use crate::state::RelayState;
use parking_lot::RwLock;
use relay_types::{Address, Message};
use std::sync::Arc;

/// Clonable handle that serialises mutations through a write lock.
///
/// Each operation holds the lock for its whole duration, so readers never
/// observe a half-applied mutation.
#[derive(Debug, Clone, Default)]
pub struct SharedMessageRelay {
    inner: Arc<RwLock<MessageRelay>>,
}

impl SharedMessageRelay {
    pub fn new(relay: MessageRelay) -> Self {
        Self {
            inner: Arc::new(RwLock::new(relay)),
        }
    }

    pub fn add_user(&self, caller: &Address, username: &str, public_key: &str) -> Result<RelayEvent> {
        self.inner.write().add_user(caller, username, public_key)
    }

    pub fn change_user_public_key(&self, caller: &Address, new_public_key: &str) -> Result<RelayEvent> {
        self.inner
            .write()
            .change_user_public_key(caller, new_public_key)
    }

    pub fn get_username(&self, caller: &Address) -> Result<String> {
        self.inner.read().get_username(caller).map(str::to_owned)
    }

    pub fn get_public_key(&self, username: &str) -> Result<String> {
        self.inner.read().get_public_key(username).map(str::to_owned)
    }

    pub fn send_message(
        &self,
        caller: &Address,
        receiver_username: &str,
        content: &str,
    ) -> Result<RelayEvent> {
        self.inner
            .write()
            .send_message(caller, receiver_username, content)
    }

    pub fn has_message_from(&self, caller: &Address, sender_username: &str) -> bool {
        self.inner.read().has_message_from(caller, sender_username)
    }

    pub fn has_message_to(&self, caller: &Address, receiver_username: &str) -> bool {
        self.inner.read().has_message_to(caller, receiver_username)
    }

    pub fn get_message(&self, caller: &Address, sender_username: &str) -> Result<Message> {
        self.inner
            .read()
            .get_message(caller, sender_username)
            .cloned()
    }

    pub fn delete_message_from(&self, caller: &Address, sender_username: &str) -> Result<RelayEvent> {
        self.inner
            .write()
            .delete_message_from(caller, sender_username)
    }

    pub fn drain_events(&self) -> Vec<RelayEvent> {
        self.inner.write().drain_events()
    }

    pub fn snapshot(&self) -> RelayState {
        self.inner.read().snapshot()
    }
}
