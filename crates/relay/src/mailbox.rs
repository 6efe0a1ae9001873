//! Single-slot mailbox keyed by (sender username, receiver account).

use crate::errors::*;
use crate::registry::Registry;
use relay_types::{Address, Message};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of one mailbox slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub sender_username: String,
    pub receiver: Address,
}

impl SlotKey {
    pub fn new(sender_username: impl Into<String>, receiver: Address) -> Self {
        Self {
            sender_username: sender_username.into(),
            receiver,
        }
    }
}

/// Check that `content` is between 1 and `max_len` characters.
pub fn validate_content(content: &str, max_len: usize) -> Result<()> {
    let len = content.chars().count();
    if len == 0 || len > max_len {
        return Err(RelayError::InvalidMessage { len, max: max_len });
    }
    Ok(())
}

/// Pending messages. Each slot is either empty or holds exactly one message.
#[derive(Debug, Default, Clone)]
pub struct Mailbox {
    slots: HashMap<SlotKey, Message>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` from `caller` for the holder of `receiver_username`.
    ///
    /// Replaces any message still pending in the same slot and returns it.
    pub fn send(
        &mut self,
        registry: &Registry,
        caller: &Address,
        receiver_username: &str,
        content: &str,
        max_len: usize,
    ) -> Result<Option<Message>> {
        validate_content(content, max_len)?;
        let receiver = registry.account_of(receiver_username)?;
        let sender_username = registry.username_of(caller)?;

        let key = SlotKey::new(sender_username, receiver);
        Ok(self.slots.insert(key, Message::new(content)))
    }

    /// Whether `sender_username` has a message pending for `caller`.
    pub fn has_message_from(&self, caller: &Address, sender_username: &str) -> bool {
        self.slots
            .contains_key(&SlotKey::new(sender_username, *caller))
    }

    /// Whether `caller` has a message pending for the holder of
    /// `receiver_username`. Unknown accounts on either side read as `false`.
    pub fn has_message_to(
        &self,
        registry: &Registry,
        caller: &Address,
        receiver_username: &str,
    ) -> bool {
        let (Ok(sender_username), Ok(receiver)) = (
            registry.username_of(caller),
            registry.account_of(receiver_username),
        ) else {
            return false;
        };
        self.slots
            .contains_key(&SlotKey::new(sender_username, receiver))
    }

    /// The message `sender_username` left for `caller`.
    pub fn get(&self, caller: &Address, sender_username: &str) -> Result<&Message> {
        self.slots
            .get(&SlotKey::new(sender_username, *caller))
            .ok_or_else(|| no_message(caller, sender_username))
    }

    /// Clear the slot holding the message `sender_username` left for `caller`.
    pub fn delete(&mut self, caller: &Address, sender_username: &str) -> Result<Message> {
        self.slots
            .remove(&SlotKey::new(sender_username, *caller))
            .ok_or_else(|| no_message(caller, sender_username))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All pending messages, ordered by slot key.
    pub fn entries(&self) -> Vec<(SlotKey, Message)> {
        let mut entries: Vec<(SlotKey, Message)> = self
            .slots
            .iter()
            .map(|(key, message)| (key.clone(), message.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub(crate) fn insert_slot(&mut self, key: SlotKey, message: Message) -> Option<Message> {
        self.slots.insert(key, message)
    }
}

fn no_message(caller: &Address, sender_username: &str) -> RelayError {
    RelayError::NoMessage {
        sender_username: sender_username.to_string(),
        receiver: *caller,
    }
}
