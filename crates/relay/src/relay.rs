//! Message relay state machine
//!
//! Combines the [`Registry`] and [`Mailbox`] behind the nine caller-scoped
//! operations and records the event emitted by every successful mutation.

use crate::config::{ConfigError, RelayConfig};
use crate::errors::*;
use crate::events::RelayEvent;
use crate::mailbox::{Mailbox, SlotKey};
use crate::registry::Registry;
use crate::state::{PendingMessage, RelayState, STATE_VERSION};
use relay_types::{Address, Message};
use tracing::{debug, info};

/// Registry + mailbox with an append-only event log.
#[derive(Debug, Clone, Default)]
pub struct MessageRelay {
    config: RelayConfig,
    registry: Registry,
    mailbox: Mailbox,
    events: Vec<RelayEvent>,
}

impl MessageRelay {
    /// Create an empty relay with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty relay with custom limits.
    pub fn with_config(config: RelayConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    /// Register `caller` under `username` with `public_key`.
    pub fn add_user(
        &mut self,
        caller: &Address,
        username: &str,
        public_key: &str,
    ) -> Result<RelayEvent> {
        self.registry
            .add_user(caller, username, public_key, &self.config)
            .map_err(|err| rejected("add_user", caller, err))?;

        info!(target: "relay", account = %caller, username, "User added");
        Ok(self.emit(RelayEvent::UserAdded { account: *caller }))
    }

    /// Replace the caller's public key.
    pub fn change_user_public_key(
        &mut self,
        caller: &Address,
        new_public_key: &str,
    ) -> Result<RelayEvent> {
        self.registry
            .change_public_key(caller, new_public_key)
            .map_err(|err| rejected("change_user_public_key", caller, err))?;

        info!(target: "relay", account = %caller, "Public key updated");
        Ok(self.emit(RelayEvent::PublicKeyUpdated { account: *caller }))
    }

    /// The caller's own username.
    pub fn get_username(&self, caller: &Address) -> Result<&str> {
        self.registry.username_of(caller)
    }

    /// The public key stored for `username`. Open to any caller.
    pub fn get_public_key(&self, username: &str) -> Result<&str> {
        self.registry.public_key_of(username)
    }

    // ---------------------------------------------------------------------
    // Mailbox
    // ---------------------------------------------------------------------

    /// Leave `content` for the holder of `receiver_username`, replacing any
    /// message from the caller still pending there.
    pub fn send_message(
        &mut self,
        caller: &Address,
        receiver_username: &str,
        content: &str,
    ) -> Result<RelayEvent> {
        let replaced = self
            .mailbox
            .send(
                &self.registry,
                caller,
                receiver_username,
                content,
                self.config.max_message_len,
            )
            .map_err(|err| rejected("send_message", caller, err))?;

        if replaced.is_some() {
            debug!(
                target: "relay",
                sender = %caller,
                receiver_username,
                "Pending message overwritten"
            );
        }
        info!(target: "relay", sender = %caller, receiver_username, "Message sent");
        Ok(self.emit(RelayEvent::MessageSent {
            sender: *caller,
            receiver_username: receiver_username.to_string(),
        }))
    }

    /// Whether `sender_username` has a message pending for the caller.
    pub fn has_message_from(&self, caller: &Address, sender_username: &str) -> bool {
        self.mailbox.has_message_from(caller, sender_username)
    }

    /// Whether the caller has a message pending for `receiver_username`.
    pub fn has_message_to(&self, caller: &Address, receiver_username: &str) -> bool {
        self.mailbox
            .has_message_to(&self.registry, caller, receiver_username)
    }

    /// Read the message `sender_username` left for the caller without
    /// consuming it.
    pub fn get_message(&self, caller: &Address, sender_username: &str) -> Result<&Message> {
        self.mailbox.get(caller, sender_username)
    }

    /// Consume the message `sender_username` left for the caller.
    pub fn delete_message_from(
        &mut self,
        caller: &Address,
        sender_username: &str,
    ) -> Result<RelayEvent> {
        self.mailbox
            .delete(caller, sender_username)
            .map_err(|err| rejected("delete_message_from", caller, err))?;

        info!(target: "relay", receiver = %caller, sender_username, "Message deleted");
        Ok(self.emit(RelayEvent::MessageDeleted {
            sender_username: sender_username.to_string(),
            receiver: *caller,
        }))
    }

    // ---------------------------------------------------------------------
    // Events and state
    // ---------------------------------------------------------------------

    /// Events emitted since creation or the last [`drain_events`](Self::drain_events).
    pub fn events(&self) -> &[RelayEvent] {
        &self.events
    }

    /// Take the event log, leaving it empty.
    pub fn drain_events(&mut self) -> Vec<RelayEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Copy the limits, registry, mailbox and event log into a snapshot.
    pub fn snapshot(&self) -> RelayState {
        RelayState {
            version: STATE_VERSION,
            config: self.config.clone(),
            users: self.registry.users(),
            messages: self
                .mailbox
                .entries()
                .into_iter()
                .map(|(key, message)| PendingMessage {
                    sender_username: key.sender_username,
                    receiver: key.receiver,
                    message,
                })
                .collect(),
            events: self.events.clone(),
        }
    }

    /// Rebuild a relay from a snapshot, checking its invariants.
    ///
    /// The limits stored in the snapshot stay in force; they are never
    /// replaced by the restoring host's configuration.
    pub fn restore(state: RelayState) -> std::result::Result<Self, StoreError> {
        if state.version != STATE_VERSION {
            return Err(StoreError::Corrupted(format!(
                "unsupported state version {} (expected {})",
                state.version, STATE_VERSION
            )));
        }
        let config = state.config;
        config
            .validate()
            .map_err(|err| StoreError::Corrupted(err.to_string()))?;

        let registry = Registry::from_users(state.users).map_err(StoreError::Corrupted)?;

        let mut mailbox = Mailbox::new();
        for pending in state.messages {
            if registry.account_of(&pending.sender_username).is_err() {
                return Err(StoreError::Corrupted(format!(
                    "message from unregistered username {:?}",
                    pending.sender_username
                )));
            }
            if !registry.is_registered(&pending.receiver) {
                return Err(StoreError::Corrupted(format!(
                    "message addressed to unregistered account {}",
                    pending.receiver
                )));
            }
            let key = SlotKey::new(pending.sender_username, pending.receiver);
            if mailbox.insert_slot(key, pending.message).is_some() {
                return Err(StoreError::Corrupted(
                    "duplicate mailbox slot".to_string(),
                ));
            }
        }

        debug!(
            target: "relay",
            users = registry.len(),
            pending = mailbox.len(),
            events = state.events.len(),
            "Relay state restored"
        );

        let mut relay = Self {
            config,
            registry,
            mailbox,
            events: state.events,
        };
        relay.trim_events();
        Ok(relay)
    }

    fn emit(&mut self, event: RelayEvent) -> RelayEvent {
        self.events.push(event.clone());
        self.trim_events();
        event
    }

    /// Drop the oldest events beyond `max_events`.
    fn trim_events(&mut self) {
        let excess = self.events.len().saturating_sub(self.config.max_events);
        if excess > 0 {
            self.events.drain(..excess);
        }
    }
}

fn rejected(operation: &'static str, caller: &Address, err: RelayError) -> RelayError {
    debug!(target: "relay", operation, caller = %caller, error = %err, "Operation rejected");
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u8) -> Address {
        Address([n; 20])
    }

    fn relay_with_pair() -> MessageRelay {
        let mut relay = MessageRelay::new();
        relay.add_user(&account(1), "s3nder_1", "K1").unwrap();
        relay.add_user(&account(2), "r3ceiver_1", "K2").unwrap();
        relay
    }

    #[test]
    fn test_events_follow_successful_mutations() {
        let mut relay = relay_with_pair();
        relay
            .send_message(&account(1), "r3ceiver_1", "hello world hey")
            .unwrap();
        relay.delete_message_from(&account(2), "s3nder_1").unwrap();
        relay.change_user_public_key(&account(1), "K3").unwrap();

        let names: Vec<&str> = relay.events().iter().map(RelayEvent::name).collect();
        assert_eq!(
            names,
            vec![
                "UserAdded",
                "UserAdded",
                "MessageSent",
                "MessageDeleted",
                "PublicKeyUpdated"
            ]
        );
    }

    #[test]
    fn test_failures_emit_nothing() {
        let mut relay = relay_with_pair();
        relay.drain_events();

        assert!(relay.add_user(&account(1), "another", "K").is_err());
        assert!(relay.add_user(&account(3), "____", "K").is_err());
        assert!(relay.change_user_public_key(&account(3), "K").is_err());
        assert!(relay.send_message(&account(1), "r3ceiver_1", "").is_err());
        assert!(relay.send_message(&account(1), "nobody", "hi").is_err());
        assert!(relay.delete_message_from(&account(2), "s3nder_1").is_err());

        assert!(relay.events().is_empty());
    }

    #[test]
    fn test_custom_limits() {
        let config = RelayConfig {
            max_message_len: 5,
            ..Default::default()
        };
        let mut relay = MessageRelay::with_config(config).unwrap();
        relay.add_user(&account(1), "s3nder_1", "K1").unwrap();
        relay.add_user(&account(2), "r3ceiver_1", "K2").unwrap();

        assert!(relay.send_message(&account(1), "r3ceiver_1", "12345").is_ok());
        let err = relay
            .send_message(&account(1), "r3ceiver_1", "123456")
            .unwrap_err();
        assert_eq!(err, RelayError::InvalidMessage { len: 6, max: 5 });
    }

    #[test]
    fn test_with_config_rejects_invalid_limits() {
        let config = RelayConfig {
            min_username_len: 30,
            ..Default::default()
        };
        assert!(MessageRelay::with_config(config).is_err());
    }

    #[test]
    fn test_snapshot_restore_preserves_state() {
        let mut relay = relay_with_pair();
        relay
            .send_message(&account(1), "r3ceiver_1", "pending")
            .unwrap();

        let state = relay.snapshot();
        let restored = MessageRelay::restore(state.clone()).unwrap();

        assert_eq!(restored.snapshot(), state);
        assert_eq!(restored.get_username(&account(2)).unwrap(), "r3ceiver_1");
        assert_eq!(restored.get_public_key("s3nder_1").unwrap(), "K1");
        assert_eq!(
            restored.get_message(&account(2), "s3nder_1").unwrap().content,
            "pending"
        );
        assert_eq!(restored.events().len(), 3);
    }

    #[test]
    fn test_restore_rejects_orphan_message() {
        let relay = relay_with_pair();
        let mut state = relay.snapshot();
        state.messages.push(PendingMessage {
            sender_username: "ghost_user".into(),
            receiver: account(2),
            message: Message::new("boo"),
        });

        let err = MessageRelay::restore(state).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }

    #[test]
    fn test_restore_keeps_snapshot_limits() {
        let config = RelayConfig {
            max_message_len: 5,
            ..Default::default()
        };
        let mut relay = MessageRelay::with_config(config.clone()).unwrap();
        relay.add_user(&account(1), "s3nder_1", "K1").unwrap();
        relay.add_user(&account(2), "r3ceiver_1", "K2").unwrap();

        let mut restored = MessageRelay::restore(relay.snapshot()).unwrap();
        assert_eq!(restored.config(), &config);
        let err = restored
            .send_message(&account(1), "r3ceiver_1", "123456")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMessage);
    }

    #[test]
    fn test_event_log_keeps_newest_entries() {
        let config = RelayConfig {
            max_events: 2,
            ..Default::default()
        };
        let mut relay = MessageRelay::with_config(config).unwrap();
        relay.add_user(&account(1), "s3nder_1", "K1").unwrap();
        relay.add_user(&account(2), "r3ceiver_1", "K2").unwrap();
        relay.change_user_public_key(&account(1), "K3").unwrap();

        assert_eq!(
            relay.events(),
            &[
                RelayEvent::UserAdded { account: account(2) },
                RelayEvent::PublicKeyUpdated { account: account(1) },
            ]
        );
        assert_eq!(relay.snapshot().events.len(), 2);
    }

    #[test]
    fn test_restore_trims_oversized_event_log() {
        let mut state = relay_with_pair().snapshot();
        state.config.max_events = 1;

        let restored = MessageRelay::restore(state).unwrap();
        assert_eq!(
            restored.events(),
            &[RelayEvent::UserAdded { account: account(2) }]
        );
    }

    #[test]
    fn test_restore_rejects_invalid_limits() {
        let mut state = relay_with_pair().snapshot();
        state.config.max_message_len = 0;
        assert!(matches!(
            MessageRelay::restore(state),
            Err(StoreError::Corrupted(_))
        ));
    }

    #[test]
    fn test_restore_rejects_unknown_version() {
        let state = RelayState {
            version: 99,
            ..Default::default()
        };
        assert!(MessageRelay::restore(state).is_err());
    }
}
