//! Serialisable snapshot of a relay instance.

use crate::config::RelayConfig;
use crate::events::RelayEvent;
use relay_types::{Address, Message, User};
use serde::{Deserialize, Serialize};

/// Schema version written into every snapshot.
pub const STATE_VERSION: u32 = 2;

/// One occupied mailbox slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMessage {
    pub sender_username: String,
    pub receiver: Address,
    pub message: Message,
}

/// Limits, registry, mailbox and event log of a relay, in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayState {
    pub version: u32,
    /// Limits fixed when the instance was created.
    pub config: RelayConfig,
    pub users: Vec<User>,
    pub messages: Vec<PendingMessage>,
    #[serde(default)]
    pub events: Vec<RelayEvent>,
}

impl Default for RelayState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            config: RelayConfig::default(),
            users: Vec::new(),
            messages: Vec::new(),
            events: Vec::new(),
        }
    }
}
