//! Notifications emitted by successful relay mutations.

use relay_types::Address;
use serde::{Deserialize, Serialize};

/// One event per successful mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelayEvent {
    /// An account registered a username.
    UserAdded { account: Address },
    /// An account replaced its public key.
    PublicKeyUpdated { account: Address },
    /// `sender` left a message for the holder of `receiver_username`.
    MessageSent {
        sender: Address,
        receiver_username: String,
    },
    /// `receiver` consumed the pending message from `sender_username`.
    MessageDeleted {
        sender_username: String,
        receiver: Address,
    },
}

impl RelayEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::UserAdded { .. } => "UserAdded",
            RelayEvent::PublicKeyUpdated { .. } => "PublicKeyUpdated",
            RelayEvent::MessageSent { .. } => "MessageSent",
            RelayEvent::MessageDeleted { .. } => "MessageDeleted",
        }
    }
}
