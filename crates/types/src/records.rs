use serde::{Deserialize, Serialize};

use crate::Address;

/// A registered identity: one account bound to one username and one public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub account: Address,
    pub username: String,
    /// Opaque key material supplied by the owner; never interpreted.
    pub public_key: String,
}

impl User {
    pub fn new(account: Address, username: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            account,
            username: username.into(),
            public_key: public_key.into(),
        }
    }
}

/// A pending message waiting in a mailbox slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
}

impl Message {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Length of the content in characters.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
