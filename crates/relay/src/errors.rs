//! Error types for the message relay

use relay_types::{Address, UsernameRule};
use std::fmt;
use thiserror::Error;

/// Identifier that failed to resolve to a registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Account(Address),
    Username(String),
}

impl fmt::Display for UserLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserLookup::Account(account) => write!(f, "account {account}"),
            UserLookup::Username(username) => write!(f, "username {username:?}"),
        }
    }
}

/// Failures of relay operations.
///
/// Each variant maps to exactly one [`ErrorKind`]. A failed operation never
/// changes state and never emits an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("no public key stored for username {username:?}")]
    NoPublicKey { username: String },

    #[error("no user registered for {0}")]
    NoUser(UserLookup),

    #[error("no pending message from {sender_username:?} to {receiver}")]
    NoMessage {
        sender_username: String,
        receiver: Address,
    },

    #[error("invalid username {username:?}: {rule}")]
    InvalidUsername { username: String, rule: UsernameRule },

    #[error("invalid message: length {len} is outside 1..={max}")]
    InvalidMessage { len: usize, max: usize },

    #[error("address already registered: {0}")]
    AddressAlreadyRegistered(Address),

    #[error("username already exists: {0:?}")]
    UsernameAlreadyExists(String),
}

/// Field-less classification of [`RelayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoPublicKey,
    NoUser,
    NoMessage,
    InvalidUsername,
    InvalidMessage,
    AddressAlreadyRegistered,
    UsernameAlreadyExists,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoPublicKey => "NoPublicKey",
            ErrorKind::NoUser => "NoUser",
            ErrorKind::NoMessage => "NoMessage",
            ErrorKind::InvalidUsername => "InvalidUsername",
            ErrorKind::InvalidMessage => "InvalidMessage",
            ErrorKind::AddressAlreadyRegistered => "AddressAlreadyRegistered",
            ErrorKind::UsernameAlreadyExists => "UsernameAlreadyExists",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::NoPublicKey { .. } => ErrorKind::NoPublicKey,
            RelayError::NoUser(_) => ErrorKind::NoUser,
            RelayError::NoMessage { .. } => ErrorKind::NoMessage,
            RelayError::InvalidUsername { .. } => ErrorKind::InvalidUsername,
            RelayError::InvalidMessage { .. } => ErrorKind::InvalidMessage,
            RelayError::AddressAlreadyRegistered(_) => ErrorKind::AddressAlreadyRegistered,
            RelayError::UsernameAlreadyExists(_) => ErrorKind::UsernameAlreadyExists,
        }
    }
}

/// Errors from persisting or restoring relay state.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupted relay state: {0}")]
    Corrupted(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;
