//! Policy limits applied by the registry and mailbox.

use relay_types::{DEFAULT_MAX_USERNAME_LEN, DEFAULT_MIN_USERNAME_LEN};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on message length, in characters.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 280;
/// Default number of events retained in the in-instance log.
pub const DEFAULT_MAX_EVENTS: usize = 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("min_username_len must be at least 1")]
    ZeroMinUsernameLen,

    #[error("min_username_len ({min}) exceeds max_username_len ({max})")]
    UsernameBoundsInverted { min: usize, max: usize },

    #[error("max_message_len must be at least 1")]
    ZeroMaxMessageLen,

    #[error("max_events must be at least 1")]
    ZeroMaxEvents,
}

/// Length limits enforced by a relay instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Inclusive lower bound on username length.
    pub min_username_len: usize,
    /// Inclusive upper bound on username length.
    pub max_username_len: usize,
    /// Inclusive upper bound on message length. Empty messages are always rejected.
    pub max_message_len: usize,
    /// Events kept in the log; the oldest are dropped beyond this.
    pub max_events: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            min_username_len: DEFAULT_MIN_USERNAME_LEN,
            max_username_len: DEFAULT_MAX_USERNAME_LEN,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_username_len == 0 {
            return Err(ConfigError::ZeroMinUsernameLen);
        }
        if self.min_username_len > self.max_username_len {
            return Err(ConfigError::UsernameBoundsInverted {
                min: self.min_username_len,
                max: self.max_username_len,
            });
        }
        if self.max_message_len == 0 {
            return Err(ConfigError::ZeroMaxMessageLen);
        }
        if self.max_events == 0 {
            return Err(ConfigError::ZeroMaxEvents);
        }
        Ok(())
    }
}
