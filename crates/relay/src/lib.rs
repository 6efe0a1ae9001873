//! Username registry and single-slot mailbox.
//!
//! Accounts register a unique username together with an opaque public key.
//! Any registered account can then leave one pending message for another
//! registered account; the receiver reads it as often as it likes and
//! deletes it explicitly. A new message from the same sender to the same
//! receiver replaces the pending one.
//!
//! Every operation takes the acting account explicitly. Mutations either
//! apply completely and emit exactly one [`RelayEvent`], or fail with a
//! [`RelayError`] and leave the state untouched.

pub mod config;
pub mod errors;
pub mod events;
pub mod mailbox;
pub mod registry;
pub mod relay;
pub mod shared;
pub mod state;
pub mod store;

pub use config::*;
pub use errors::*;
pub use events::*;
pub use mailbox::{Mailbox, SlotKey};
pub use registry::Registry;
pub use relay::MessageRelay;
pub use shared::SharedMessageRelay;
pub use state::*;
pub use store::*;
