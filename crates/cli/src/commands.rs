//! Subcommand handlers. Each operation runs against a freshly restored relay
//! and writes the snapshot back only when the relay changed.

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use relay_core::{MessageRelay, RelayConfig, RelayError, RelayEvent, StateStore};
use relay_types::Address;
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialise an empty relay in the state store
    Deploy {
        /// Replace an existing relay, even one that can no longer be read
        #[arg(long)]
        force: bool,
    },
    #[command(flatten)]
    Operation(Operation),
}

/// Commands that act on an already deployed relay.
#[derive(Subcommand, Debug, Clone)]
pub enum Operation {
    /// Register the calling account under a username
    AddUser {
        #[arg(long)]
        from: Address,
        username: String,
        public_key: String,
    },
    /// Replace the calling account's public key
    ChangeKey {
        #[arg(long)]
        from: Address,
        public_key: String,
    },
    /// Show the calling account's username
    Username {
        #[arg(long)]
        from: Address,
    },
    /// Show the public key registered for a username
    PublicKey { username: String },
    /// Leave a message for a receiver
    Send {
        #[arg(long)]
        from: Address,
        receiver: String,
        content: String,
    },
    /// Check for a pending message from a sender
    HasFrom {
        #[arg(long)]
        from: Address,
        sender: String,
    },
    /// Check whether a sent message is still pending for a receiver
    HasTo {
        #[arg(long)]
        from: Address,
        receiver: String,
    },
    /// Read a pending message without consuming it
    Get {
        #[arg(long)]
        from: Address,
        sender: String,
    },
    /// Consume a pending message
    Delete {
        #[arg(long)]
        from: Address,
        sender: String,
    },
    /// Print the event log, one JSON object per line
    Events {
        /// Empty the log after printing
        #[arg(long)]
        clear: bool,
    },
}

impl Operation {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Operation::AddUser { .. }
                | Operation::ChangeKey { .. }
                | Operation::Send { .. }
                | Operation::Delete { .. }
                | Operation::Events { clear: true }
        )
    }
}

/// Run `command` against `store`.
///
/// `config` only shapes a new deployment. Operations always use the limits
/// stored with the deployed relay.
pub fn execute(command: &Commands, store: &impl StateStore, config: &RelayConfig) -> Result<Value> {
    match command {
        Commands::Deploy { force } => deploy(store, config, *force),
        Commands::Operation(operation) => operate(operation, store, config),
    }
}

fn deploy(store: &impl StateStore, config: &RelayConfig, force: bool) -> Result<Value> {
    if !force && store.load()?.is_some() {
        anyhow::bail!("a relay is already deployed; pass --force to replace it");
    }

    let relay = MessageRelay::with_config(config.clone())?;
    store.save(&relay.snapshot())?;

    info!(target: "relay::deploy", "{}", "-".repeat(48));
    info!(
        target: "relay::deploy",
        max_message_len = config.max_message_len,
        min_username_len = config.min_username_len,
        max_username_len = config.max_username_len,
        max_events = config.max_events,
        "MessageRelay deployed"
    );
    Ok(json!({ "deployed": true }))
}

fn operate(operation: &Operation, store: &impl StateStore, config: &RelayConfig) -> Result<Value> {
    let state = store
        .load()?
        .ok_or_else(|| anyhow!("no relay deployed; run `relay-cli deploy` first"))?;
    let mut relay = MessageRelay::restore(state)?;

    if relay.config() != config {
        warn!(
            target: "relay::cli",
            "Configured relay limits differ from the deployed instance; using the deployed limits"
        );
    }

    let output = run(operation, &mut relay)?;
    if operation.mutates() {
        store
            .save(&relay.snapshot())
            .context("failed to save relay state")?;
    }
    Ok(output)
}

fn run(operation: &Operation, relay: &mut MessageRelay) -> Result<Value> {
    let output = match operation {
        Operation::AddUser {
            from,
            username,
            public_key,
        } => event(relay.add_user(from, username, public_key))?,
        Operation::ChangeKey { from, public_key } => {
            event(relay.change_user_public_key(from, public_key))?
        }
        Operation::Username { from } => {
            json!({ "username": relay.get_username(from).map_err(relay_error)? })
        }
        Operation::PublicKey { username } => {
            json!({ "public_key": relay.get_public_key(username).map_err(relay_error)? })
        }
        Operation::Send {
            from,
            receiver,
            content,
        } => event(relay.send_message(from, receiver, content))?,
        Operation::HasFrom { from, sender } => {
            json!({ "pending": relay.has_message_from(from, sender) })
        }
        Operation::HasTo { from, receiver } => {
            json!({ "pending": relay.has_message_to(from, receiver) })
        }
        Operation::Get { from, sender } => {
            let message = relay.get_message(from, sender).map_err(relay_error)?;
            serde_json::to_value(message)?
        }
        Operation::Delete { from, sender } => event(relay.delete_message_from(from, sender))?,
        Operation::Events { clear } => {
            let events = if *clear {
                relay.drain_events()
            } else {
                relay.events().to_vec()
            };
            serde_json::to_value(events)?
        }
    };
    Ok(output)
}

fn event(result: relay_core::Result<RelayEvent>) -> Result<Value> {
    let event = result.map_err(relay_error)?;
    Ok(json!({ "event": event }))
}

fn relay_error(err: RelayError) -> anyhow::Error {
    anyhow!("{}: {}", err.kind(), err)
}
