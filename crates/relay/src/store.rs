//! Persistence backends for relay snapshots.

use crate::errors::StoreError;
use crate::state::RelayState;
use parking_lot::RwLock;
use sled::{Db, Tree};
use std::path::Path;
use tracing::debug;

const STATE_KEY: &[u8] = b"relay_state";

/// Abstract snapshot storage
pub trait StateStore {
    /// Load the last saved snapshot, if any.
    fn load(&self) -> Result<Option<RelayState>, StoreError>;
    /// Replace the stored snapshot.
    fn save(&self, state: &RelayState) -> Result<(), StoreError>;
    /// Remove the stored snapshot.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Sled-backed implementation
pub struct SledStateStore {
    db: Db,
    relay: Tree,
}

impl SledStateStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let relay = db.open_tree("relay")?;
        Ok(Self { db, relay })
    }
}

impl StateStore for SledStateStore {
    fn load(&self) -> Result<Option<RelayState>, StoreError> {
        match self.relay.get(STATE_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &RelayState) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(state)?;
        self.relay.insert(STATE_KEY, bytes)?;
        self.db.flush()?;
        debug!(
            target: "relay::store",
            users = state.users.len(),
            pending = state.messages.len(),
            "Relay state saved"
        );
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.relay.remove(STATE_KEY)?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory testing backend
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: RwLock<Option<RelayState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<RelayState>, StoreError> {
        Ok(self.state.read().clone())
    }

    fn save(&self, state: &RelayState) -> Result<(), StoreError> {
        *self.state.write() = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.state.write() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::MessageRelay;
    use relay_types::Address;
    use tempfile::TempDir;

    fn populated_state() -> RelayState {
        let mut relay = MessageRelay::new();
        relay.add_user(&Address([1; 20]), "s3nder_1", "K1").unwrap();
        relay.add_user(&Address([2; 20]), "r3ceiver_1", "K2").unwrap();
        relay
            .send_message(&Address([1; 20]), "r3ceiver_1", "hello world hey")
            .unwrap();
        relay.snapshot()
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStateStore::new();
        assert!(store.load().unwrap().is_none());

        let state = populated_state();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn sled_store_survives_reopen() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("relay-db");
        let state = populated_state();

        {
            let store = SledStateStore::open(&path).expect("open store");
            assert!(store.load().expect("load").is_none());
            store.save(&state).expect("save");
        }

        let reopened = SledStateStore::open(&path).expect("reopen store");
        assert_eq!(reopened.load().expect("load"), Some(state));

        reopened.clear().expect("clear");
        assert!(reopened.load().expect("load").is_none());
    }

    #[test]
    fn sled_store_reports_garbage() {
        let temp_dir = TempDir::new().expect("temp dir");
        let store = SledStateStore::open(temp_dir.path().join("db")).expect("open store");
        store.relay.insert(STATE_KEY, b"not json".to_vec()).unwrap();

        assert!(matches!(store.load(), Err(StoreError::Serialization(_))));
    }
}
