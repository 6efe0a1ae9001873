//! Account ↔ username ↔ public key bindings.

use crate::config::RelayConfig;
use crate::errors::*;
use relay_types::{validate_username, Address, User};
use std::collections::HashMap;

/// User registry.
///
/// Usernames are permanent once claimed: there is no unregister path, so an
/// entry in `accounts_by_username` is never rebound to another account.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    /// Account → user record
    users: HashMap<Address, User>,
    /// Username → owning account
    accounts_by_username: HashMap<String, Address>,
    /// Username → current public key
    public_keys: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `caller` to `username` and `public_key`.
    ///
    /// Checks run in a fixed order and the first failure wins: the caller
    /// must be unregistered, the username must be well formed, and the
    /// username must be unclaimed.
    pub fn add_user(
        &mut self,
        caller: &Address,
        username: &str,
        public_key: &str,
        config: &RelayConfig,
    ) -> Result<()> {
        if self.users.contains_key(caller) {
            return Err(RelayError::AddressAlreadyRegistered(*caller));
        }

        validate_username(username, config.min_username_len, config.max_username_len).map_err(
            |rule| RelayError::InvalidUsername {
                username: username.to_string(),
                rule,
            },
        )?;

        if self.accounts_by_username.contains_key(username) {
            return Err(RelayError::UsernameAlreadyExists(username.to_string()));
        }

        self.insert(User::new(*caller, username, public_key));
        Ok(())
    }

    /// Replace the caller's public key.
    pub fn change_public_key(&mut self, caller: &Address, public_key: &str) -> Result<()> {
        let user = self
            .users
            .get_mut(caller)
            .ok_or(RelayError::NoUser(UserLookup::Account(*caller)))?;

        user.public_key = public_key.to_string();
        self.public_keys
            .insert(user.username.clone(), public_key.to_string());
        Ok(())
    }

    /// Username registered by `caller`.
    pub fn username_of(&self, caller: &Address) -> Result<&str> {
        self.users
            .get(caller)
            .map(|user| user.username.as_str())
            .ok_or(RelayError::NoUser(UserLookup::Account(*caller)))
    }

    /// Public key currently stored for `username`.
    pub fn public_key_of(&self, username: &str) -> Result<&str> {
        self.public_keys
            .get(username)
            .map(String::as_str)
            .ok_or_else(|| RelayError::NoPublicKey {
                username: username.to_string(),
            })
    }

    /// Account holding `username`.
    pub fn account_of(&self, username: &str) -> Result<Address> {
        self.accounts_by_username
            .get(username)
            .copied()
            .ok_or_else(|| RelayError::NoUser(UserLookup::Username(username.to_string())))
    }

    pub fn user(&self, account: &Address) -> Option<&User> {
        self.users.get(account)
    }

    pub fn is_registered(&self, account: &Address) -> bool {
        self.users.contains_key(account)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// All user records, ordered by account.
    pub fn users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by(|a, b| a.account.cmp(&b.account));
        users
    }

    /// Rebuild a registry from stored user records.
    ///
    /// Returns a description of the first duplicate account or username.
    pub(crate) fn from_users(users: Vec<User>) -> std::result::Result<Self, String> {
        let mut registry = Self::new();
        for user in users {
            if registry.users.contains_key(&user.account) {
                return Err(format!("duplicate account {}", user.account));
            }
            if registry.accounts_by_username.contains_key(&user.username) {
                return Err(format!("duplicate username {:?}", user.username));
            }
            registry.insert(user);
        }
        Ok(registry)
    }

    fn insert(&mut self, user: User) {
        self.accounts_by_username
            .insert(user.username.clone(), user.account);
        self.public_keys
            .insert(user.username.clone(), user.public_key.clone());
        self.users.insert(user.account, user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address(bytes)
    }

    #[test]
    fn test_registration_and_lookup() {
        let mut registry = Registry::new();
        let config = RelayConfig::default();

        registry
            .add_user(&account(1), "s3nder_1", "public_key_s3nder_1", &config)
            .unwrap();

        assert_eq!(registry.username_of(&account(1)).unwrap(), "s3nder_1");
        assert_eq!(
            registry.public_key_of("s3nder_1").unwrap(),
            "public_key_s3nder_1"
        );
        assert_eq!(registry.account_of("s3nder_1").unwrap(), account(1));
        assert!(registry.is_registered(&account(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_address_checked_before_username() {
        let mut registry = Registry::new();
        let config = RelayConfig::default();
        registry
            .add_user(&account(1), "s3nder_1", "k1", &config)
            .unwrap();

        // Already registered wins even when the new username is malformed.
        let err = registry
            .add_user(&account(1), "inv", "k2", &config)
            .unwrap_err();
        assert_eq!(err, RelayError::AddressAlreadyRegistered(account(1)));
    }

    #[test]
    fn test_username_taken() {
        let mut registry = Registry::new();
        let config = RelayConfig::default();
        registry
            .add_user(&account(1), "s3nder_1", "k1", &config)
            .unwrap();

        let err = registry
            .add_user(&account(2), "s3nder_1", "k1", &config)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UsernameAlreadyExists);
        assert!(!registry.is_registered(&account(2)));
    }

    #[test]
    fn test_usernames_are_case_sensitive() {
        let mut registry = Registry::new();
        let config = RelayConfig::default();
        registry
            .add_user(&account(1), "sender_2", "k1", &config)
            .unwrap();
        registry
            .add_user(&account(2), "sEnder_2", "k2", &config)
            .unwrap();

        assert_eq!(registry.account_of("sender_2").unwrap(), account(1));
        assert_eq!(registry.account_of("sEnder_2").unwrap(), account(2));
    }

    #[test]
    fn test_change_public_key_requires_registration() {
        let mut registry = Registry::new();
        let err = registry.change_public_key(&account(9), "k").unwrap_err();
        assert_eq!(err, RelayError::NoUser(UserLookup::Account(account(9))));
    }

    #[test]
    fn test_change_public_key_updates_both_views() {
        let mut registry = Registry::new();
        let config = RelayConfig::default();
        registry
            .add_user(&account(1), "s3nder_1", "old", &config)
            .unwrap();

        registry.change_public_key(&account(1), "new").unwrap();

        assert_eq!(registry.public_key_of("s3nder_1").unwrap(), "new");
        assert_eq!(registry.user(&account(1)).unwrap().public_key, "new");
    }

    #[test]
    fn test_missing_public_key() {
        let registry = Registry::new();
        let err = registry.public_key_of("s3nder_1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoPublicKey);
    }

    #[test]
    fn test_from_users_rejects_duplicates() {
        let users = vec![
            User::new(account(1), "alice", "k1"),
            User::new(account(2), "alice", "k2"),
        ];
        assert!(Registry::from_users(users).is_err());

        let users = vec![
            User::new(account(1), "alice", "k1"),
            User::new(account(1), "bobby", "k2"),
        ];
        assert!(Registry::from_users(users).is_err());
    }
}
