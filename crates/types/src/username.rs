use thiserror::Error;

/// Shortest username accepted by the default registration policy.
pub const DEFAULT_MIN_USERNAME_LEN: usize = 4;
/// Longest username accepted by the default registration policy.
pub const DEFAULT_MAX_USERNAME_LEN: usize = 20;

/// The username rule that rejected a candidate.
///
/// Callers outside the registry only see a single "invalid username" failure;
/// the rule is kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsernameRule {
    #[error("username must be {min}-{max} characters long, got {actual}")]
    Length {
        min: usize,
        max: usize,
        actual: usize,
    },
    #[error("username may only contain ASCII letters, digits and '_', found {found:?}")]
    Charset { found: char },
    #[error("username must contain at least one letter or digit")]
    NoAlphanumeric,
}

/// Returns true for characters allowed anywhere in a username.
pub fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Validate a username against the length bounds and the `[A-Za-z0-9_]`
/// charset. Rules are checked in order: length, charset, then the
/// requirement for at least one alphanumeric character.
pub fn validate_username(username: &str, min_len: usize, max_len: usize) -> Result<(), UsernameRule> {
    let actual = username.chars().count();
    if actual < min_len || actual > max_len {
        return Err(UsernameRule::Length {
            min: min_len,
            max: max_len,
            actual,
        });
    }

    if let Some(found) = username.chars().find(|c| !is_username_char(*c)) {
        return Err(UsernameRule::Charset { found });
    }

    if !username.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(UsernameRule::NoAlphanumeric);
    }

    Ok(())
}
