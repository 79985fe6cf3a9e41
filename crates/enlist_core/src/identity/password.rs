//! Password hashing with Argon2id, stored as PHC strings.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use once_cell::sync::Lazy;
use rand_core::OsRng;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PLACEHOLDER_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("enlist-placeholder-credential").ok());

/// Hashing backend failure. Never produced by a wrong password.
#[derive(Debug)]
pub struct CredentialError(argon2::password_hash::Error);

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "credential hashing failed: {}", self.0)
    }
}

impl Error for CredentialError {}

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(CredentialError)
}

/// Checks `password` against a stored PHC hash.
///
/// A malformed stored hash is reported as an error rather than a mismatch so
/// corrupted rows do not masquerade as wrong passwords.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(stored_hash).map_err(CredentialError)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(CredentialError(err)),
    }
}

/// Runs one full verification against a fixed placeholder hash.
///
/// Used when no account matches, so the miss costs the same Argon2 work as a
/// wrong password.
pub fn verify_against_placeholder(password: &str) {
    if let Some(hash) = PLACEHOLDER_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_against_placeholder, verify_password, PLACEHOLDER_HASH};

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify_password("pw", "plaintext").is_err());
    }

    #[test]
    fn placeholder_hash_is_a_real_argon2_hash() {
        let hash = PLACEHOLDER_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!verify_password("guess", hash).unwrap());
        verify_against_placeholder("guess");
    }
}
