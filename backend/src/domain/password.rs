//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`) with a fresh random
//! salt per hash. Both operations are CPU-bound; async callers run them on the
//! blocking pool.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};

/// Errors raised while hashing or parsing a stored hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashError {
    /// Argon2 failed to hash the password.
    #[error("failed to hash password: {0}")]
    Hash(String),
    /// The stored PHC string could not be parsed.
    #[error("stored password hash is malformed: {0}")]
    Malformed(String),
}

/// PHC-format Argon2id hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` with the default Argon2id parameters.
    ///
    /// # Examples
    /// ```
    /// use vault::domain::PasswordHash;
    ///
    /// let hash = PasswordHash::generate("pw1").expect("hash");
    /// assert!(hash.verify("pw1").expect("verify"));
    /// assert!(!hash.verify("pw2").expect("verify"));
    /// ```
    pub fn generate(password: &str) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|err| PasswordHashError::Hash(err.to_string()))
    }

    /// Wrap a PHC string read back from storage.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Check `password` against this hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored
    /// value cannot be parsed.
    pub fn verify(&self, password: &str) -> Result<bool, PasswordHashError> {
        let parsed = password_hash::PasswordHash::new(&self.0)
            .map_err(|err| PasswordHashError::Malformed(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// PHC string form, as persisted.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pw1", true)]
    #[case("pw2", false)]
    #[case("Pw1", false)]
    #[case("", false)]
    fn verifies_only_the_original_password(#[case] attempt: &str, #[case] expected: bool) {
        let hash = PasswordHash::generate("pw1").expect("hash");
        assert_eq!(hash.verify(attempt).expect("verify"), expected);
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = PasswordHash::generate("same").expect("hash");
        let second = PasswordHash::generate("same").expect("hash");
        assert_ne!(first, second);
        assert!(first.as_str().starts_with("$argon2id$"));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hash = PasswordHash::from_phc("plain-text");
        assert!(matches!(
            hash.verify("plain-text"),
            Err(PasswordHashError::Malformed(_))
        ));
    }

    #[test]
    fn debug_output_hides_the_hash() {
        let hash = PasswordHash::generate("pw").expect("hash");
        assert_eq!(format!("{hash:?}"), "PasswordHash(..)");
    }
}
