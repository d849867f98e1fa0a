//! Argon2 password hashing for user accounts.
//!
//! Stored hashes are PHC strings. A hash starting with
//! [`UNUSABLE_PASSWORD_PREFIX`] marks an account that cannot log in with a
//! password (seeded or administratively locked users).

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use quill_core::forms::PASSWORD_MIN_LENGTH;
use quill_core::ports::{AuthError, PasswordService};

/// Prefix of a stored hash that no password matches.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Argon2-based password service.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
    /// Hash verified against when a login names an unknown user.
    decoy: OnceLock<Option<String>>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
            decoy: OnceLock::new(),
        }
    }

    /// A stored hash that disables password login.
    pub fn unusable() -> String {
        format!("{UNUSABLE_PASSWORD_PREFIX}{}", uuid::Uuid::new_v4().simple())
    }

    fn hash_with_salt(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        if password.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(AuthError::WeakPassword(PASSWORD_MIN_LENGTH));
        }
        self.hash_with_salt(password)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        if hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
            return Ok(false);
        }

        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn verify_unknown_user(&self, password: &str) {
        let decoy = self.decoy.get_or_init(|| {
            self.hash_with_salt("decoy password")
                .inspect_err(|e| tracing::warn!(error = %e, "could not build decoy hash"))
                .ok()
        });
        if let Some(hash) = decoy {
            let _ = self.verify(password, hash);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = Argon2PasswordService::new();
        let password = "correct horse battery";

        let hash = service.hash(password).unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(service.verify(password, &hash).unwrap());
        assert!(!service.verify("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_short_password_is_not_hashed() {
        let service = Argon2PasswordService::new();
        assert!(matches!(
            service.hash("short"),
            Err(AuthError::WeakPassword(PASSWORD_MIN_LENGTH))
        ));
    }

    #[test]
    fn test_unusable_hash_never_matches() {
        let service = Argon2PasswordService::new();
        let hash = Argon2PasswordService::unusable();
        assert!(!service.verify("", &hash).unwrap());
        assert!(!service.verify(&hash, &hash).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        let service = Argon2PasswordService::new();
        assert!(matches!(
            service.verify("pw", "not-a-phc-string"),
            Err(AuthError::HashingError(_))
        ));
    }

    #[test]
    fn test_unknown_user_builds_decoy_once() {
        let service = Argon2PasswordService::new();
        service.verify_unknown_user("guess one");
        let first = service.decoy.get().cloned().flatten();
        assert!(first.is_some());

        service.verify_unknown_user("guess two");
        assert_eq!(service.decoy.get().cloned().flatten(), first);
    }
}
