use argon2::password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHash};

use crate::{Error, Result};

/// Hashes a plaintext password with Argon2id and a fresh random salt.
pub fn hash(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| Error::Internal("Cannot hash password".to_string()))
}

/// Checks a plaintext password against a stored hash. A stored value
/// that does not parse as a password hash verifies as false.
pub fn verify(plaintext: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|hash| {
            Argon2::default()
                .verify_password(plaintext.as_bytes(), &hash)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_accepts_original_password() {
        let hashed = hash("hunter2!").unwrap();
        assert!(verify("hunter2!", &hashed));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hashed = hash("hunter2!").unwrap();
        assert!(!verify("hunter3!", &hashed));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("same-password").unwrap();
        let b = hash("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_rejects_garbage_stored_hash() {
        assert!(!verify("anything", "not-a-password-hash"));
    }
}
