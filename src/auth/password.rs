//! Password hashing and verification.
//!
//! New hashes are Argon2id PHC strings. Rows written by the sign-up flow
//! carry bcrypt hashes (`$2a$`, `$2b$`, `$2y$`), which verify as-is.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use zeroize::Zeroizing;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Hash a password into a PHC string with a fresh 16-byte salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = Zeroizing::new([0u8; 16]);
    rand::fill(&mut salt_bytes[..]);
    let salt = SaltString::encode_b64(&salt_bytes[..])
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Prefixes of the bcrypt modular-crypt variants found in the users table.
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

fn is_bcrypt(hash: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
}

/// Check a password against a stored bcrypt or Argon2 PHC hash.
///
/// Returns `Ok(false)` on mismatch. Both backends compare digests in
/// constant time.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    if is_bcrypt(stored) {
        return bcrypt::verify(password, stored)
            .map_err(|e| PasswordError::MalformedHash(e.to_string()));
    }

    verify_phc(password, stored)
}

fn verify_phc(password: &str, phc: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(phc).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same", &first).unwrap());
        assert!(verify_password("same", &second).unwrap());
    }

    /// OpenBSD reference vector, password "U*U".
    const BCRYPT_VECTOR: &str = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

    #[test]
    fn test_verify_bcrypt_row() {
        assert!(verify_password("U*U", BCRYPT_VECTOR).unwrap());
        assert!(!verify_password("wrong", BCRYPT_VECTOR).unwrap());
    }

    #[test]
    fn test_verify_bcrypt_2b_and_2y() {
        let hash = bcrypt::hash("correct", 4).unwrap();
        assert!(hash.starts_with("$2b$"));
        assert!(verify_password("correct", &hash).unwrap());

        let legacy = hash.replacen("$2b$", "$2y$", 1);
        assert!(verify_password("correct", &legacy).unwrap());
        assert!(!verify_password("wrong", &legacy).unwrap());
    }

    #[test]
    fn test_truncated_bcrypt_hash() {
        let result = verify_password("U*U", "$2a$05$CCCC");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }

    #[test]
    fn test_malformed_hash() {
        let result = verify_password("correct", "plaintext-not-a-hash");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }
}
