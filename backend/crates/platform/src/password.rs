//! Password Hashing and Verification
//!
//! Stored secrets come from an operator-maintained credentials file and are
//! either plaintext passwords or Argon2id PHC strings. The format is
//! recognised by an explicit marker rather than by guessing from length:
//!
//! | stored value              | treated as                          |
//! |---------------------------|-------------------------------------|
//! | `$argon2id$v=19$...`      | PHC hash (any value starting `$`)   |
//! | `plain:<password>`        | plaintext, prefix stripped          |
//! | anything else             | plaintext                           |
//!
//! ## Security Features
//! - Memory-hard Argon2id hashing with a random salt per hash
//! - Hash comparison delegated to Argon2's constant-time verifier
//! - Corrupt hashes fail closed (verification returns `false`)

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;

pub use argon2::Params as HashParams;

/// Explicit plaintext marker
pub const PLAIN_PREFIX: &str = "plain:";

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Empty passwords are never hashed
    #[error("Password cannot be empty")]
    Empty,
}

// ============================================================================
// Stored Secret
// ============================================================================

/// A secret as stored in the credential source
#[derive(Clone, PartialEq, Eq)]
pub enum StoredSecret {
    /// Plaintext password, compared by exact equality
    Plain(String),
    /// PHC-formatted hash string
    Hashed(HashedPassword),
}

impl StoredSecret {
    /// Classify a raw stored value
    pub fn parse(raw: &str) -> Self {
        if let Some(plain) = raw.strip_prefix(PLAIN_PREFIX) {
            StoredSecret::Plain(plain.to_string())
        } else if raw.starts_with('$') {
            StoredSecret::Hashed(HashedPassword {
                hash: raw.to_string(),
            })
        } else {
            StoredSecret::Plain(raw.to_string())
        }
    }

    pub fn is_hashed(&self) -> bool {
        matches!(self, StoredSecret::Hashed(_))
    }

    /// Check a submitted password against this secret
    pub fn verify(&self, submitted: &str) -> bool {
        match self {
            StoredSecret::Plain(plain) => plain == submitted,
            StoredSecret::Hashed(hashed) => hashed.verify(submitted),
        }
    }
}

impl fmt::Debug for StoredSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredSecret::Plain(_) => f.debug_tuple("Plain").field(&"[REDACTED]").finish(),
            StoredSecret::Hashed(hashed) => f.debug_tuple("Hashed").field(hashed).finish(),
        }
    }
}

/// Check a submitted password against a raw stored value
pub fn verify_password(stored: &str, submitted: &str) -> bool {
    StoredSecret::parse(stored).verify(submitted)
}

// ============================================================================
// Hashed Password
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string embeds algorithm, version, cost parameters, salt and
/// digest, so verification needs nothing but the string itself.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Verify a password against this hash
    ///
    /// Any parse or verification error is a failed match.
    pub fn verify(&self, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        // Argon2 uses constant-time comparison internally
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Hashing
// ============================================================================

/// Hash a password with Argon2id and the default (OWASP) parameters
///
/// m=19456 (19 MiB), t=2, p=1
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    hash_with(Argon2::default(), password)
}

/// Hash a password with Argon2id and explicit cost parameters
pub fn hash_password_with(password: &str, params: HashParams) -> Result<String, PasswordHashError> {
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
    hash_with(argon2, password)
}

fn hash_with(argon2: Argon2<'_>, password: &str) -> Result<String, PasswordHashError> {
    if password.is_empty() {
        return Err(PasswordHashError::Empty);
    }

    // Generate random salt (128 bits = 16 bytes)
    let salt = SaltString::generate(OsRng);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

    Ok(hash.to_string())
}

// ============================================================================
// Tests
// ============================================================================
