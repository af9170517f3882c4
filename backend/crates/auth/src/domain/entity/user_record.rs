//! User Record Entity
//!
//! One entry of the credential table: the stored secret plus the claims
//! granted to the user on sign-in.

use platform::password::StoredSecret;

use crate::domain::value_object::{Claims, Username};

/// A user as read from a credential source, before canonicalization
#[derive(Debug, Clone, Default)]
pub struct RawUserRecord {
    /// Stored secret; `None` means the user can never sign in
    pub password: Option<String>,
    pub claims: Claims,
}

impl RawUserRecord {
    pub fn new(password: impl Into<String>, claims: Claims) -> Self {
        Self {
            password: Some(password.into()),
            claims,
        }
    }
}

/// Canonical user record
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub username: Username,
    /// `None` never authenticates
    pub secret: Option<StoredSecret>,
    /// Claims as configured, without `username`
    pub claims: Claims,
}

impl UserRecord {
    pub fn from_raw(username: Username, raw: RawUserRecord) -> Self {
        Self {
            username,
            secret: raw.password.as_deref().map(StoredSecret::parse),
            claims: raw.claims,
        }
    }

    /// Check a submitted password against the stored secret
    pub fn verify(&self, password: &str) -> bool {
        self.secret
            .as_ref()
            .is_some_and(|secret| secret.verify(password))
    }

    /// Claims to embed in a token: `username` first, configured claims on top
    pub fn token_claims(&self) -> Claims {
        Claims::for_user(self.username.as_str()).merge(&self.claims)
    }
}
