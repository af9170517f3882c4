//! In-Memory Credential Resolvers
//!
//! `StaticCredentials` wraps a fixed table; `FnCredentials` delegates to an
//! async callable, for credentials held somewhere this crate knows nothing
//! about.

use std::future::Future;
use std::sync::Arc;

use crate::domain::entity::{CredentialTable, RawUserRecord};
use crate::domain::repository::CredentialResolver;
use crate::domain::value_object::Claims;
use crate::error::{AuthError, AuthResult, LoadError};
use crate::infra::yaml_file::parse_credentials;

const STATIC_ORIGIN: &str = "static credentials";

/// Fixed credential table
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    table: Arc<CredentialTable>,
}

impl StaticCredentials {
    pub fn from_records<I, S>(records: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (S, RawUserRecord)>,
        S: AsRef<str>,
    {
        let table = CredentialTable::from_records(STATIC_ORIGIN, records)?;
        Ok(Self {
            table: Arc::new(table),
        })
    }

    /// Users with a password and no extra claims
    pub fn from_passwords<I, U, P>(pairs: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (U, P)>,
        U: AsRef<str>,
        P: Into<String>,
    {
        Self::from_records(
            pairs
                .into_iter()
                .map(|(username, password)| (username, RawUserRecord::new(password, Claims::new()))),
        )
    }

    /// Users from a YAML document in the credential file format
    pub fn from_yaml_str(text: &str) -> Result<Self, LoadError> {
        Self::from_records(parse_credentials(STATIC_ORIGIN, text)?)
    }

    pub fn table(&self) -> &CredentialTable {
        &self.table
    }
}

impl CredentialResolver for StaticCredentials {
    async fn lookup(&self, username: &str, password: &str) -> AuthResult<Claims> {
        self.table
            .authenticate(username, password)
            .ok_or(AuthError::InvalidCredentials)
    }
}

/// Resolver backed by an async callable `(username, password) -> claims`
///
/// The callable receives the lowercased username. If the returned claims
/// lack `username`, the sign-in use case adds it.
pub struct FnCredentials<F> {
    lookup: F,
}

impl<F> FnCredentials<F> {
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }
}

impl<F, Fut> CredentialResolver for FnCredentials<F>
where
    F: Fn(String, String) -> Fut + Send + Sync,
    Fut: Future<Output = AuthResult<Claims>> + Send,
{
    async fn lookup(&self, username: &str, password: &str) -> AuthResult<Claims> {
        (self.lookup)(username.to_string(), password.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_lookup() {
        let credentials = StaticCredentials::from_yaml_str(
            "Hello:\n  password: world\n  claims:\n    admin: false\n",
        )
        .unwrap();

        let claims = credentials.lookup("HELLO", "world").await.unwrap();
        assert_eq!(claims.username(), Some("hello"));
        assert_eq!(claims.get("admin"), Some(&json!(false)));

        assert!(matches!(
            credentials.lookup("hello", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_static_duplicates_rejected() {
        let err = StaticCredentials::from_passwords([("Hello", "a"), ("hello", "b")]).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateUsername { .. }));
    }

    #[tokio::test]
    async fn test_fn_credentials() {
        let credentials = FnCredentials::new(|username: String, password: String| async move {
            if username == "hello" && password == "world" {
                Ok(Claims::for_user(username))
            } else {
                Err(AuthError::InvalidCredentials)
            }
        });

        assert!(credentials.lookup("hello", "world").await.is_ok());
        assert!(credentials.lookup("hello", "x").await.is_err());
    }
}
