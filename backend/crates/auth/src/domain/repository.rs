//! Repository Traits
//!
//! Interfaces for credential sources. Implementations are in the
//! infrastructure layer.

use std::path::Path;

use crate::domain::entity::RawUserRecord;
use crate::domain::value_object::Claims;
use crate::error::{AuthResult, LoadError};

/// Resolves a username and password to the claims to embed in a token
///
/// Returns `AuthError::InvalidCredentials` for an unknown user or a wrong
/// password, without saying which.
#[trait_variant::make(CredentialResolver: Send)]
pub trait LocalCredentialResolver {
    async fn lookup(&self, username: &str, password: &str) -> AuthResult<Claims>;
}

/// Reads the full set of user records from a source
///
/// `load` is blocking and is run off the async runtime by the store.
pub trait CredentialLoader: Send + Sync + 'static {
    /// Human-readable source name used in errors and logs
    fn origin(&self) -> &str;

    fn load(&self) -> Result<Vec<(String, RawUserRecord)>, LoadError>;

    /// File to watch for changes, if the source is file-backed
    fn watch_path(&self) -> Option<&Path> {
        None
    }
}
