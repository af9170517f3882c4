//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Claims, user records, credential table, resolver traits
//! - `application/` - Configuration, token codec, sign-in use case
//! - `infra/` - Credential sources and the hot-reloading store
//! - `presentation/` - Middleware, guards, handlers, router, views
//!
//! ## Features
//! - Username + password sign-in against a YAML credential file
//! - Credential file hot reload with coalesced change notifications
//! - Stateless HS256 tokens in an `HttpOnly` cookie or `Authorization` header
//! - Claims-based route guards with sign-in redirect and 403 view
//!
//! ## Security Model
//! - Stored secrets are plaintext or Argon2id PHC strings
//! - Unknown user and wrong password are indistinguishable
//! - The signing secret never leaves the token codec

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::{AuthConfig, SignInRedirect, TokenCodec, ViewNames};
pub use domain::{Claims, CredentialLoader, CredentialResolver};
pub use error::{AuthError, AuthResult, ConfigError, LoadError, VerifyError};
pub use infra::{
    CredentialStore, CredentialWatcher, FnCredentials, ReloadTrigger, StaticCredentials,
    WatchConfig, YamlCredentialFile,
};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

pub mod views {
    pub use crate::presentation::view::{ViewError, ViewRenderer};
}
