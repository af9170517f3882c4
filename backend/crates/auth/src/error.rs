//! Auth Error Types
//!
//! This module provides the auth error variants. Request-path errors
//! integrate with the unified `kernel::error::AppError` system; startup
//! errors (`ConfigError`, `LoadError`) are fatal and reported by the binary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::presentation::view::ViewError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Message shown to users for any failed sign-in
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials, please try again.";

/// Request-path errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password; the two are never distinguished
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token could not be signed
    #[error("Failed to issue token: {0}")]
    TokenIssue(#[from] jsonwebtoken::errors::Error),

    /// A view could not be rendered
    #[error(transparent)]
    View(#[from] ViewError),

    /// A response header could not be encoded
    #[error("Invalid response header: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::TokenIssue(_)
            | AuthError::View(_)
            | AuthError::Header(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials => ErrorKind::Unauthorized,
            AuthError::TokenIssue(_)
            | AuthError::View(_)
            | AuthError::Header(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details travel as the source, which is logged but never
    /// rendered; the client only sees the kind.
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::InvalidCredentials => {
                tracing::debug!("Rejected credentials reached the error path");
                AppError::new(self.kind(), INVALID_CREDENTIALS_MESSAGE)
            }
            other => AppError::new(other.kind(), "Something went wrong").with_source(other),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.into_app_error().into_response()
    }
}

/// Invalid security configuration, detected before serving traffic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "The signing secret is too short: need at least {min} characters. \
         Perhaps the SECRET environment variable is not set correctly?"
    )]
    SecretTooShort { min: usize },

    #[error("{field} is not set")]
    MissingUrl { field: &'static str },

    #[error("{field} must be an absolute path or http(s) URL, got {value:?}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Sign-in and sign-out URLs must differ, both are {0:?}")]
    ConflictingUrls(String),

    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },

    #[error("Cookie name {0:?} is not a valid token")]
    InvalidCookieName(String),
}

/// Failure to build a credential table from its source
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read credentials from {origin}: {error}")]
    Io {
        origin: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Failed to parse credentials from {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Duplicate username {username} in {origin}")]
    DuplicateUsername { username: String, origin: String },

    #[error("Credential load task failed: {0}")]
    Task(String),
}

/// Token verification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Not a structurally valid token
    #[error("Malformed token")]
    Malformed,

    /// Signature does not match, or an unaccepted algorithm was used
    #[error("Bad token signature")]
    BadSignature,

    /// Token is older than the configured maximum age
    #[error("Token expired")]
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_is_generic() {
        let app_err = AuthError::InvalidCredentials.into_app_error();
        assert_eq!(app_err.status_code(), 401);
        assert_eq!(app_err.message(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AuthError::Internal("table lock poisoned".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let app_err = err.into_app_error();
        assert!(!app_err.message().contains("poisoned"));
        assert_eq!(
            std::error::Error::source(&app_err).map(ToString::to_string).as_deref(),
            Some("Internal error: table lock poisoned")
        );
    }

    #[test]
    fn test_duplicate_username_names_source() {
        let err = LoadError::DuplicateUsername {
            username: "hello".to_string(),
            origin: "users.yml".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate username hello in users.yml");
    }
}
