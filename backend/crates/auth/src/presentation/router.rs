//! Auth Router

use axum::{Router, routing::any};

use crate::domain::repository::CredentialResolver;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router for any credential resolver
///
/// Mounts the sign-in and sign-out URLs from the state's configuration.
/// Layer `with_user` around the merged application router so sign-out sees
/// the caller's identity.
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: CredentialResolver + Send + Sync + 'static,
{
    let sign_in_url = state.auth.config.sign_in_url.clone();
    let sign_out_url = state.auth.config.sign_out_url.clone();

    Router::new()
        .route(&sign_in_url, any(handlers::sign_in::<R>))
        .route(&sign_out_url, any(handlers::sign_out))
        .with_state(state)
}
