//! Auth Middleware
//!
//! `with_user` attaches the caller's identity to every request; guards built
//! from [`ClaimsGuard`] gate routes on that identity.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/admin", get(admin))
//!     .route_layer(from_fn_with_state(auth.has_claims(|c| c.flag("admin")), require_claims))
//!     .layer(from_fn_with_state(auth.clone(), with_user));
//! ```

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use platform::client::extract_bearer_token;
use platform::cookie::{CookieConfig, extract_cookie};
use serde::Serialize;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::domain::value_object::Claims;
use crate::error::{AuthError, ConfigError};
use crate::presentation::dto::ForbiddenView;
use crate::presentation::view::{ViewError, ViewRenderer, render_view};

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub config: Arc<AuthConfig>,
    pub codec: Arc<TokenCodec>,
    pub views: Arc<dyn ViewRenderer>,
}

impl AuthMiddlewareState {
    /// Validate the configuration and build the state
    pub fn new(
        config: AuthConfig,
        codec: TokenCodec,
        views: Arc<dyn ViewRenderer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            codec: Arc::new(codec),
            views,
        })
    }

    /// Guard that admits any signed-in user
    pub fn signed_in(&self) -> ClaimsGuard {
        ClaimsGuard {
            state: self.clone(),
            predicate: None,
        }
    }

    /// Guard that admits signed-in users whose claims satisfy `predicate`
    pub fn has_claims<P>(&self, predicate: P) -> ClaimsGuard
    where
        P: Fn(&Claims) -> bool + Send + Sync + 'static,
    {
        ClaimsGuard {
            state: self.clone(),
            predicate: Some(Arc::new(predicate)),
        }
    }

    /// Token cookie settings; `Max-Age` follows the token lifetime
    pub fn cookie(&self) -> CookieConfig {
        self.config.cookie(self.codec.max_age())
    }

    /// Identity carried by a request, if any
    ///
    /// The cookie is checked first, then the `Authorization` header. A token
    /// that fails verification is treated as no token.
    pub fn identify(&self, headers: &HeaderMap) -> Option<AuthContext> {
        let token = extract_cookie(headers, &self.config.cookie_name)
            .filter(|token| !token.is_empty())
            .or_else(|| extract_bearer_token(headers))?;

        match self.codec.verify(&token) {
            Ok(claims) => Some(AuthContext { claims }),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid auth token");
                None
            }
        }
    }

    pub(crate) fn render<T>(&self, view: &str, data: &T) -> Result<Html<String>, ViewError>
    where
        T: Serialize,
    {
        render_view(self.views.as_ref(), view, data)
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Identity of a signed-in caller, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthContext {
    claims: Claims,
}

impl AuthContext {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn username(&self) -> Option<&str> {
        self.claims.username()
    }
}

/// Extractor for the caller's claims; `None` for anonymous callers
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Claims>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(
            parts
                .extensions
                .get::<AuthContext>()
                .map(|ctx| ctx.claims.clone()),
        ))
    }
}

/// Middleware that attaches the caller's identity, if any; never rejects
pub async fn with_user(
    State(state): State<AuthMiddlewareState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(ctx) = state.identify(req.headers()) {
        req.extensions_mut().insert(ctx);
    }
    next.run(req).await
}

/// Fixed identity for local debugging
#[derive(Debug, Clone)]
pub struct StaticUser(Claims);

impl StaticUser {
    pub fn new(claims: Claims) -> Self {
        tracing::warn!(
            username = claims.username().unwrap_or_default(),
            "Every request will be treated as signed in; use for local debugging only"
        );
        Self(claims)
    }
}

/// Middleware that attaches a fixed identity to every request
pub async fn with_static_user(
    State(user): State<StaticUser>,
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut().insert(AuthContext::new(user.0));
    next.run(req).await
}

// ============================================================================
// Guards
// ============================================================================

type ClaimsPredicate = Arc<dyn Fn(&Claims) -> bool + Send + Sync>;

/// Access rule for [`require_claims`]
#[derive(Clone)]
pub struct ClaimsGuard {
    state: AuthMiddlewareState,
    predicate: Option<ClaimsPredicate>,
}

impl ClaimsGuard {
    fn admits(&self, claims: &Claims) -> bool {
        self.predicate
            .as_ref()
            .is_none_or(|predicate| predicate(claims))
    }

    fn forbidden(&self, claims: &Claims) -> Response {
        let config = &self.state.config;
        let data = ForbiddenView {
            title: &config.forbidden_title,
            sign_in_url: &config.sign_in_url,
            sign_out_url: &config.sign_out_url,
            user: claims,
        };

        match self.state.render(&config.views.forbidden, &data) {
            Ok(page) => (StatusCode::FORBIDDEN, page).into_response(),
            Err(e) => AuthError::from(e).into_response(),
        }
    }
}

impl fmt::Debug for ClaimsGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimsGuard")
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Guard middleware
///
/// Anonymous callers are redirected to the sign-in page; signed-in callers
/// the guard does not admit get the forbidden view with status 403.
pub async fn require_claims(
    State(guard): State<ClaimsGuard>,
    req: Request,
    next: Next,
) -> Response {
    let Some(ctx) = req.extensions().get::<AuthContext>() else {
        tracing::debug!(path = %req.uri().path(), "Not signed in, redirecting to sign-in");
        return Redirect::to(&guard.state.config.sign_in_url).into_response();
    };

    if !guard.admits(ctx.claims()) {
        tracing::debug!(
            path = %req.uri().path(),
            username = ctx.username().unwrap_or_default(),
            "Claims check failed"
        );
        return guard.forbidden(ctx.claims());
    }

    next.run(req).await
}
