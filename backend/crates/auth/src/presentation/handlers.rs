//! HTTP Handlers

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, FromRef, OriginalUri, State};
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use platform::cookie::{delete_cookie_header, set_cookie_header};

use crate::application::config::SignInRedirect;
use crate::application::{SignInInput, SignInUseCase};
use crate::domain::repository::CredentialResolver;
use crate::error::{AuthError, AuthResult, INVALID_CREDENTIALS_MESSAGE};
use crate::presentation::dto::{SignInForm, SignInRedirectView, SignInView, SignedOutView};
use crate::presentation::middleware::{AuthMiddlewareState, CurrentUser};
use crate::presentation::view::ViewError;

/// Shared state for auth handlers
pub struct AuthAppState<R> {
    pub auth: AuthMiddlewareState,
    pub resolver: Arc<R>,
}

impl<R> AuthAppState<R> {
    pub fn new(auth: AuthMiddlewareState, resolver: R) -> Self {
        Self {
            auth,
            resolver: Arc::new(resolver),
        }
    }
}

impl<R> Clone for AuthAppState<R> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

impl<R> FromRef<AuthAppState<R>> for AuthMiddlewareState {
    fn from_ref(state: &AuthAppState<R>) -> Self {
        state.auth.clone()
    }
}

// ============================================================================
// Sign In
// ============================================================================

/// Any method on the sign-in URL
///
/// POST submits the form; every other method shows it. An identity already
/// attached to the request is ignored.
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    form: Result<Form<SignInForm>, FormRejection>,
) -> AuthResult<Response>
where
    R: CredentialResolver + Send + Sync + 'static,
{
    let auth = &state.auth;

    if method != Method::POST {
        return Ok(sign_in_page(auth, uri.path(), "", "")?.into_response());
    }

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable sign-in form, treating as empty");
            SignInForm::default()
        }
    };

    let use_case = SignInUseCase::new(state.resolver.clone(), auth.codec.clone());
    let input = SignInInput {
        username: form.username.clone(),
        password: form.password,
    };

    match use_case.execute(input).await {
        Ok(output) => signed_in_response(auth, &output.token),
        Err(AuthError::InvalidCredentials) => Ok(sign_in_page(
            auth,
            uri.path(),
            &form.username,
            INVALID_CREDENTIALS_MESSAGE,
        )?
        .into_response()),
        Err(e) => Err(e),
    }
}

fn sign_in_page(
    auth: &AuthMiddlewareState,
    action: &str,
    username: &str,
    error: &str,
) -> Result<Html<String>, ViewError> {
    let config = &auth.config;
    auth.render(
        &config.views.sign_in,
        &SignInView {
            title: "Sign In",
            username,
            password: "",
            sign_in_error: error,
            action,
            sign_in_url: &config.sign_in_url,
            sign_out_url: &config.sign_out_url,
        },
    )
}

fn signed_in_response(auth: &AuthMiddlewareState, token: &str) -> AuthResult<Response> {
    let cookie = set_cookie_header(&auth.cookie(), token)?;
    let dashboard_url = &auth.config.dashboard_url;

    match auth.config.sign_in_redirect {
        SignInRedirect::SeeOther => {
            Ok(([(header::SET_COOKIE, cookie)], Redirect::to(dashboard_url)).into_response())
        }
        SignInRedirect::Refresh => {
            let refresh = HeaderValue::from_str(&format!("0; url={dashboard_url}"))?;
            let page = auth.render(
                &auth.config.views.sign_in_redirect,
                &SignInRedirectView {
                    title: "Signing In",
                    dashboard_url,
                },
            )?;

            Ok((
                [
                    (header::SET_COOKIE, cookie),
                    (HeaderName::from_static("refresh"), refresh),
                ],
                page,
            )
                .into_response())
        }
    }
}

// ============================================================================
// Sign Out
// ============================================================================

/// Any method on the sign-out URL
pub async fn sign_out(
    State(auth): State<AuthMiddlewareState>,
    CurrentUser(user): CurrentUser,
) -> AuthResult<Response> {
    if let Some(username) = user.as_ref().and_then(|claims| claims.username()) {
        tracing::info!(username = %username, "User signed out");
    }

    let cookie = delete_cookie_header(&auth.cookie())?;
    let config = &auth.config;
    let page = auth.render(
        &config.views.signed_out,
        &SignedOutView {
            title: "Signed Out",
            sign_in_url: &config.sign_in_url,
            sign_out_url: &config.sign_out_url,
        },
    )?;

    Ok(([(header::SET_COOKIE, cookie)], page).into_response())
}
