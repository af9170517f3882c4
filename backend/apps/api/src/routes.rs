//! Demo Routes
//!
//! Pages wired around the auth layer: a dashboard for any signed-in user and
//! a password hashing page for admins.

use auth::handlers::AuthAppState;
use auth::middleware::{AuthMiddlewareState, CurrentUser, require_claims, with_user};
use auth::views::ViewRenderer;
use auth::{Claims, CredentialResolver, auth_router};
use axum::Router;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, OriginalUri, State};
use axum::http::{Method, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{any, get};
use kernel::error::app_error::{AppError, AppResult};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

pub const HASH_PATH: &str = "/hash";

/// Build the application router
pub fn app<R>(auth: AuthMiddlewareState, resolver: R) -> Router
where
    R: CredentialResolver + Send + Sync + 'static,
{
    let signed_in = auth.signed_in();
    let is_admin = auth.has_claims(|claims| claims.flag("admin"));

    let mut pages = Router::new()
        .route(
            "/",
            get(home).route_layer(from_fn_with_state(signed_in.clone(), require_claims)),
        )
        .route(
            HASH_PATH,
            // `route_layer` on an `any` router has no method routes to wrap
            any(hash_page).layer(from_fn_with_state(is_admin, require_claims)),
        );

    // An absolute dashboard URL points at another service
    let dashboard_url = auth.config.dashboard_url.clone();
    let taken = [
        "/",
        HASH_PATH,
        auth.config.sign_in_url.as_str(),
        auth.config.sign_out_url.as_str(),
    ];
    if dashboard_url.starts_with('/') && !taken.contains(&dashboard_url.as_str()) {
        pages = pages.route(
            &dashboard_url,
            get(dashboard).route_layer(from_fn_with_state(signed_in, require_claims)),
        );
    }

    pages
        .fallback(not_found)
        .with_state(auth.clone())
        .merge(auth_router(AuthAppState::new(auth.clone(), resolver)))
        .layer(from_fn_with_state(auth, with_user))
        .layer(TraceLayer::new_for_http())
}

async fn home(State(auth): State<AuthMiddlewareState>) -> Redirect {
    Redirect::to(&auth.config.dashboard_url)
}

async fn dashboard(
    State(auth): State<AuthMiddlewareState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Html<String>> {
    render(
        &auth,
        "content",
        json!({
            "title": "Dashboard",
            "content": "<h1>Dashboard</h1><p>Hello!</p>",
            "user": user,
            "signOutUrl": auth.config.sign_out_url,
        }),
    )
}

async fn not_found(
    State(auth): State<AuthMiddlewareState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Response> {
    let page = render(
        &auth,
        "404",
        json!({
            "title": "Not Found",
            "user": user,
            "signOutUrl": auth.config.sign_out_url,
        }),
    )?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}

// ============================================================================
// Hash
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct HashForm {
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
}

/// Admin page that hashes a password for the credential file
async fn hash_page(
    State(auth): State<AuthMiddlewareState>,
    CurrentUser(user): CurrentUser,
    method: Method,
    OriginalUri(uri): OriginalUri,
    form: Result<Form<HashForm>, FormRejection>,
) -> AppResult<Html<String>> {
    let mut hash_error = "";
    let mut hashed = String::new();

    if method == Method::POST {
        let HashForm {
            password,
            confirm_password,
        } = form.map(|Form(form)| form).unwrap_or_default();

        if password.is_empty() {
            hash_error = "Please enter a password";
        } else if password != confirm_password {
            hash_error = "Passwords must match";
        } else {
            hashed = tokio::task::spawn_blocking(move || {
                platform::password::hash_password(&password)
            })
            .await
            .map_err(|e| AppError::internal("Password hashing failed").with_source(e))?
            .map_err(|e| AppError::internal("Password hashing failed").with_source(e))?;

            tracing::info!(
                username = user.as_ref().and_then(Claims::username).unwrap_or_default(),
                "Password hashed"
            );
        }
    }

    render(
        &auth,
        "hash",
        json!({
            "title": "Hash",
            "hashed": hashed,
            "hashError": hash_error,
            "action": uri.path(),
            "user": user,
            "signOutUrl": auth.config.sign_out_url,
        }),
    )
}

fn render(auth: &AuthMiddlewareState, view: &str, data: Value) -> AppResult<Html<String>> {
    auth.views
        .render(view, &data)
        .map(Html)
        .map_err(|e| AppError::internal("Failed to render page").with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::HtmlViews;
    use auth::{AuthConfig, StaticCredentials, TokenCodec};
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use std::sync::Arc;
    use tower::ServiceExt;

    const USERS: &str = "\
hello:
  password: world
admin:
  password: root
  claims:
    admin: true
";

    fn test_app() -> Router {
        let codec = TokenCodec::new(SecretString::from("reallysecret".to_string()), None).unwrap();
        let auth =
            AuthMiddlewareState::new(AuthConfig::development(), codec, Arc::new(HtmlViews)).unwrap();
        app(auth, StaticCredentials::from_yaml_str(USERS).unwrap())
    }

    async fn sign_in(app: &Router, body: &str) -> String {
        let req = Request::builder()
            .method("POST")
            .uri("/signin")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn hash_request(cookie: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(HASH_PATH)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn text(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_home_redirects() {
        let app = test_app();
        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.headers()[header::LOCATION], "/signin");

        let cookie = sign_in(&app, "username=hello&password=world").await;
        let req = Request::builder()
            .uri("/")
            .header(header::COOKIE, cookie.as_str())
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[header::LOCATION], "/dashboard");
    }

    #[tokio::test]
    async fn test_hash_redirects_anonymous() {
        let app = test_app();
        for method in ["GET", "POST"] {
            let req = Request::builder()
                .method(method)
                .uri(HASH_PATH)
                .body(Body::empty())
                .unwrap();
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{method}");
            assert_eq!(resp.headers()[header::LOCATION], "/signin");
        }
    }

    #[tokio::test]
    async fn test_hash_requires_admin() {
        let app = test_app();
        let cookie = sign_in(&app, "username=hello&password=world").await;
        let resp = app
            .clone()
            .oneshot(hash_request(&cookie, "password=a&confirm_password=a"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(text(resp).await.contains("hello is not allowed"));
    }

    #[tokio::test]
    async fn test_hash_page() {
        let app = test_app();
        let cookie = sign_in(&app, "username=admin&password=root").await;

        let resp = app
            .clone()
            .oneshot(hash_request(&cookie, "password=a&confirm_password=b"))
            .await
            .unwrap();
        assert!(text(resp).await.contains("Passwords must match"));

        let resp = app
            .clone()
            .oneshot(hash_request(&cookie, "password=&confirm_password="))
            .await
            .unwrap();
        assert!(text(resp).await.contains("Please enter a password"));

        let resp = app
            .clone()
            .oneshot(hash_request(&cookie, "password=secret&confirm_password=secret"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = text(resp).await;
        let start = html.find("<pre>").unwrap() + "<pre>".len();
        let end = html.find("</pre>").unwrap();
        assert!(platform::password::verify_password(&html[start..end], "secret"));
    }

    #[tokio::test]
    async fn test_not_found_page() {
        let resp = test_app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(text(resp).await.contains("Not Found"));
    }
}
