//! Problem Details Responses
//!
//! Renders [`AppError`] as `application/problem+json`. Server errors are
//! logged with their source here, at the HTTP boundary.

use std::error::Error;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use super::app_error::AppError;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.kind().is_server_error() {
            match self.source() {
                Some(source) => tracing::error!(error = %source, "{}", self.message()),
                None => tracing::error!("{}", self.message()),
            }
        }

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::json!({
            "type": "about:blank",
            "title": self.kind().title(),
            "status": self.status_code(),
            "detail": self.message(),
        });

        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    #[test]
    fn test_problem_response() {
        let resp = AppError::new(ErrorKind::Unauthorized, "Invalid credentials").into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/problem+json"
        );
    }

    #[test]
    fn test_server_error_with_source() {
        let resp = AppError::internal("Failed to render page")
            .with_source(std::io::Error::other("secret path /etc/users.yml"))
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
