//! Client credential extraction
//!
//! Common functions for reading the credentials a client presents in
//! HTTP headers.

use axum::http::{HeaderMap, header};

const BEARER_PREFIX: &str = "bearer ";

/// Extract a token from the `Authorization` header
///
/// A case-insensitive `Bearer ` prefix is stripped. A header value without
/// the prefix is returned as-is so that clients sending a bare token keep
/// working. Empty values yield `None`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();

    let token = match value.get(..BEARER_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => {
            value[BEARER_PREFIX.len()..].trim_start()
        }
        _ => value,
    };

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_prefix_any_case() {
        for value in ["Bearer abc.def", "bearer abc.def", "BEARER abc.def"] {
            assert_eq!(
                extract_bearer_token(&headers_with(value)),
                Some("abc.def".to_string())
            );
        }
    }

    #[test]
    fn test_bare_token() {
        assert_eq!(
            extract_bearer_token(&headers_with("abc.def")),
            Some("abc.def".to_string())
        );
    }

    #[test]
    fn test_missing_or_empty() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearer ")), None);
    }

    #[test]
    fn test_short_value_does_not_panic() {
        assert_eq!(
            extract_bearer_token(&headers_with("abc")),
            Some("abc".to_string())
        );
    }
}
