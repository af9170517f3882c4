//! Application Configuration
//!
//! Configuration for the Auth application layer. The signing secret is not
//! part of this struct; it lives only inside [`TokenCodec`].
//!
//! [`TokenCodec`]: crate::application::token::TokenCodec

use std::time::Duration;

use platform::cookie::{CookieConfig, is_valid_cookie_name};

use crate::error::ConfigError;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// How a successful sign-in navigates to the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignInRedirect {
    /// 303 See Other with a `Location` header
    #[default]
    SeeOther,
    /// 200 with a `Refresh` header and the sign-in redirect view
    Refresh,
}

/// Names of the views the auth layer renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewNames {
    pub sign_in: String,
    pub signed_out: String,
    pub sign_in_redirect: String,
    pub forbidden: String,
}

impl Default for ViewNames {
    fn default() -> Self {
        Self {
            sign_in: "signIn".to_string(),
            signed_out: "signedOut".to_string(),
            sign_in_redirect: "signInRedirect".to_string(),
            forbidden: "403".to_string(),
        }
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Sign-in page; also where guards redirect anonymous callers
    pub sign_in_url: String,
    pub sign_out_url: String,
    /// Destination after a successful sign-in
    pub dashboard_url: String,
    /// Token cookie name
    pub cookie_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    pub sign_in_redirect: SignInRedirect,
    pub views: ViewNames,
    /// Title passed to the forbidden view
    pub forbidden_title: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            sign_in_url: "/signin".to_string(),
            sign_out_url: "/signout".to_string(),
            dashboard_url: "/dashboard".to_string(),
            cookie_name: "jwt".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            sign_in_redirect: SignInRedirect::SeeOther,
            views: ViewNames::default(),
            forbidden_title: "Forbidden".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Check the configuration before serving traffic
    ///
    /// Sign-in and sign-out URLs are mounted as routes and must be absolute
    /// paths; the dashboard URL may also be an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_path("sign_in_url", &self.sign_in_url)?;
        check_path("sign_out_url", &self.sign_out_url)?;
        check_url("dashboard_url", &self.dashboard_url)?;

        if self.sign_in_url == self.sign_out_url {
            return Err(ConfigError::ConflictingUrls(self.sign_in_url.clone()));
        }
        if self.cookie_name.trim().is_empty() {
            return Err(ConfigError::EmptyName {
                field: "cookie_name",
            });
        }
        if !is_valid_cookie_name(&self.cookie_name) {
            return Err(ConfigError::InvalidCookieName(self.cookie_name.clone()));
        }

        if !self.cookie_secure {
            tracing::warn!(
                cookie = %self.cookie_name,
                "Auth cookie is not marked Secure; do not use this setting in production"
            );
        }
        Ok(())
    }

    /// Cookie settings for the token cookie
    pub fn cookie(&self, max_age: Option<Duration>) -> CookieConfig {
        CookieConfig {
            name: self.cookie_name.clone(),
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: max_age.map(|d| d.as_secs()),
        }
    }
}

fn check_path(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingUrl { field });
    }
    if !value.starts_with('/') || value.starts_with("//") || !is_header_safe(value) {
        return Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        if !is_header_safe(value) {
            return Err(ConfigError::InvalidUrl {
                field,
                value: value.to_string(),
            });
        }
        return Ok(());
    }
    check_path(field, value)
}

/// Redirects carry URLs in a `Location` header; only visible ASCII is safe
fn is_header_safe(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AuthConfig::default().validate().is_ok());
        assert!(AuthConfig::development().validate().is_ok());
    }

    #[test]
    fn test_missing_sign_in_url() {
        let config = AuthConfig {
            sign_in_url: String::new(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingUrl {
                field: "sign_in_url"
            })
        );
    }

    #[test]
    fn test_relative_url_rejected() {
        let config = AuthConfig {
            sign_out_url: "signout".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl {
                field: "sign_out_url",
                ..
            })
        ));
    }

    #[test]
    fn test_absolute_dashboard_url() {
        let config = AuthConfig {
            dashboard_url: "https://example.com/home".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_conflicting_urls() {
        let config = AuthConfig {
            sign_out_url: "/signin".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ConflictingUrls("/signin".to_string()))
        );
    }

    #[test]
    fn test_invalid_cookie_names() {
        for name in ["a=b", "jwé", "my cookie", "a;b"] {
            let config = AuthConfig {
                cookie_name: name.to_string(),
                ..Default::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidCookieName(name.to_string())),
                "{name:?}"
            );
        }
    }

    #[test]
    fn test_urls_must_fit_a_header() {
        let config = AuthConfig {
            sign_in_url: "/anmeldung-ü".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl {
                field: "sign_in_url",
                ..
            })
        ));

        let config = AuthConfig {
            dashboard_url: "https://example.com/\nhome".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl {
                field: "dashboard_url",
                ..
            })
        ));
    }

    #[test]
    fn test_cookie_settings() {
        let cookie = AuthConfig::default().cookie(Some(Duration::from_secs(3600)));
        assert_eq!(cookie.name, "jwt");
        assert!(cookie.secure);
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.max_age_secs, Some(3600));
        assert_eq!(AuthConfig::default().cookie(None).max_age_secs, None);
    }
}
