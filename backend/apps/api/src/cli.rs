//! Command Line and Environment Configuration
//!
//! Every server setting can come from a flag or an environment variable;
//! `.env` is loaded before parsing.

use std::path::PathBuf;
use std::time::Duration;

use auth::{AuthConfig, ConfigError, TokenCodec, WatchConfig};
use clap::{ArgAction, Args, Parser, Subcommand};
use secrecy::SecretString;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sign-in demo server", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Read a password from stdin and print its Argon2id hash
    Hash,
    /// Print a user's record from the credential file
    User {
        /// Username, any case
        username: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Token signing secret, at least 8 characters
    #[arg(long, env = "SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// YAML credential file
    #[arg(long, env = "USERS_YML", default_value = "users.yml")]
    pub users_yml: PathBuf,

    #[arg(long, env = "SIGN_IN_URL", default_value = "/signin")]
    pub sign_in_url: String,

    #[arg(long, env = "SIGN_OUT_URL", default_value = "/signout")]
    pub sign_out_url: String,

    #[arg(long, env = "DASHBOARD_URL", default_value = "/dashboard")]
    pub dashboard_url: String,

    #[arg(long, env = "COOKIE_NAME", default_value = "jwt")]
    pub cookie_name: String,

    /// Set to false only when serving plain HTTP locally
    #[arg(long, env = "COOKIE_SECURE", default_value_t = true, action = ArgAction::Set)]
    pub cookie_secure: bool,

    /// Token lifetime; unset means valid until sign-out
    #[arg(long, env = "TOKEN_MAX_AGE_SECS")]
    pub token_max_age_secs: Option<u64>,

    /// How often the credential file is checked for changes
    #[arg(long, env = "USERS_POLL_MS", default_value_t = 1000)]
    pub users_poll_ms: u64,

    #[arg(long, env = "PORT", default_value_t = 9005)]
    pub port: u16,
}

impl ServerArgs {
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            sign_in_url: self.sign_in_url.clone(),
            sign_out_url: self.sign_out_url.clone(),
            dashboard_url: self.dashboard_url.clone(),
            cookie_name: self.cookie_name.clone(),
            cookie_secure: self.cookie_secure,
            ..AuthConfig::default()
        }
    }

    /// A missing secret is reported as too short
    pub fn token_codec(&self) -> Result<TokenCodec, ConfigError> {
        let secret = SecretString::from(self.secret.clone().unwrap_or_default());
        TokenCodec::new(secret, self.token_max_age_secs.map(Duration::from_secs))
    }

    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            poll_interval: Duration::from_millis(self.users_poll_ms.max(1)),
            ..WatchConfig::default()
        }
    }
}
