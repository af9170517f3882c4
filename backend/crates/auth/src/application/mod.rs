//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod sign_in;
pub mod token;

// Re-exports
pub use config::{AuthConfig, SignInRedirect, ViewNames};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use token::TokenCodec;
