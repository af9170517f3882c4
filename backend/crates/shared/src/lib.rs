//! Shared Kernel
//!
//! The error vocabulary every crate in the workspace agrees on: one
//! [`AppError`] type whose message is safe to show to users, and (with the
//! `axum` feature) its rendering as an RFC 9457 problem response.

pub mod error {
    pub mod app_error;
    pub mod kind;
    #[cfg(feature = "axum")]
    pub mod response;
}

pub use error::app_error::{AppError, AppResult};
pub use error::kind::ErrorKind;
