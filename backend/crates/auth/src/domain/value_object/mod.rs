//! Value Object Module

pub mod claims;
pub mod username;

pub use claims::Claims;
pub use username::Username;
