//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{CredentialTable, RawUserRecord, UserRecord};
pub use repository::{CredentialLoader, CredentialResolver};
pub use value_object::{Claims, Username};
