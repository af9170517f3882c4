//! Entity Module

pub mod credential_table;
pub mod user_record;

pub use credential_table::CredentialTable;
pub use user_record::{RawUserRecord, UserRecord};
