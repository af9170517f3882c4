//! Infrastructure Layer
//!
//! Credential sources and the hot-reloading store.

pub mod memory;
pub mod store;
pub mod watcher;
pub mod yaml_file;

pub use memory::{FnCredentials, StaticCredentials};
pub use store::CredentialStore;
pub use watcher::{CredentialWatcher, ReloadTrigger, WatchConfig};
pub use yaml_file::YamlCredentialFile;
