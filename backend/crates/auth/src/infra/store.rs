//! Hot-Reloading Credential Store
//!
//! Holds exactly one [`CredentialTable`] and replaces it whole on reload.
//! Readers clone the current `Arc` under a read lock held only for the
//! clone, so a lookup always runs against one consistent snapshot.

use std::fmt;
use std::fs::Metadata;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use tokio::sync::Mutex;

use crate::domain::entity::{CredentialTable, UserRecord};
use crate::domain::repository::{CredentialLoader, CredentialResolver};
use crate::domain::value_object::Claims;
use crate::error::{AuthError, AuthResult, LoadError};

pub struct CredentialStore<L> {
    inner: Arc<StoreInner<L>>,
}

struct StoreInner<L> {
    loader: Arc<L>,
    table: RwLock<Arc<CredentialTable>>,
    /// Source file metadata read just before the current table was loaded
    stamp: RwLock<Option<FileStamp>>,
    /// Serializes reloads so an older load never overwrites a newer one
    reload_lock: Mutex<()>,
}

impl<L> Clone for CredentialStore<L> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<L> fmt::Debug for CredentialStore<L>
where
    L: CredentialLoader,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("origin", &self.origin())
            .field("users", &self.len())
            .finish()
    }
}

impl<L> CredentialStore<L>
where
    L: CredentialLoader,
{
    /// Load the initial table; fails if the source cannot be loaded
    pub async fn open(loader: L) -> Result<Self, LoadError> {
        let loader = Arc::new(loader);
        let (table, stamp) = load_table(loader.clone()).await?;

        tracing::info!(
            origin = %loader.origin(),
            users = table.len(),
            "Credentials loaded"
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                loader,
                table: RwLock::new(Arc::new(table)),
                stamp: RwLock::new(stamp),
                reload_lock: Mutex::new(()),
            }),
        })
    }

    /// Load the source again and publish the new table
    ///
    /// On failure the previous table stays in place and the error is
    /// returned. Returns the number of users in the new table.
    pub async fn reload(&self) -> Result<usize, LoadError> {
        let _guard = self.inner.reload_lock.lock().await;

        match load_table(self.inner.loader.clone()).await {
            Ok((table, stamp)) => {
                let users = table.len();
                *self
                    .inner
                    .table
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
                *self
                    .inner
                    .stamp
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = stamp;

                tracing::info!(origin = %self.origin(), users, "Credentials reloaded");
                Ok(users)
            }
            Err(e) => {
                tracing::warn!(
                    origin = %self.origin(),
                    error = %e,
                    "Failed to reload credentials, keeping previous table"
                );
                Err(e)
            }
        }
    }

    /// Current table
    pub fn snapshot(&self) -> Arc<CredentialTable> {
        self.inner
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current record for a username, without checking a password
    pub fn get_user(&self, username: &str) -> Option<UserRecord> {
        self.snapshot().get(username).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn origin(&self) -> &str {
        self.inner.loader.origin()
    }

    pub fn watch_path(&self) -> Option<&Path> {
        self.inner.loader.watch_path()
    }

    /// Metadata of the watched file as seen by the last successful load
    pub(crate) fn source_stamp(&self) -> Option<FileStamp> {
        *self
            .inner
            .stamp
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<L> CredentialResolver for CredentialStore<L>
where
    L: CredentialLoader,
{
    async fn lookup(&self, username: &str, password: &str) -> AuthResult<Claims> {
        self.snapshot()
            .authenticate(username, password)
            .ok_or(AuthError::InvalidCredentials)
    }
}

/// Modification time and length of a watched file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    pub(crate) fn from_metadata(meta: &Metadata) -> Self {
        Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        }
    }
}

async fn load_table<L>(loader: Arc<L>) -> Result<(CredentialTable, Option<FileStamp>), LoadError>
where
    L: CredentialLoader,
{
    // Offload blocking file I/O to a dedicated thread
    tokio::task::spawn_blocking(move || {
        // Stat before reading so a write during the load still differs
        let stamp = loader
            .watch_path()
            .and_then(|path| std::fs::metadata(path).ok())
            .map(|meta| FileStamp::from_metadata(&meta));
        let records = loader.load()?;
        let table = CredentialTable::from_records(loader.origin(), records)?;
        Ok((table, stamp))
    })
    .await
    .map_err(|e| LoadError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::RawUserRecord;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const USERS: usize = 50;

    /// Loader whose content is switched by the test
    #[derive(Default)]
    struct Control {
        generation: AtomicUsize,
        fail: AtomicBool,
        duplicate: AtomicBool,
        loads: AtomicUsize,
    }

    struct TestLoader(Arc<Control>);

    impl CredentialLoader for TestLoader {
        fn origin(&self) -> &str {
            "test"
        }

        fn load(&self) -> Result<Vec<(String, RawUserRecord)>, LoadError> {
            self.0.loads.fetch_add(1, Ordering::SeqCst);
            if self.0.fail.load(Ordering::SeqCst) {
                return Err(LoadError::Parse {
                    origin: "test".to_string(),
                    message: "broken".to_string(),
                });
            }

            let generation = self.0.generation.load(Ordering::SeqCst);
            let mut records: Vec<_> = (0..USERS)
                .map(|i| {
                    let mut claims = Claims::new();
                    claims.insert("generation", generation);
                    (
                        format!("user{i}"),
                        RawUserRecord::new(format!("gen{generation}"), claims),
                    )
                })
                .collect();
            if self.0.duplicate.load(Ordering::SeqCst) {
                records.push(("USER0".to_string(), RawUserRecord::default()));
            }
            Ok(records)
        }
    }

    async fn open() -> (CredentialStore<TestLoader>, Arc<Control>) {
        let control = Arc::new(Control::default());
        let store = CredentialStore::open(TestLoader(control.clone())).await.unwrap();
        (store, control)
    }

    #[tokio::test]
    async fn test_open_and_lookup() {
        let (store, _) = open().await;
        assert_eq!(store.len(), USERS);

        let claims = store.lookup("USER1", "gen0").await.unwrap();
        assert_eq!(claims.username(), Some("user1"));
        assert_eq!(claims.get("generation"), Some(&serde_json::json!(0)));

        assert!(matches!(
            store.lookup("user1", "gen1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(store.get_user("User1").is_some());
        assert!(store.get_user("nobody").is_none());
    }

    #[tokio::test]
    async fn test_open_fails_on_bad_source() {
        let control = Arc::new(Control::default());
        control.duplicate.store(true, Ordering::SeqCst);
        let err = CredentialStore::open(TestLoader(control)).await.unwrap_err();
        assert_eq!(err.to_string(), "Duplicate username USER0 in test");
    }

    #[tokio::test]
    async fn test_debug_shows_origin_only() {
        let (store, _) = open().await;
        let debug_output = format!("{store:?}");
        assert!(debug_output.contains("origin: \"test\""));
        assert!(debug_output.contains("users: 50"));
        assert!(!debug_output.contains("gen0"));
    }

    #[tokio::test]
    async fn test_reload_publishes_new_table() {
        let (store, control) = open().await;
        control.generation.store(1, Ordering::SeqCst);

        assert_eq!(store.reload().await.unwrap(), USERS);
        assert!(store.lookup("user1", "gen0").await.is_err());
        assert!(store.lookup("user1", "gen1").await.is_ok());
    }

    #[tokio::test]
    async fn test_reload_unchanged_content() {
        let (store, _) = open().await;
        let before = store.lookup("user7", "gen0").await.unwrap();
        store.reload().await.unwrap();
        assert_eq!(store.lookup("user7", "gen0").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_table() {
        let (store, control) = open().await;
        let before = store.snapshot();

        control.generation.store(1, Ordering::SeqCst);
        control.fail.store(true, Ordering::SeqCst);
        assert!(matches!(store.reload().await, Err(LoadError::Parse { .. })));

        control.fail.store(false, Ordering::SeqCst);
        control.duplicate.store(true, Ordering::SeqCst);
        assert!(matches!(
            store.reload().await,
            Err(LoadError::DuplicateUsername { .. })
        ));

        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert!(store.lookup("user1", "gen0").await.is_ok());
    }

    #[tokio::test]
    async fn test_lookup_keeps_its_snapshot() {
        let (store, control) = open().await;
        let snapshot = store.snapshot();

        control.generation.store(1, Ordering::SeqCst);
        store.reload().await.unwrap();

        assert!(snapshot.authenticate("user1", "gen0").is_some());
        assert!(store.snapshot().authenticate("user1", "gen0").is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lookups_see_whole_tables() {
        let (store, control) = open().await;

        let reloader = {
            let store = store.clone();
            let control = control.clone();
            tokio::spawn(async move {
                for generation in 1..=20 {
                    control.generation.store(generation, Ordering::SeqCst);
                    store.reload().await.unwrap();
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let table = store.snapshot();
                    let generations: std::collections::HashSet<_> = table
                        .usernames()
                        .map(|name| {
                            let record = table.get(name.as_str()).unwrap();
                            record.claims.get("generation").and_then(|g| g.as_u64())
                        })
                        .collect();
                    assert_eq!(generations.len(), 1, "mixed table observed");
                    tokio::task::yield_now().await;
                }
            }));
        }

        reloader.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        assert!(store.lookup("user0", "gen20").await.is_ok());
    }
}
