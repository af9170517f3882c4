//! Credential Change Watcher
//!
//! Two background tasks keep a [`CredentialStore`] in sync with its source:
//!
//! - a **poller** compares the source file's modification time and length
//!   on every tick and sends a notification when they change;
//! - a **debouncer** coalesces notifications with a trailing-edge window
//!   that restarts on every further notification, then reloads once.
//!
//! Any other change source can feed the same path through a
//! [`ReloadTrigger`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};

use crate::domain::repository::CredentialLoader;
use crate::infra::store::{CredentialStore, FileStamp};

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// How often the source file's metadata is checked
    pub poll_interval: Duration,
    /// Quiet period required before a reload
    pub debounce: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            debounce: Duration::from_millis(200),
        }
    }
}

/// Sends change notifications to a watcher's debouncer
#[derive(Debug, Clone)]
pub struct ReloadTrigger {
    tx: mpsc::Sender<()>,
}

impl ReloadTrigger {
    /// Request a reload; returns `false` once the watcher is gone
    pub fn notify(&self) -> bool {
        match self.tx.try_send(()) {
            // A full channel already has a reload pending
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Closed(())) => false,
        }
    }
}

/// Handle to the background tasks; dropping it stops them
pub struct CredentialWatcher {
    trigger: ReloadTrigger,
    poller: Option<JoinHandle<()>>,
    debouncer: JoinHandle<()>,
}

impl CredentialWatcher {
    /// Start watching; must be called within a tokio runtime
    ///
    /// Sources without a watch path only reload through [`Self::trigger`].
    pub fn spawn<L>(store: CredentialStore<L>, config: WatchConfig) -> Self
    where
        L: CredentialLoader,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let trigger = ReloadTrigger { tx };

        // Compare against the file as it was loaded, not as it is when the
        // poller first runs
        let baseline = store.source_stamp();
        let poller = store.watch_path().map(Path::to_path_buf).map(|path| {
            tracing::debug!(path = %path.display(), "Watching credential source");
            tokio::spawn(poll(path, baseline, config.poll_interval, trigger.clone()))
        });
        let debouncer = tokio::spawn(debounce(store, rx, config.debounce));

        Self {
            trigger,
            poller,
            debouncer,
        }
    }

    pub fn trigger(&self) -> ReloadTrigger {
        self.trigger.clone()
    }

    /// Stop both tasks
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for CredentialWatcher {
    fn drop(&mut self) {
        if let Some(poller) = &self.poller {
            poller.abort();
        }
        self.debouncer.abort();
    }
}

async fn stamp(path: &Path) -> Option<FileStamp> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Some(FileStamp::from_metadata(&meta)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Cannot stat credential source");
            None
        }
    }
}

async fn poll(
    path: PathBuf,
    mut last: Option<FileStamp>,
    every: Duration,
    trigger: ReloadTrigger,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let current = stamp(&path).await;
        if current == last {
            continue;
        }
        last = current;

        tracing::debug!(path = %path.display(), "Credential source changed");
        if !trigger.notify() {
            break;
        }
    }
}

async fn debounce<L>(store: CredentialStore<L>, mut rx: mpsc::Receiver<()>, window: Duration)
where
    L: CredentialLoader,
{
    while rx.recv().await.is_some() {
        loop {
            tokio::select! {
                event = rx.recv() => {
                    if event.is_none() {
                        break;
                    }
                }
                () = sleep(window) => break,
            }
        }

        // Failures are logged by the store and the previous table is kept
        let _ = store.reload().await;
    }
}
