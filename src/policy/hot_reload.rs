use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info, warn};

use super::loader::{LoadError, PolicyLoader};
use super::PolicyStore;

/// Watch policy files for changes and broadcast fresh stores.
///
/// A reload always builds a new store and swaps the shared reference;
/// a live store is never mutated.
pub struct PolicyWatcher {
    loader: PolicyLoader,
    check_interval: Duration,
    last_fingerprint: Option<u64>,
}

impl PolicyWatcher {
    pub fn new(loader: PolicyLoader, check_interval: Duration) -> Self {
        PolicyWatcher {
            loader,
            check_interval,
            last_fingerprint: None,
        }
    }

    /// Start watching.
    ///
    /// Returns a receiver that yields a new `Arc<PolicyStore>` whenever
    /// the files change. If the initial load fails, an empty store is
    /// broadcast; evaluation against it surfaces `NoPolicyLoaded` rather
    /// than silently denying.
    pub fn start(mut self) -> (watch::Receiver<Arc<PolicyStore>>, tokio::task::JoinHandle<()>) {
        let initial = match self.loader.load() {
            Ok(store) => {
                self.last_fingerprint = self.loader.fingerprint().ok();
                info!(policies = store.len(), "Loaded initial policy store");
                Arc::new(store)
            }
            Err(e) => {
                error!(error = %e, "Failed to load initial policy store");
                Arc::new(PolicyStore::default())
            }
        };

        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut interval = interval(self.check_interval);

            loop {
                interval.tick().await;

                match self.check_for_updates(&tx) {
                    Ok(true) => info!("Policy store reloaded"),
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, "Error checking for policy updates"),
                }
            }
        });

        (rx, handle)
    }

    /// Reload and broadcast if the file contents changed.
    fn check_for_updates(
        &mut self,
        tx: &watch::Sender<Arc<PolicyStore>>,
    ) -> Result<bool, LoadError> {
        let fingerprint = self.loader.fingerprint()?;
        if self.last_fingerprint == Some(fingerprint) {
            return Ok(false);
        }

        let store = self.loader.load()?;
        info!(policies = store.len(), "Policy files changed");

        self.last_fingerprint = Some(fingerprint);
        let _ = tx.send(Arc::new(store));

        Ok(true)
    }
}
