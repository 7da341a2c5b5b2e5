//! Push, pull-and-reconcile, and the pending-sync flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{merge_saves, Merged, SaveRecord, SaveSource, SaveSync, SyncError};
use crate::store::SaveStore;

/// Reconciles the local save with a remote one.
///
/// `pending` is true while the local save is known to be ahead of the last
/// successful push. Failures set it; nothing here retries on its own.
/// Clones share the flag.
#[derive(Clone)]
pub struct SaveReconciler {
    remote: Option<Arc<dyn SaveSync>>,
    local: SaveStore,
    pending: Arc<AtomicBool>,
}

impl std::fmt::Debug for SaveReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveReconciler")
            .field("configured", &self.remote.is_some())
            .field("pending", &self.has_pending())
            .finish()
    }
}

impl SaveReconciler {
    pub fn new(local: SaveStore, remote: Option<Arc<dyn SaveSync>>) -> Self {
        Self {
            remote,
            local,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn mark_pending(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }

    fn remote(&self) -> Result<&Arc<dyn SaveSync>, SyncError> {
        self.remote.as_ref().ok_or(SyncError::Unavailable)
    }

    /// Send `record` to the remote. Success clears the pending flag; any
    /// failure sets it.
    pub async fn push(&self, profile_id: &str, record: &SaveRecord) -> Result<(), SyncError> {
        let remote = self.remote()?;
        match remote.upsert(profile_id, record).await {
            Ok(()) => {
                self.pending.store(false, Ordering::SeqCst);
                debug!(profile_id, "save pushed");
                Ok(())
            }
            Err(e) => {
                self.mark_pending();
                warn!(profile_id, error = %e, "save push failed");
                Err(e)
            }
        }
    }

    /// Fetch the remote save, pick a winner against `local`, write the winner
    /// to local storage, and push it when local won.
    ///
    /// After a successful pass both sides hold the same record.
    pub async fn pull_and_reconcile(
        &self,
        profile_id: &str,
        local: Option<SaveRecord>,
    ) -> Result<Option<Merged>, SyncError> {
        let remote = self.remote()?;
        let fetched = match remote.fetch(profile_id).await {
            Ok(fetched) => fetched,
            Err(e) => {
                self.mark_pending();
                warn!(profile_id, error = %e, "could not fetch remote save");
                return Err(e);
            }
        };

        let Some(merged) = merge_saves(local, fetched) else {
            return Ok(None);
        };
        self.local.write_record(&merged.record)?;
        debug!(profile_id, source = ?merged.source, "reconciled save");

        if merged.source == SaveSource::Local {
            self.push(profile_id, &merged.record).await?;
        }
        Ok(Some(merged))
    }

    /// Push `record` if a previous push failed. `Ok(false)` when nothing was
    /// pending.
    pub async fn retry_pending(&self, profile_id: &str, record: &SaveRecord) -> Result<bool, SyncError> {
        if !self.has_pending() {
            return Ok(false);
        }
        self.push(profile_id, record).await?;
        Ok(true)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::progression::ProgressionState;

    /// Remote double with a failure switch and an upsert counter.
    #[derive(Default)]
    pub(crate) struct FlakyRemote {
        pub saves: Mutex<HashMap<String, SaveRecord>>,
        pub failing: AtomicBool,
        pub upserts: Mutex<Vec<SaveRecord>>,
    }

    #[async_trait]
    impl SaveSync for FlakyRemote {
        async fn fetch(&self, profile_id: &str) -> Result<Option<SaveRecord>, SyncError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(SyncError::Failed("offline".into()));
            }
            Ok(self.saves.lock().unwrap().get(profile_id).cloned())
        }

        async fn upsert(&self, profile_id: &str, record: &SaveRecord) -> Result<(), SyncError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(SyncError::Failed("offline".into()));
            }
            self.upserts.lock().unwrap().push(record.clone());
            self.saves
                .lock()
                .unwrap()
                .insert(profile_id.to_string(), record.clone());
            Ok(())
        }
    }

    fn record_at(day: u32, coins: u64) -> SaveRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).single().unwrap();
        let mut state = ProgressionState::fresh(at);
        state.player.coins = coins;
        state.to_record().unwrap()
    }

    fn setup() -> (SaveReconciler, Arc<FlakyRemote>, SaveStore) {
        let remote = Arc::new(FlakyRemote::default());
        let local = SaveStore::in_memory();
        let reconciler = SaveReconciler::new(local.clone(), Some(remote.clone()));
        (reconciler, remote, local)
    }

    #[tokio::test]
    async fn test_push_without_remote_is_unavailable() {
        let reconciler = SaveReconciler::new(SaveStore::in_memory(), None);
        let result = reconciler.push("id", &record_at(1, 0)).await;
        assert!(matches!(result, Err(SyncError::Unavailable)));
        assert!(!reconciler.has_pending());
    }

    #[tokio::test]
    async fn test_failed_push_sets_pending_and_retry_clears() {
        let (reconciler, remote, _) = setup();
        remote.failing.store(true, Ordering::SeqCst);
        assert!(reconciler.push("id", &record_at(1, 0)).await.is_err());
        assert!(reconciler.has_pending());

        // still offline: flag stays
        assert!(reconciler.retry_pending("id", &record_at(1, 0)).await.is_err());
        assert!(reconciler.has_pending());

        remote.failing.store(false, Ordering::SeqCst);
        assert!(reconciler.retry_pending("id", &record_at(1, 0)).await.unwrap());
        assert!(!reconciler.has_pending());
        assert!(!reconciler.retry_pending("id", &record_at(1, 0)).await.unwrap());
    }

    #[tokio::test]
    async fn test_remote_newer_wins_and_is_written_locally() {
        let (reconciler, remote, local) = setup();
        remote
            .saves
            .lock()
            .unwrap()
            .insert("id".into(), record_at(3, 50));

        let merged = reconciler
            .pull_and_reconcile("id", Some(record_at(2, 5)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(merged.source, SaveSource::Remote);
        assert_eq!(local.load_state().unwrap().unwrap().player.coins, 50);
        assert!(remote.upserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_newer_is_pushed() {
        let (reconciler, remote, local) = setup();
        remote
            .saves
            .lock()
            .unwrap()
            .insert("id".into(), record_at(3, 50));

        let merged = reconciler
            .pull_and_reconcile("id", Some(record_at(9, 5)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(merged.source, SaveSource::Local);
        assert_eq!(local.load_state().unwrap().unwrap().player.coins, 5);
        assert_eq!(remote.saves.lock().unwrap()["id"], record_at(9, 5));
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_pending() {
        let (reconciler, remote, local) = setup();
        remote.failing.store(true, Ordering::SeqCst);
        let result = reconciler.pull_and_reconcile("id", Some(record_at(1, 1))).await;
        assert!(result.is_err());
        assert!(reconciler.has_pending());
        assert!(local.load_state().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_remote_gets_local() {
        let (reconciler, remote, _) = setup();
        reconciler
            .pull_and_reconcile("id", Some(record_at(1, 3)))
            .await
            .unwrap();
        assert_eq!(remote.upserts.lock().unwrap().len(), 1);
    }
}
