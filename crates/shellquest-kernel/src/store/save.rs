//! The game's two persisted keys.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{KeyValueStore, MemoryStore, StoreError};
use crate::progression::ProgressionState;
use crate::sync::SaveRecord;

/// Key holding the active progression snapshot.
pub const STATE_KEY: &str = "shellquest-state-v1";
/// Key holding the per-account snapshot cache.
pub const ACCOUNTS_KEY: &str = "shellquest-accounts-v1";

/// Account key (`local:<name>` / `cloud:<id>`) → snapshot.
pub type AccountCache = BTreeMap<String, ProgressionState>;

/// Typed access to the local save and the account cache.
#[derive(Clone)]
pub struct SaveStore {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SaveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveStore").finish_non_exhaustive()
    }
}

fn parse_failure(key: &str, source: serde_json::Error) -> StoreError {
    StoreError::ParseFailure {
        key: key.to_string(),
        source,
    }
}

impl SaveStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load the active snapshot. `Ok(None)` when nothing has been saved yet.
    pub fn load_state(&self) -> Result<Option<ProgressionState>, StoreError> {
        let Some(raw) = self.store.get(STATE_KEY)? else {
            return Ok(None);
        };
        ProgressionState::from_json(&raw)
            .map(Some)
            .map_err(|e| parse_failure(STATE_KEY, e))
    }

    pub fn save_state(&self, state: &ProgressionState) -> Result<(), StoreError> {
        let raw = serde_json::to_string(state).map_err(|e| parse_failure(STATE_KEY, e))?;
        self.store.set(STATE_KEY, &raw)
    }

    /// Drop the active snapshot (after a corrupt read).
    pub fn clear_state(&self) -> Result<(), StoreError> {
        self.store.remove(STATE_KEY)
    }

    /// The active snapshot as a save record.
    pub fn load_record(&self) -> Result<Option<SaveRecord>, StoreError> {
        match self.load_state()? {
            Some(state) => state
                .to_record()
                .map(Some)
                .map_err(|e| parse_failure(STATE_KEY, e)),
            None => Ok(None),
        }
    }

    /// Replace the active snapshot with a record's payload.
    pub fn write_record(&self, record: &SaveRecord) -> Result<(), StoreError> {
        let state = ProgressionState::from_record(record).map_err(|e| parse_failure(STATE_KEY, e))?;
        self.save_state(&state)
    }

    pub fn account_cache(&self) -> Result<AccountCache, StoreError> {
        match self.store.get(ACCOUNTS_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| parse_failure(ACCOUNTS_KEY, e)),
            None => Ok(AccountCache::new()),
        }
    }

    pub fn cached_account(&self, key: &str) -> Result<Option<ProgressionState>, StoreError> {
        Ok(self.account_cache()?.remove(key))
    }

    pub fn cache_account(&self, key: &str, state: &ProgressionState) -> Result<(), StoreError> {
        let mut cache = self.account_cache()?;
        cache.insert(key.to_string(), state.clone());
        let raw = serde_json::to_string(&cache).map_err(|e| parse_failure(ACCOUNTS_KEY, e))?;
        self.store.set(ACCOUNTS_KEY, &raw)
    }
}
