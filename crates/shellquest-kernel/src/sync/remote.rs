use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{SaveRecord, SaveSync, SyncError};
use crate::account::{AccountError, Profile, ProfileService, normalize_username};
use crate::store::{KeyValueStore, StoreError};

const PROFILES_KEY: &str = "remote-profiles";

fn save_key(profile_id: &str) -> String {
    format!("remote-save-{profile_id}")
}

/// A "cloud" living in any [`KeyValueStore`].
///
/// Profiles are one JSON map (username → profile); each profile's save is a
/// separate key. Point two kernels at the same directory store and they
/// behave like two devices sharing a backend. [`StoreRemote::set_online`]
/// simulates outages.
pub struct StoreRemote {
    store: Arc<dyn KeyValueStore>,
    online: AtomicBool,
}

impl std::fmt::Debug for StoreRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRemote")
            .field("online", &self.is_online())
            .finish_non_exhaustive()
    }
}

impl StoreRemote {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            online: AtomicBool::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), SyncError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(SyncError::Failed("remote offline".into()))
        }
    }

    fn profiles(&self) -> Result<BTreeMap<String, Profile>, StoreError> {
        match self.store.get(PROFILES_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::ParseFailure {
                key: PROFILES_KEY.to_string(),
                source,
            }),
            None => Ok(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl ProfileService for StoreRemote {
    async fn create_profile(&self, username: &str) -> Result<Profile, AccountError> {
        self.ensure_online()?;
        let username = normalize_username(username);
        let mut profiles = self.profiles()?;
        if profiles.contains_key(&username) {
            return Err(AccountError::UsernameTaken(username));
        }

        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            username: username.clone(),
        };
        profiles.insert(username, profile.clone());
        let raw = serde_json::to_string(&profiles).map_err(|source| StoreError::ParseFailure {
            key: PROFILES_KEY.to_string(),
            source,
        })?;
        self.store.set(PROFILES_KEY, &raw)?;
        debug!(id = %profile.id, "remote profile created");
        Ok(profile)
    }

    async fn fetch_profile(&self, username: &str) -> Result<Option<Profile>, AccountError> {
        self.ensure_online()?;
        Ok(self.profiles()?.remove(&normalize_username(username)))
    }
}

#[async_trait]
impl SaveSync for StoreRemote {
    async fn fetch(&self, profile_id: &str) -> Result<Option<SaveRecord>, SyncError> {
        self.ensure_online()?;
        let key = save_key(profile_id);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(None);
        };
        let record = serde_json::from_str(&raw)
            .map_err(|source| SyncError::Local(StoreError::ParseFailure { key, source }))?;
        Ok(Some(record))
    }

    async fn upsert(&self, profile_id: &str, record: &SaveRecord) -> Result<(), SyncError> {
        self.ensure_online()?;
        let key = save_key(profile_id);
        let raw = serde_json::to_string(record).map_err(|source| StoreError::ParseFailure {
            key: key.clone(),
            source,
        })?;
        self.store.set(&key, &raw)?;
        Ok(())
    }
}
