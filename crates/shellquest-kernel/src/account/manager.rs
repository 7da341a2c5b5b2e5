use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{Account, AccountError, ProfileService, validate_username};
use crate::progression::ProgressionState;
use crate::store::{STATE_KEY, SaveStore, StoreError};
use crate::sync::{SaveRecord, SaveReconciler, SaveSource};

/// Runs `signup`, `login`, `logout`, `whoami` and `sync` against the live
/// progression state.
///
/// Without a profile service every account is local: a named snapshot in
/// the account cache. With one, accounts are cloud profiles whose saves go
/// through the [`SaveReconciler`].
#[derive(Clone)]
pub struct AccountManager {
    profiles: Option<Arc<dyn ProfileService>>,
    reconciler: SaveReconciler,
    store: SaveStore,
}

impl std::fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountManager")
            .field("cloud", &self.profiles.is_some())
            .field("reconciler", &self.reconciler)
            .finish_non_exhaustive()
    }
}

fn record_of(state: &ProgressionState) -> Result<SaveRecord, AccountError> {
    state.to_record().map_err(|source| {
        AccountError::Storage(StoreError::ParseFailure {
            key: STATE_KEY.to_string(),
            source,
        })
    })
}

fn pending_line(e: &AccountError) -> String {
    format!("Cloud sync pending: {e}. Progress is kept locally and will sync later.")
}

impl AccountManager {
    pub fn new(
        store: SaveStore,
        reconciler: SaveReconciler,
        profiles: Option<Arc<dyn ProfileService>>,
    ) -> Self {
        Self {
            profiles,
            reconciler,
            store,
        }
    }

    /// An account manager with no remote: local accounts only.
    pub fn local(store: SaveStore) -> Self {
        let reconciler = SaveReconciler::new(store.clone(), None);
        Self::new(store, reconciler, None)
    }

    pub fn is_cloud(&self) -> bool {
        self.profiles.is_some()
    }

    pub fn reconciler(&self) -> &SaveReconciler {
        &self.reconciler
    }

    /// Snapshot the signed-in account (if any) into the account cache.
    fn stash(&self, state: &ProgressionState) -> Result<(), AccountError> {
        if let Some(account) = &state.account {
            self.store.cache_account(&account.cache_key(), state)?;
        }
        Ok(())
    }

    /// Start a new account. A guest's progress carries over; a signed-in
    /// player is stashed and the new account starts fresh.
    pub async fn signup(
        &self,
        raw: &str,
        state: &mut ProgressionState,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, AccountError> {
        let username = validate_username(raw)?;

        let account = match &self.profiles {
            None => {
                let account = Account::Local {
                    username: username.clone(),
                };
                if self.store.cached_account(&account.cache_key())?.is_some() {
                    return Err(AccountError::UsernameTaken(username));
                }
                account
            }
            Some(profiles) => {
                let profile = profiles.create_profile(&username).await?;
                Account::Cloud {
                    username: profile.username,
                    profile_id: profile.id,
                }
            }
        };

        if state.account.is_some() {
            self.stash(state)?;
            *state = ProgressionState::fresh(now);
        }
        state.account = Some(account.clone());
        state.touch(now);
        self.store.cache_account(&account.cache_key(), state)?;
        info!(account = %account, "account created");

        let mut lines = Vec::new();
        match &account {
            Account::Local { username } => lines.push(format!(
                "Local profile created for {username}. Progress is saved on this device."
            )),
            Account::Cloud {
                username,
                profile_id,
            } => {
                lines.push(format!("Cloud profile created for {username}."));
                match self.reconciler.push(profile_id, &record_of(state)?).await {
                    Ok(()) => lines.push("Progress synced.".to_string()),
                    Err(e) => lines.push(pending_line(&AccountError::from(e))),
                }
            }
        }
        Ok(lines)
    }

    /// Switch to an existing account, stashing the current one first.
    pub async fn login(
        &self,
        raw: &str,
        state: &mut ProgressionState,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, AccountError> {
        let username = validate_username(raw)?;
        if state
            .account
            .as_ref()
            .is_some_and(|a| a.username() == username)
        {
            return Ok(vec![format!("Already signed in as {username}.")]);
        }

        let Some(profiles) = &self.profiles else {
            let account = Account::Local {
                username: username.clone(),
            };
            let Some(cached) = self.store.cached_account(&account.cache_key())? else {
                return Err(AccountError::ProfileNotFound(username));
            };
            self.stash(state)?;
            *state = cached;
            state.account = Some(account.clone());
            info!(account = %account, "signed in");
            return Ok(vec![format!("Signed in as {username} (local).")]);
        };

        let profile = profiles
            .fetch_profile(&username)
            .await?
            .ok_or_else(|| AccountError::ProfileNotFound(username.clone()))?;
        let account = Account::Cloud {
            username: profile.username,
            profile_id: profile.id,
        };

        let was_guest = state.account.is_none();
        self.stash(state)?;
        match self.store.cached_account(&account.cache_key())? {
            Some(cached) => *state = cached,
            None if was_guest => {}
            None => *state = ProgressionState::fresh(now),
        }
        state.account = Some(account.clone());

        let mut lines = vec![format!("Signed in as {} (cloud).", account.username())];
        let profile_id = account.profile_id().unwrap_or_default();
        match self
            .reconciler
            .pull_and_reconcile(profile_id, Some(record_of(state)?))
            .await
        {
            Ok(Some(merged)) if merged.source == SaveSource::Remote => {
                *state = ProgressionState::from_record(&merged.record).map_err(|source| {
                    StoreError::ParseFailure {
                        key: STATE_KEY.to_string(),
                        source,
                    }
                })?;
                state.account = Some(account.clone());
                lines.push("Loaded newer progress from the cloud.".to_string());
            }
            Ok(_) => lines.push("Progress synced.".to_string()),
            Err(e) => lines.push(pending_line(&AccountError::from(e))),
        }
        self.store.cache_account(&account.cache_key(), state)?;
        info!(account = %account, "signed in");
        Ok(lines)
    }

    /// Stash the current account and continue as a fresh guest.
    pub fn logout(
        &self,
        state: &mut ProgressionState,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, AccountError> {
        let Some(account) = state.account.clone() else {
            return Err(AccountError::NotSignedIn);
        };
        self.stash(state)?;
        *state = ProgressionState::fresh(now);
        info!(account = %account, "signed out");
        Ok(vec![format!(
            "Signed out of {}. Playing as guest.",
            account.username()
        )])
    }

    pub fn whoami(&self, state: &ProgressionState) -> String {
        match &state.account {
            Some(account) => account.to_string(),
            None => "guest (not signed in)".to_string(),
        }
    }

    /// Push the current save for a cloud account.
    pub async fn sync(&self, state: &ProgressionState) -> Result<Vec<String>, AccountError> {
        match &state.account {
            None => Err(AccountError::NotSignedIn),
            Some(Account::Local { .. }) => Ok(vec!["Local profile; nothing to sync.".to_string()]),
            Some(Account::Cloud { profile_id, .. }) => {
                if !self.reconciler.is_configured() {
                    return Err(AccountError::SyncUnavailable);
                }
                match self.reconciler.push(profile_id, &record_of(state)?).await {
                    Ok(()) => Ok(vec!["All changes synced".to_string()]),
                    Err(e) => {
                        warn!(error = %e, "manual sync failed");
                        Ok(vec![pending_line(&AccountError::from(e))])
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::sync::{SaveSync, StoreRemote};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn cloud() -> (AccountManager, Arc<StoreRemote>, SaveStore) {
        let remote = Arc::new(StoreRemote::new(Arc::new(MemoryStore::new())));
        let store = SaveStore::in_memory();
        let reconciler = SaveReconciler::new(store.clone(), Some(remote.clone()));
        (
            AccountManager::new(store.clone(), reconciler, Some(remote.clone())),
            remote,
            store,
        )
    }

    #[tokio::test]
    async fn test_local_signup_adopts_guest_progress() {
        let accounts = AccountManager::local(SaveStore::in_memory());
        let mut state = ProgressionState::fresh(at(0));
        state.player.coins = 12;

        let lines = accounts.signup("Hero_One", &mut state, at(5)).await.unwrap();
        assert!(lines[0].starts_with("Local profile created for hero_one"));
        assert_eq!(state.player.coins, 12);
        assert_eq!(accounts.whoami(&state), "hero_one (local)");
    }

    #[tokio::test]
    async fn test_local_signup_rejects_duplicate_and_invalid() {
        let accounts = AccountManager::local(SaveStore::in_memory());
        let mut state = ProgressionState::fresh(at(0));
        accounts.signup("hero", &mut state, at(1)).await.unwrap();
        accounts.logout(&mut state, at(2)).unwrap();

        assert!(matches!(
            accounts.signup("hero", &mut state, at(3)).await,
            Err(AccountError::UsernameTaken(_))
        ));
        assert!(matches!(
            accounts.signup("9lives", &mut state, at(3)).await,
            Err(AccountError::InvalidUsername)
        ));
    }

    #[tokio::test]
    async fn test_logout_then_login_restores_snapshot() {
        let accounts = AccountManager::local(SaveStore::in_memory());
        let mut state = ProgressionState::fresh(at(0));
        accounts.signup("hero", &mut state, at(1)).await.unwrap();
        state.player.coins = 40;

        accounts.logout(&mut state, at(2)).unwrap();
        assert!(state.account.is_none());
        assert_eq!(state.player.coins, 0);
        assert_eq!(accounts.whoami(&state), "guest (not signed in)");

        accounts.login("hero", &mut state, at(3)).await.unwrap();
        assert_eq!(state.player.coins, 40);
        assert!(matches!(
            accounts.login("stranger", &mut state, at(4)).await,
            Err(AccountError::ProfileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_guest_cannot_logout_or_sync() {
        let accounts = AccountManager::local(SaveStore::in_memory());
        let mut state = ProgressionState::fresh(at(0));
        assert!(matches!(
            accounts.logout(&mut state, at(1)),
            Err(AccountError::NotSignedIn)
        ));
        assert!(matches!(
            accounts.sync(&state).await,
            Err(AccountError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_cloud_signup_pushes_progress() {
        let (accounts, remote, _) = cloud();
        let mut state = ProgressionState::fresh(at(0));
        state.player.coins = 9;

        let lines = accounts.signup("hero", &mut state, at(1)).await.unwrap();
        assert_eq!(lines, vec!["Cloud profile created for hero.", "Progress synced."]);

        let id = state.account.as_ref().and_then(Account::profile_id).unwrap().to_string();
        let pushed = remote.fetch(&id).await.unwrap().unwrap();
        assert_eq!(pushed.payload["player"]["coins"], 9);
        assert_eq!(accounts.sync(&state).await.unwrap(), vec!["All changes synced"]);
    }

    #[tokio::test]
    async fn test_cloud_signup_offline_is_soft_failure() {
        let (accounts, remote, _) = cloud();
        let mut state = ProgressionState::fresh(at(0));
        accounts.signup("hero", &mut state, at(1)).await.unwrap();

        remote.set_online(false);
        let lines = accounts.sync(&state).await.unwrap();
        assert!(lines[0].starts_with("Cloud sync pending"));
        assert!(accounts.reconciler().has_pending());
    }

    #[tokio::test]
    async fn test_cloud_login_loads_newer_remote_save() {
        let (accounts, remote, _) = cloud();
        let mut device_a = ProgressionState::fresh(at(0));
        accounts.signup("hero", &mut device_a, at(1)).await.unwrap();
        let id = device_a.account.as_ref().and_then(Account::profile_id).unwrap().to_string();

        device_a.player.coins = 77;
        device_a.touch(at(100));
        remote.upsert(&id, &device_a.to_record().unwrap()).await.unwrap();

        // a second device with its own local storage
        let store_b = SaveStore::in_memory();
        let accounts_b = AccountManager::new(
            store_b.clone(),
            SaveReconciler::new(store_b, Some(remote.clone())),
            Some(remote.clone()),
        );
        let mut device_b = ProgressionState::fresh(at(50));
        let lines = accounts_b.login("hero", &mut device_b, at(60)).await.unwrap();
        assert_eq!(lines[1], "Loaded newer progress from the cloud.");
        assert_eq!(device_b.player.coins, 77);
        assert_eq!(accounts_b.whoami(&device_b), "hero (cloud)");
    }

    #[tokio::test]
    async fn test_cloud_login_unknown_profile() {
        let (accounts, _, _) = cloud();
        let mut state = ProgressionState::fresh(at(0));
        assert!(matches!(
            accounts.login("ghost", &mut state, at(1)).await,
            Err(AccountError::ProfileNotFound(name)) if name == "ghost"
        ));
    }
}
