//! The Kernel: one player's session.
//!
//! The Kernel owns and coordinates every core component:
//! - Virtual filesystem (tree + CWD)
//! - Interpreter (simulated system, hint cooldown)
//! - Progression state and quest engine
//! - Local saves, account manager and save reconciler
//! - Debounced autosave (spawned lazily for cloud accounts)
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                          Kernel                            │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐  │
//! │  │ Interpreter  │─►│     VFS      │  │   QuestEngine    │  │
//! │  │  (dispatch)  │  │ (tree, CWD)  │  │ (checks, zones)  │  │
//! │  └──────┬───────┘  └──────────────┘  └────────┬─────────┘  │
//! │         ▼                                     ▼            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │        ProgressionState (log, quests, player)        │  │
//! │  └──────────────────────────┬───────────────────────────┘  │
//! │         ┌───────────────────┼──────────────────┐           │
//! │  ┌──────▼───────┐  ┌────────▼─────────┐  ┌─────▼───────┐   │
//! │  │  SaveStore   │  │  AccountManager  │  │  Autosaver  │   │
//! │  │   (local)    │  │ (signup, login)  │  │ (debounced) │   │
//! │  └──────────────┘  └──────────────────┘  └─────────────┘   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each turn runs the command, re-evaluates quests, stamps the state, saves
//! it locally, and (for cloud accounts) queues a debounced push.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, warn};

use crate::account::{Account, AccountManager, ProfileService};
use crate::completion::{Completion, CompletionCatalog};
use crate::interpreter::{ExecContext, ExecResult, Interpreter};
use crate::progression::ProgressionState;
use crate::quests::{CompletedQuest, QuestEngine, ZoneId};
use crate::store::{KeyValueStore, MemoryStore, SaveStore, StoreError};
use crate::sync::{Autosaver, SaveReconciler, SaveSource, SaveSync, StoreRemote, SyncError};
use crate::vfs::VirtualFileSystem;

/// Shown once after a corrupt local save was discarded.
pub const CORRUPT_SAVE_NOTICE: &str = "Saved progress was corrupt and has been reset.";

/// Configuration for kernel initialization.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Completed quests needed in a zone to unlock the next one.
    pub zone_unlock_threshold: u32,
    /// Quiet period before a cloud push.
    pub autosave_debounce: Duration,
    /// Coins earned per hour away.
    pub offline_coins_per_hour: u32,
    /// Hint cooldown before upgrades.
    pub hint_cooldown: Duration,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            zone_unlock_threshold: 6,
            autosave_debounce: Duration::from_millis(2500),
            offline_coins_per_hour: 10,
            hint_cooldown: Duration::from_secs(20),
        }
    }
}

/// External services a kernel talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Local key-value storage for the save and the account cache.
    pub store: Arc<dyn KeyValueStore>,
    /// Identity provider. `None` means local accounts only.
    pub profiles: Option<Arc<dyn ProfileService>>,
    /// Remote save storage. `None` disables cloud sync.
    pub saves: Option<Arc<dyn SaveSync>>,
}

impl Collaborators {
    /// Local storage only.
    pub fn local(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            profiles: None,
            saves: None,
        }
    }

    /// Nothing persisted beyond the process.
    pub fn in_memory() -> Self {
        Self::local(Arc::new(MemoryStore::new()))
    }

    /// Local storage plus a [`StoreRemote`] acting as both identity provider
    /// and save backend.
    pub fn with_remote(store: Arc<dyn KeyValueStore>, remote: Arc<StoreRemote>) -> Self {
        Self {
            store,
            profiles: Some(remote.clone()),
            saves: Some(remote),
        }
    }
}

/// The outcome of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub result: ExecResult,
    pub completed: Vec<CompletedQuest>,
    pub unlocked: Vec<ZoneId>,
}

impl Turn {
    /// Command output followed by quest and zone announcements.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.result.lines.clone();
        lines.extend(self.completed.iter().map(CompletedQuest::message));
        lines.extend(self.unlocked.iter().map(|z| format!("Zone unlocked: {z}")));
        lines
    }
}

/// One player's session.
pub struct Kernel {
    config: KernelConfig,
    /// The player's filesystem. Not persisted; every session starts seeded.
    vfs: VirtualFileSystem,
    progression: ProgressionState,
    interpreter: Interpreter,
    quests: QuestEngine,
    saves: SaveStore,
    reconciler: SaveReconciler,
    accounts: AccountManager,
    /// Started on the first cloud-account turn; needs a running runtime.
    autosaver: Option<Autosaver>,
    /// Messages for the front end, drained by [`Kernel::take_notices`].
    notices: Vec<String>,
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("cwd", &self.vfs.pwd())
            .field("account", &self.progression.account)
            .field("pending_sync", &self.reconciler.has_pending())
            .finish_non_exhaustive()
    }
}

impl Kernel {
    /// Open a session, restoring the local save if there is one.
    ///
    /// A corrupt save is discarded with a notice; other storage errors fail.
    pub fn new(config: KernelConfig, collaborators: Collaborators, now: DateTime<Utc>) -> Result<Self> {
        let saves = SaveStore::new(collaborators.store.clone());
        let mut notices = Vec::new();
        let progression = match saves.load_state() {
            Ok(Some(state)) => state,
            Ok(None) => ProgressionState::fresh(now),
            Err(e @ StoreError::ParseFailure { .. }) => {
                warn!(error = %e, "discarding corrupt save");
                saves.clear_state().context("clearing corrupt save")?;
                notices.push(CORRUPT_SAVE_NOTICE.to_string());
                ProgressionState::fresh(now)
            }
            Err(e) => return Err(e).context("loading saved progress"),
        };

        let mut kernel = Self::assemble(config, collaborators, progression);
        kernel.notices = notices;
        Ok(kernel)
    }

    /// A throwaway session with no persistence and no remote.
    pub fn in_memory() -> Self {
        Self::assemble(
            KernelConfig::default(),
            Collaborators::in_memory(),
            ProgressionState::fresh(Utc::now()),
        )
    }

    fn assemble(config: KernelConfig, collaborators: Collaborators, progression: ProgressionState) -> Self {
        let saves = SaveStore::new(collaborators.store);
        let reconciler = SaveReconciler::new(saves.clone(), collaborators.saves);
        let accounts = AccountManager::new(saves.clone(), reconciler.clone(), collaborators.profiles);
        let hint_cooldown =
            TimeDelta::from_std(config.hint_cooldown).unwrap_or_else(|_| TimeDelta::seconds(20));
        Self {
            vfs: VirtualFileSystem::new(),
            progression,
            interpreter: Interpreter::new(hint_cooldown),
            quests: QuestEngine::new(config.zone_unlock_threshold),
            saves,
            reconciler,
            accounts,
            autosaver: None,
            notices: Vec::new(),
            config,
        }
    }

    /// Swap in a different filesystem (tests, custom layouts).
    pub fn with_vfs(mut self, vfs: VirtualFileSystem) -> Self {
        self.vfs = vfs;
        self
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    pub fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    pub fn quests(&self) -> &QuestEngine {
        &self.quests
    }

    /// True while the local save is ahead of the last successful push.
    pub fn pending_sync(&self) -> bool {
        self.reconciler.has_pending()
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// Session-resume bookkeeping: a pull-and-reconcile for cloud accounts,
    /// then offline coins and the daily streak on whichever save won.
    /// Returns lines to show.
    pub async fn resume(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut lines = self.take_notices();

        let mut cloud_line = None;
        if let Some(Account::Cloud { profile_id, .. }) = self.progression.account.clone() {
            cloud_line = match self.reconcile(&profile_id).await {
                Ok(true) => Some("Loaded newer progress from the cloud.".to_string()),
                Ok(false) => None,
                Err(e) => Some(format!("Cloud sync pending: {e}")),
            };
        }

        if let Some(report) = self
            .progression
            .accrue_offline(now, self.config.offline_coins_per_hour)
        {
            lines.push(report.message());
        }
        let days = self.progression.update_streak(now);
        lines.push(format!("Daily streak: {days} day(s)"));
        lines.extend(cloud_line);

        self.progression.touch(now);
        self.persist();
        self.schedule_autosave();
        lines
    }

    /// Pull the remote save and keep whichever side is newer. `Ok(true)` if
    /// the remote replaced local progress.
    async fn reconcile(&mut self, profile_id: &str) -> Result<bool, SyncError> {
        let record = self.progression.to_record().map_err(|source| StoreError::ParseFailure {
            key: crate::store::STATE_KEY.to_string(),
            source,
        })?;
        let merged = self
            .reconciler
            .pull_and_reconcile(profile_id, Some(record))
            .await?;
        match merged {
            Some(merged) if merged.source == SaveSource::Remote => {
                let account = self.progression.account.clone();
                let mut restored = ProgressionState::from_record(&merged.record).map_err(|source| {
                    StoreError::ParseFailure {
                        key: crate::store::STATE_KEY.to_string(),
                        source,
                    }
                })?;
                restored.account = account;
                self.progression = restored;
                info!(profile_id, "remote save adopted");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Retry a failed push, e.g. after the network comes back. `Ok(false)`
    /// when nothing was pending or the player has no cloud account.
    pub async fn retry_pending_sync(&mut self) -> Result<bool, SyncError> {
        let Some(Account::Cloud { profile_id, .. }) = &self.progression.account else {
            return Ok(false);
        };
        let record = self.progression.to_record().map_err(|source| StoreError::ParseFailure {
            key: crate::store::STATE_KEY.to_string(),
            source,
        })?;
        self.reconciler.retry_pending(profile_id, &record).await
    }

    /// Execute a line now.
    pub async fn execute(&mut self, line: &str) -> Turn {
        self.execute_at(line, Utc::now()).await
    }

    /// Execute a line with an explicit clock.
    pub async fn execute_at(&mut self, line: &str, now: DateTime<Utc>) -> Turn {
        let result = {
            let mut ctx = ExecContext {
                vfs: &mut self.vfs,
                progression: &mut self.progression,
                quests: &self.quests,
                accounts: &self.accounts,
                now,
            };
            self.interpreter.execute(line, &mut ctx).await
        };

        if line.trim().is_empty() {
            return Turn {
                result,
                completed: Vec::new(),
                unlocked: Vec::new(),
            };
        }

        let evaluation = self.quests.evaluate(&mut self.progression, &self.vfs, now);
        self.progression.touch(now);
        self.persist();
        self.schedule_autosave();

        Turn {
            result,
            completed: evaluation.completed,
            unlocked: evaluation.unlocked,
        }
    }

    /// Write the state locally. Failures are logged; play continues.
    fn persist(&self) {
        if let Err(e) = self.saves.save_state(&self.progression) {
            warn!(error = %e, "local save failed");
        }
    }

    fn schedule_autosave(&mut self) {
        let Some(Account::Cloud { profile_id, .. }) = &self.progression.account else {
            return;
        };
        if !self.reconciler.is_configured() {
            return;
        }
        let record = match self.progression.to_record() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "could not encode save for autosave");
                return;
            }
        };
        let reconciler = &self.reconciler;
        let window = self.config.autosave_debounce;
        self.autosaver
            .get_or_insert_with(|| Autosaver::spawn(reconciler.clone(), window))
            .schedule(profile_id, record);
    }

    pub fn completion_catalog(&self) -> CompletionCatalog {
        CompletionCatalog::build(&self.vfs)
    }

    pub fn complete(&self, input: &str) -> Completion {
        self.completion_catalog().complete(input)
    }

    /// End the session, flushing any queued autosave.
    pub async fn shutdown(mut self) {
        self.persist();
        if let Some(autosaver) = self.autosaver.take() {
            autosaver.shutdown().await;
        }
    }
}
