//! Save reconciliation between local storage and a remote save service.
//!
//! Saves are opaque [`SaveRecord`]s. Two copies (local and remote) are never
//! merged field by field: [`merge_saves`] picks one wholesale by timestamp.
//!
//! ```text
//!   local store ◄──── write winner ────┐
//!        │                             │
//!        └── local record ──► merge_saves ◄── remote record ── SaveSync::fetch
//!                                      │
//!                         local won? ──┴──► SaveSync::upsert
//! ```

mod autosave;
mod reconciler;
mod remote;

pub use autosave::Autosaver;
pub use reconciler::SaveReconciler;
pub use remote::StoreRemote;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// A timestamped, opaque snapshot of player progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub payload: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// No remote is configured.
    #[error("cloud sync is not configured")]
    Unavailable,
    /// The remote rejected or could not be reached; recoverable.
    #[error("cloud sync failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Local(#[from] StoreError),
}

/// Remote save storage, keyed by profile id.
#[async_trait]
pub trait SaveSync: Send + Sync {
    async fn fetch(&self, profile_id: &str) -> Result<Option<SaveRecord>, SyncError>;
    async fn upsert(&self, profile_id: &str, record: &SaveRecord) -> Result<(), SyncError>;
}

/// Which side a merge picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveSource {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub record: SaveRecord,
    pub source: SaveSource,
}

/// Last-writer-wins by `updated_at`. Remote wins only when strictly newer;
/// equal timestamps keep the local record.
pub fn merge_saves(local: Option<SaveRecord>, remote: Option<SaveRecord>) -> Option<Merged> {
    match (local, remote) {
        (None, None) => None,
        (Some(record), None) => Some(Merged {
            record,
            source: SaveSource::Local,
        }),
        (None, Some(record)) => Some(Merged {
            record,
            source: SaveSource::Remote,
        }),
        (Some(local), Some(remote)) => {
            if remote.updated_at > local.updated_at {
                Some(Merged {
                    record: remote,
                    source: SaveSource::Remote,
                })
            } else {
                Some(Merged {
                    record: local,
                    source: SaveSource::Local,
                })
            }
        }
    }
}
