//! Local key-value persistence.
//!
//! A [`KeyValueStore`] holds JSON strings by key. [`MemoryStore`] keeps them
//! in a map (tests, ephemeral sessions); [`FileStore`] writes one JSON file
//! per key under a directory. [`SaveStore`] layers the game's two keys on
//! top of either.

mod file;
mod memory;
mod save;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use save::{AccountCache, SaveStore, ACCOUNTS_KEY, STATE_KEY};

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("saved data under {key} is corrupt: {source}")]
    ParseFailure {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// String storage by key. Implementations are internally synchronized so a
/// store can be shared between the local save and a simulated remote.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
