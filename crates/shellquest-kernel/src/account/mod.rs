//! Player accounts: username rules, the profile service seam, and the
//! session commands built on top of them.

mod manager;

pub use manager::AccountManager;

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;
use crate::sync::SyncError;

#[allow(clippy::expect_used)]
static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]{2,15}$").expect("valid username pattern"));

/// The account a save belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Account {
    /// Device-only account, stored in the account cache.
    Local { username: String },
    /// Account backed by a remote profile.
    #[serde(rename_all = "camelCase")]
    Cloud { username: String, profile_id: String },
}

impl Account {
    pub fn username(&self) -> &str {
        match self {
            Account::Local { username } | Account::Cloud { username, .. } => username,
        }
    }

    /// Key into the account cache: `local:<username>` or `cloud:<profile id>`.
    pub fn cache_key(&self) -> String {
        match self {
            Account::Local { username } => format!("local:{username}"),
            Account::Cloud { profile_id, .. } => format!("cloud:{profile_id}"),
        }
    }

    pub fn profile_id(&self) -> Option<&str> {
        match self {
            Account::Local { .. } => None,
            Account::Cloud { profile_id, .. } => Some(profile_id),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Account::Local { .. } => "local",
            Account::Cloud { .. } => "cloud",
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username(), self.mode())
    }
}

/// A remote identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid username. Use 3-16 lowercase letters, digits or underscores, starting with a letter.")]
    InvalidUsername,
    #[error("Username {0} is taken")]
    UsernameTaken(String),
    #[error("No profile named {0}")]
    ProfileNotFound(String),
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Cloud sync is not configured")]
    SyncUnavailable,
    #[error("Sync failed: {0}")]
    SyncFailed(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<SyncError> for AccountError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Unavailable => AccountError::SyncUnavailable,
            SyncError::Failed(reason) => AccountError::SyncFailed(reason),
            SyncError::Local(e) => AccountError::Storage(e),
        }
    }
}

/// Trim and lowercase.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize `raw` and check it against the username rules.
pub fn validate_username(raw: &str) -> Result<String, AccountError> {
    let name = normalize_username(raw);
    if USERNAME.is_match(&name) {
        Ok(name)
    } else {
        Err(AccountError::InvalidUsername)
    }
}

/// Remote identity provider.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Create a profile. Fails with [`AccountError::UsernameTaken`] on a
    /// duplicate name.
    async fn create_profile(&self, username: &str) -> Result<Profile, AccountError>;

    async fn fetch_profile(&self, username: &str) -> Result<Option<Profile>, AccountError>;
}
