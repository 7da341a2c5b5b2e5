//! Configuration for the shellquest binary.
//!
//! Loaded from `~/.config/shellquest/config.toml`. Every field is optional;
//! command-line flags override whatever the file says.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplConfig {
    /// Where the local save and account cache live.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Directory standing in for the cloud. Unset means local accounts only.
    #[serde(default)]
    pub remote_dir: Option<PathBuf>,

    /// Start with the remote unreachable; edits queue as pending sync.
    #[serde(default)]
    pub offline: bool,

    /// Lines of line-editor history to keep.
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_history_size() -> usize {
    500
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            remote_dir: None,
            offline: false,
            history_size: default_history_size(),
        }
    }
}

impl ReplConfig {
    /// Load from the default path, or defaults if there is no file there.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The configured data dir, else the platform data dir.
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "shellquest").context("Could not determine config directory")
}
