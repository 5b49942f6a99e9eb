//! Session configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::share::SHARE_PARAM;
use crate::storage::DEFAULT_STORAGE_KEY;

/// Default autosave interval in seconds.
pub const DEFAULT_AUTOSAVE_SECS: u64 = 3;

/// Default data directory for file storage.
pub const DEFAULT_DATA_DIR: &str = ".decal";

/// Default base URL for share links.
pub const DEFAULT_SHARE_BASE_URL: &str = "https://decal.local/editor";

/// Configuration for a [`DesignSession`](crate::DesignSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignConfig {
    /// Storage key the design is saved under.
    pub storage_key: String,
    /// Directory used by file storage.
    pub data_dir: PathBuf,
    /// Seconds between autosave checks.
    pub autosave_secs: u64,
    /// Base URL share links are built on.
    pub share_base_url: String,
    /// Query parameter carrying the encoded design.
    pub share_param: String,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            autosave_secs: DEFAULT_AUTOSAVE_SECS,
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            share_param: SHARE_PARAM.to_string(),
        }
    }
}

impl DesignConfig {
    /// Create a configuration from environment variables or defaults.
    ///
    /// Environment variables:
    /// - `DECAL_STORAGE_KEY`: Storage key (default: `decal_design_autosave`)
    /// - `DECAL_DATA_DIR`: File storage directory (default: `.decal`)
    /// - `DECAL_AUTOSAVE_SECS`: Autosave interval in seconds (default: 3)
    /// - `DECAL_SHARE_BASE_URL`: Share link base URL
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            storage_key: non_empty("DECAL_STORAGE_KEY").unwrap_or(defaults.storage_key),
            data_dir: non_empty("DECAL_DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            autosave_secs: non_empty("DECAL_AUTOSAVE_SECS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.autosave_secs),
            share_base_url: non_empty("DECAL_SHARE_BASE_URL").unwrap_or(defaults.share_base_url),
            share_param: defaults.share_param,
        }
    }

    /// Autosave interval as a duration.
    #[must_use]
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_secs)
    }

    /// Set the storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the share base URL.
    #[must_use]
    pub fn with_share_base_url(mut self, url: impl Into<String>) -> Self {
        self.share_base_url = url.into();
        self
    }
}
