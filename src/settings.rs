//! Addon settings
//!
//! This module models the settings the host exposes to the addon. They are
//! read-only from the addon's point of view and are loaded from a TOML file
//! whose keys mirror the host's setting ids.

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of thumbnails kept when no setting is provided
pub const DEFAULT_CACHE_SIZE: i64 = 100;

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read the settings file
    #[error("Failed to read settings file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has a value of the wrong type
    #[error("Failed to parse settings: {0}")]
    ParseFailed(#[from] toml::de::Error),
}

/// Upper bound on the number of files in the thumbnail cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBound {
    /// Never evict
    Unbounded,
    /// Keep at most this many files
    Limit(usize),
}

impl CacheBound {
    /// Builds a bound from the raw `cache_size` setting.
    ///
    /// Non-positive values mean the cache grows without limit, which is how
    /// the addon has always behaved for them.
    pub fn from_setting(cache_size: i64) -> Self {
        if cache_size <= 0 {
            CacheBound::Unbounded
        } else {
            CacheBound::Limit(cache_size as usize)
        }
    }

    /// Number of files that have to go when the cache holds `count` files
    pub fn excess(&self, count: usize) -> usize {
        match self {
            CacheBound::Unbounded => 0,
            CacheBound::Limit(limit) => count.saturating_sub(*limit),
        }
    }
}

/// Settings consumed by the addon core
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of cached thumbnails (non-positive: unlimited)
    #[serde(deserialize_with = "lenient_int")]
    pub cache_size: i64,
    /// Addon bandwidth cap in kbit/s (0: unlimited)
    #[serde(deserialize_with = "lenient_int")]
    pub max_bandwidth: i64,
    /// Host-wide bandwidth cap in kbit/s (0: unlimited)
    #[serde(deserialize_with = "lenient_int")]
    pub global_max_bandwidth: i64,
    pub use_inputstream_adaptive: bool,
    pub use_drm: bool,
    pub show_subtitles: bool,
    pub show_fanart: bool,
    pub use_menu_caching: bool,
    /// Keep the site's order for video listings instead of sorting by label
    pub show_oneoff: bool,
    /// Thumbnail directory; the platform cache directory when unset
    pub cache_dir: Option<PathBuf>,
    /// Fanart shown for items that have none of their own
    pub addon_fanart: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            max_bandwidth: 0,
            global_max_bandwidth: 0,
            use_inputstream_adaptive: true,
            use_drm: true,
            show_subtitles: true,
            show_fanart: true,
            use_menu_caching: true,
            show_oneoff: true,
            cache_dir: None,
            addon_fanart: None,
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml(&content)
    }

    /// Parses settings from a TOML string. Missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// The thumbnail cache bound derived from `cache_size`
    pub fn cache_bound(&self) -> CacheBound {
        CacheBound::from_setting(self.cache_size)
    }

    /// Effective bandwidth cap in kbit/s, `None` when nothing limits it
    ///
    /// When both the addon and the host define a cap, the smaller one wins.
    pub fn max_bandwidth_kbps(&self) -> Option<u64> {
        let addon = u64::try_from(self.max_bandwidth).ok().filter(|v| *v > 0);
        let global = u64::try_from(self.global_max_bandwidth)
            .ok()
            .filter(|v| *v > 0);

        match (addon, global) {
            (Some(a), Some(g)) => Some(a.min(g)),
            (a, g) => a.or(g),
        }
    }

    /// Whether DRM protected streams can be handed to the player
    pub fn can_play_drm(&self) -> bool {
        self.use_drm && self.use_inputstream_adaptive
    }
}

/// Accepts an integer or a string holding one.
///
/// Host settings stores keep every value as text, so both spellings appear in
/// exported settings files. Anything else is a parse error pointing at the
/// offending key.
fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Text(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(value) => Ok(value),
        IntOrString::Text(text) => text.trim().parse().map_err(|_| {
            de::Error::invalid_value(
                Unexpected::Str(&text),
                &"an integer or a numeric string",
            )
        }),
    }
}
