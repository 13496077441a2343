//! Thumbnail cache module
//!
//! This module keeps local copies of remote artwork in a flat directory.
//! Files are named `{prefix}{key}.{extension}` where the key is the final path
//! segment of the remote URL plus its query, percent-encoded, so a later
//! reference to the same URL is answered from disk. After each download the
//! cached thumbnails are trimmed to the configured bound, oldest modification
//! time first. Files without the prefix are never counted or removed.

use crate::session::{Fetcher, NetworkError};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use crate::settings::CacheBound;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Filename prefix of every cached thumbnail
pub const THUMBNAIL_PREFIX: &str = "gabtv_";

/// Extension used when the response does not say what it contains
pub const FALLBACK_EXTENSION: &str = "apng";

/// Characters kept verbatim in a cache key; everything else is percent-encoded
const KEY_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Errors that can occur during thumbnail cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to determine cache directory location
    #[error("Failed to determine cache directory location")]
    CacheDirectoryNotFound,

    /// Failed to create or access cache directory
    #[error("Failed to create cache directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to list the cache directory
    #[error("Failed to read cache directory {path}: {source}")]
    ReadDirectoryFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a downloaded thumbnail
    #[error("Failed to write cache file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to evict an old thumbnail
    #[error("Failed to remove cache file {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The artwork URL has no usable final path segment
    #[error("Artwork URL has no file name: {0}")]
    InvalidUrl(String),

    /// Failed to download the artwork
    #[error("Failed to download artwork: {0}")]
    Download(#[from] NetworkError),
}

/// Resolves remote artwork URLs to local files
pub trait ArtworkResolver {
    /// Returns a local path holding the image behind `remote_url`
    fn resolve_local_path(&self, remote_url: &str) -> Result<PathBuf, CacheError>;
}

/// A bounded directory of downloaded thumbnails
pub struct ThumbnailCache<F: Fetcher> {
    /// The directory where thumbnails are stored
    cache_dir: PathBuf,
    /// How many files may remain after a download
    bound: CacheBound,
    /// Client used for downloads
    fetcher: F,
}

impl<F: Fetcher> ThumbnailCache<F> {
    /// Opens or creates a thumbnail cache in `cache_dir`
    ///
    /// The directory may be shared with other files. Only entries whose name
    /// starts with [`THUMBNAIL_PREFIX`] belong to the cache.
    ///
    /// # Arguments
    ///
    /// * `cache_dir` - Directory holding the thumbnails, created when missing
    /// * `bound` - How many thumbnails may remain after a download
    /// * `fetcher` - Client used to download artwork on a miss
    ///
    /// # Returns
    ///
    /// The opened cache, or `DirectoryCreationFailed` when the directory
    /// cannot be created
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let cache = ThumbnailCache::open(dir, CacheBound::Limit(100), PlainFetcher::new()?)?;
    /// let local = cache.resolve_local_path("https://tv.gab.com/image/abc")?;
    /// ```
    pub fn open(cache_dir: PathBuf, bound: CacheBound, fetcher: F) -> Result<Self, CacheError> {
        fs::create_dir_all(&cache_dir).map_err(|e| CacheError::DirectoryCreationFailed {
            path: cache_dir.clone(),
            source: e,
        })?;

        Ok(Self {
            cache_dir,
            bound,
            fetcher,
        })
    }

    /// Opens the cache in the platform's cache directory
    ///
    /// - Linux: ~/.cache/gabtv/thumbnails/
    /// - macOS: ~/Library/Caches/tv.gab.gabtv/thumbnails/
    /// - Windows: %LOCALAPPDATA%\gabtv\gabtv\cache\thumbnails\
    pub fn open_default(bound: CacheBound, fetcher: F) -> Result<Self, CacheError> {
        Self::open(default_cache_dir()?, bound, fetcher)
    }

    /// Returns the path to the cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Finds a cached file whose name without extension is `stem`
    fn find_cached(&self, stem: &str) -> Result<Option<PathBuf>, CacheError> {
        let entries = fs::read_dir(&self.cache_dir).map_err(|e| CacheError::ReadDirectoryFailed {
            path: self.cache_dir.clone(),
            source: e,
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(stem) && path.is_file() {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Deletes the oldest thumbnails until the cache fits the bound
    ///
    /// `just_written` counts toward the bound but is never evicted, even when
    /// its modification time ties with older entries.
    fn enforce_bound(&self, just_written: &Path) -> Result<(), CacheError> {
        let mut files = list_thumbnails_by_mtime(&self.cache_dir)?;
        let excess = self.bound.excess(files.len());
        if excess == 0 {
            return Ok(());
        }

        info!(
            evicting = excess,
            cached = files.len(),
            "thumbnail cache over its bound"
        );

        files.retain(|path| path != just_written);
        let excess = excess.min(files.len());
        for path in files.drain(..excess) {
            fs::remove_file(&path).map_err(|e| CacheError::RemoveFailed { path, source: e })?;
        }

        Ok(())
    }
}

impl<F: Fetcher> ArtworkResolver for ThumbnailCache<F> {
    fn resolve_local_path(&self, remote_url: &str) -> Result<PathBuf, CacheError> {
        let key = cache_key(remote_url)?;
        let stem = format!("{}{}", THUMBNAIL_PREFIX, key);

        if let Some(path) = self.find_cached(&stem)? {
            debug!(url = remote_url, path = %path.display(), "thumbnail cache hit");
            return Ok(path);
        }

        let response = self.fetcher.fetch(remote_url)?;
        let extension = extension_for(response.content_type.as_deref());
        let file_path = self.cache_dir.join(format!("{}.{}", stem, extension));

        fs::write(&file_path, &response.body).map_err(|e| CacheError::WriteFailed {
            path: file_path.clone(),
            source: e,
        })?;
        debug!(url = remote_url, path = %file_path.display(), "thumbnail stored");

        self.enforce_bound(&file_path)?;

        Ok(file_path)
    }
}

/// Returns the platform cache directory used for thumbnails
pub fn default_cache_dir() -> Result<PathBuf, CacheError> {
    let proj_dirs = directories::ProjectDirs::from("tv", "gab", "gabtv")
        .ok_or(CacheError::CacheDirectoryNotFound)?;

    Ok(proj_dirs.cache_dir().join("thumbnails"))
}

/// Derives the cache key from the last path segment of `url`
///
/// The query string stays part of the key, so `image?id=1` and `image?id=2`
/// are cached apart. Characters outside `[A-Za-z0-9._~-]` are percent-encoded,
/// which keeps the key a valid file name and distinct URLs distinct keys.
fn cache_key(url: &str) -> Result<String, CacheError> {
    let invalid = || CacheError::InvalidUrl(url.to_string());
    let parsed = Url::parse(url).map_err(|_| invalid())?;

    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(invalid)?;

    let raw = match parsed.query() {
        Some(query) => format!("{}?{}", segment, query),
        None => segment.to_string(),
    };

    Ok(utf8_percent_encode(&raw, KEY_SAFE).to_string())
}

/// Picks a file extension from a `Content-Type` header value
///
/// Uses the media subtype (`image/jpeg` gives `jpeg`). Anything without a
/// `type/subtype` shape falls back to [`FALLBACK_EXTENSION`].
fn extension_for(content_type: Option<&str>) -> String {
    let subtype = content_type
        .and_then(|ct| ct.split(';').next())
        .and_then(|essence| essence.trim().split_once('/'))
        .map(|(_, subtype)| subtype.trim().to_ascii_lowercase())
        .filter(|subtype| {
            !subtype.is_empty()
                && subtype
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        });

    match subtype {
        Some(subtype) => subtype,
        None => {
            debug!(?content_type, "no usable content type, using fallback extension");
            FALLBACK_EXTENSION.to_string()
        }
    }
}

/// Lists cached thumbnails in `dir`, oldest modification time first
fn list_thumbnails_by_mtime(dir: &Path) -> Result<Vec<PathBuf>, CacheError> {
    let entries = fs::read_dir(dir).map_err(|e| CacheError::ReadDirectoryFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<(SystemTime, PathBuf)> = entries
        .flatten()
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(THUMBNAIL_PREFIX))
        })
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, entry.path()))
        })
        .collect();

    files.sort();

    Ok(files.into_iter().map(|(_, path)| path).collect())
}
