//! Gab TV - Browse the Gab TV catalog from a media center
//!
//! This library provides the core of the Gab TV addon: it scrapes the site's
//! pages into catalog listings, keeps a bounded cache of preview images, and
//! resolves videos to stream URLs the host player can open. Everything user
//! facing goes through the [`Host`] trait, which the media center implements.

mod catalog;
mod host;
mod listing;
mod orchestrator;
mod playback;
mod route;
mod session;
mod settings;
mod site;
mod thumbnail_cache;

// Re-export error types
pub use catalog::CatalogError;
pub use route::RouteError;
pub use session::NetworkError;
pub use settings::SettingsError;
pub use site::ScrapeError;
pub use thumbnail_cache::CacheError;

// Re-export the public API
pub use catalog::{
    Artwork, CatalogItem, CategoryRef, channel_and_view, map_categories, map_scraped_videos,
    map_videos,
};
pub use host::Host;
pub use listing::{ADDON_NAME, ContentType, Listing, ListingOptions, SortMethod};
pub use orchestrator::{Orchestrator, PLAYER_POLL_INTERVAL};
pub use playback::{AdaptiveHint, DrmHint, ManifestType, PlaybackRequest};
pub use route::Route;
pub use session::{FetchedResponse, Fetcher, HttpSession, PlainFetcher, auth_fragment};
pub use settings::{CacheBound, Settings};
pub use site::{
    BASE_URL, CatalogSource, DEFAULT_RESOLUTION, GabTvScraper, ScrapedCategory, ScrapedVideo,
    SiteSession, StreamDescriptor,
};
pub use thumbnail_cache::{ArtworkResolver, ThumbnailCache, default_cache_dir};

use thiserror::Error;

/// Top-level error type for addon operations
#[derive(Debug, Error)]
pub enum AddonError {
    /// Error while loading settings
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Error while setting up the network session
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Error in the thumbnail cache
    #[error("Thumbnail cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error while scraping the site
    #[error("Scraping error: {0}")]
    Scrape(#[from] ScrapeError),

    /// Error while mapping scraped entries
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The requested path is not a known route
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    /// The host refused to play the resolved stream
    #[error("Playback of channel {channel} view {view} was rejected by the player")]
    PlaybackRejected { channel: String, view: String },
}

/// The orchestrator wired to the live site
pub type GabTvAddon = Orchestrator<GabTvScraper<HttpSession>, ThumbnailCache<PlainFetcher>>;

/// Sets up the addon against the live site
///
/// Opens the thumbnail cache (in `settings.cache_dir`, or the platform cache
/// directory when unset) and creates a fresh HTTP session for scraping.
///
/// # Examples
///
/// ```no_run
/// use gabtv::{Host, Route, Settings, open_addon};
///
/// fn browse(host: &mut impl Host) -> Result<(), gabtv::AddonError> {
///     let addon = open_addon(Settings::default())?;
///     addon.run(Route::Explore, host)
/// }
/// ```
pub fn open_addon(settings: Settings) -> Result<GabTvAddon, AddonError> {
    let bound = settings.cache_bound();
    let fetcher = PlainFetcher::new()?;
    let cache = match &settings.cache_dir {
        Some(dir) => ThumbnailCache::open(dir.clone(), bound, fetcher)?,
        None => ThumbnailCache::open_default(bound, fetcher)?,
    };

    let scraper = GabTvScraper::connect()?;

    Ok(Orchestrator::new(scraper, cache, settings))
}
