//! Site scraping
//!
//! This module defines what a catalog source delivers (listing triples,
//! category triples and stream descriptors) and the trait the orchestrator
//! uses to obtain them. The Gab TV implementation fetches HTML pages and hands
//! them to the parsers in [`parser`].

mod gabtv;
pub(crate) mod parser;

pub use gabtv::{BASE_URL, DEFAULT_RESOLUTION, GabTvScraper, SiteSession};

use crate::session::NetworkError;
use thiserror::Error;

/// Errors that can occur while scraping the site
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The page could not be fetched
    #[error("Failed to fetch page: {0}")]
    Network(#[from] NetworkError),

    /// The page did not have the expected structure
    #[error("Unexpected page structure on {page}: {reason}")]
    Parse { page: String, reason: String },
}

impl ScrapeError {
    pub(crate) fn parse(page: &str, reason: impl Into<String>) -> Self {
        ScrapeError::Parse {
            page: page.to_string(),
            reason: reason.into(),
        }
    }
}

/// One video card as it appears on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedVideo {
    /// Video title
    pub title: String,
    /// Site path of the episode, embedding channel and view ids
    pub episode_url: String,
    /// Absolute URL of the preview image
    pub art_url: String,
}

/// One entry of the category index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedCategory {
    /// Display name of the category
    pub label: String,
    /// Slug used in the category's URL
    pub key: String,
    /// Absolute URL of the category image
    pub art_url: String,
}

/// Everything needed to build a playable URL for one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Media URL announced by the page
    pub media_url: String,
    /// View key the media server expects
    pub view_key: String,
    /// Requested rendition, e.g. `1080p`
    pub resolution: String,
    /// Header fragment carrying the session's cookies and headers
    pub auth_header_fragment: String,
}

impl StreamDescriptor {
    /// Builds the URL handed to the player
    pub fn into_playable_url(self) -> String {
        format!(
            "{}?viewKey={}&r={}{}",
            self.media_url, self.view_key, self.resolution, self.auth_header_fragment
        )
    }
}

/// A source of catalog pages
///
/// Implementors fetch the remote site and return the raw scraped entries in
/// the site's display order.
pub trait CatalogSource {
    /// Videos featured on the front page
    fn scrape_explore(&self) -> Result<Vec<ScrapedVideo>, ScrapeError>;

    /// Videos matching a search query
    fn scrape_search(&self, query: &str) -> Result<Vec<ScrapedVideo>, ScrapeError>;

    /// Videos in one category
    fn scrape_category(&self, key: &str) -> Result<Vec<ScrapedVideo>, ScrapeError>;

    /// The category index
    fn list_categories(&self) -> Result<Vec<ScrapedCategory>, ScrapeError>;

    /// Stream details for a single video
    fn resolve_stream(&self, channel: &str, view: &str) -> Result<StreamDescriptor, ScrapeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playable_url() {
        let descriptor = StreamDescriptor {
            media_url: "https://cdn/video".to_string(),
            view_key: "abc123".to_string(),
            resolution: "1080p".to_string(),
            auth_header_fragment: crate::session::auth_fragment(
                &[("a".to_string(), "1".to_string())],
                &[],
            ),
        };

        assert_eq!(
            descriptor.into_playable_url(),
            "https://cdn/video?viewKey=abc123&r=1080p|Cookie=a%3D1&"
        );
    }
}
