//! Gab TV scraper implementation.

use super::parser;
use super::{CatalogSource, ScrapeError, ScrapedCategory, ScrapedVideo, StreamDescriptor};
use crate::session::{Fetcher, HttpSession};
use tracing::debug;
use url::form_urlencoded;

/// Root of the site every page path is relative to
pub const BASE_URL: &str = "https://tv.gab.com";

/// Rendition requested for every stream
pub const DEFAULT_RESOLUTION: &str = "1080p";

/// A fetcher that also carries session credentials for the player
pub trait SiteSession: Fetcher {
    /// Header fragment appended to stream URLs
    fn auth_fragment(&self) -> String;
}

impl SiteSession for HttpSession {
    fn auth_fragment(&self) -> String {
        HttpSession::auth_fragment(self)
    }
}

/// Catalog source for https://tv.gab.com
///
/// The scraper owns its session, so cookies the site sets while browsing are
/// the ones forwarded to the player.
pub struct GabTvScraper<S: SiteSession> {
    session: S,
    base_url: String,
}

impl GabTvScraper<HttpSession> {
    /// Creates a scraper with a fresh HTTP session for the live site
    pub fn connect() -> Result<Self, crate::session::NetworkError> {
        Ok(Self::new(HttpSession::new(BASE_URL)?, BASE_URL))
    }
}

impl<S: SiteSession> GabTvScraper<S> {
    /// Creates a scraper for the site at `base_url`
    ///
    /// # Arguments
    ///
    /// * `session` - Session used for every page request; its cookies end up
    ///   in resolved stream URLs
    /// * `base_url` - Site root, with or without a trailing slash
    pub fn new(session: S, base_url: &str) -> Self {
        Self {
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches a page below the base URL and returns its source
    fn fetch_page(&self, path: &str) -> Result<String, ScrapeError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.session.fetch(&url)?;
        debug!(path, bytes = response.body.len(), "page fetched");
        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }
}

/// Path of the search result page for `query`
fn search_path(query: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("/search?q={}", encoded)
}

impl<S: SiteSession> CatalogSource for GabTvScraper<S> {
    fn scrape_explore(&self) -> Result<Vec<ScrapedVideo>, ScrapeError> {
        let page = "/";
        let html = self.fetch_page(page)?;
        parser::parse_video_grid(&html, &self.base_url, page)
    }

    fn scrape_search(&self, query: &str) -> Result<Vec<ScrapedVideo>, ScrapeError> {
        let page = search_path(query);
        let html = self.fetch_page(&page)?;
        parser::parse_video_grid(&html, &self.base_url, &page)
    }

    fn scrape_category(&self, key: &str) -> Result<Vec<ScrapedVideo>, ScrapeError> {
        let page = format!("/category/{}", key);
        let html = self.fetch_page(&page)?;
        parser::parse_category_page(&html, &self.base_url, &page)
    }

    fn list_categories(&self) -> Result<Vec<ScrapedCategory>, ScrapeError> {
        let page = "/category";
        let html = self.fetch_page(page)?;
        parser::parse_category_index(&html, &self.base_url, page)
    }

    fn resolve_stream(&self, channel: &str, view: &str) -> Result<StreamDescriptor, ScrapeError> {
        let page = format!("/channel/{}/view/{}", channel, view);
        let html = self.fetch_page(&page)?;
        let (media_url, view_key) = parser::parse_stream_page(&html, &page)?;

        Ok(StreamDescriptor {
            media_url,
            view_key,
            resolution: DEFAULT_RESOLUTION.to_string(),
            auth_header_fragment: self.session.auth_fragment(),
        })
    }
}
