//! Route dispatch
//!
//! The orchestrator maps each [`Route`] onto the scraping pipeline and hands
//! the result to the host. It keeps no state between calls. Failures are
//! reported to the user once, here, and then returned to the caller.

use crate::AddonError;
use crate::catalog::{self, Artwork, CatalogItem};
use crate::host::Host;
use crate::listing::{ADDON_NAME, ContentType, Listing, ListingOptions, SortMethod};
use crate::playback::PlaybackRequest;
use crate::route::Route;
use crate::settings::Settings;
use crate::site::CatalogSource;
use crate::thumbnail_cache::ArtworkResolver;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// How often the player is polled after a stream was handed over
pub const PLAYER_POLL_INTERVAL: Duration = Duration::from_millis(100);

const CATEGORIES_LABEL: &str = "Categories";
const EXPLORE_LABEL: &str = "Explore";
const SEARCH_LABEL: &str = "Search";

/// Dispatches routes against a catalog source
pub struct Orchestrator<S: CatalogSource, A: ArtworkResolver> {
    source: S,
    artwork: A,
    settings: Settings,
    poll_interval: Duration,
}

impl<S: CatalogSource, A: ArtworkResolver> Orchestrator<S, A> {
    pub fn new(source: S, artwork: A, settings: Settings) -> Self {
        Self {
            source,
            artwork,
            settings,
            poll_interval: PLAYER_POLL_INTERVAL,
        }
    }

    /// Overrides the player poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs one route to completion
    ///
    /// Any failure is shown to the user through [`Host::notify_error`] before
    /// it is returned.
    pub fn run<H: Host>(&self, route: Route, host: &mut H) -> Result<(), AddonError> {
        info!(%route, "dispatching route");

        let result = self.dispatch(route, host);
        if let Err(e) = &result {
            error!(error = %e, "route failed");
            host.notify_error(ADDON_NAME, &e.to_string());
        }

        result
    }

    fn dispatch<H: Host>(&self, route: Route, host: &mut H) -> Result<(), AddonError> {
        match route {
            Route::MainMenu => {
                let options = ListingOptions {
                    cache: Some(false),
                    ..ListingOptions::default()
                };
                self.show(host, main_menu(), options);
                Ok(())
            }
            Route::Categories { category: None } => self.show_category_index(host),
            Route::Categories {
                category: Some(category),
            } => self.show_category(host, category),
            Route::Explore => self.show_explore(host),
            Route::Search { query } => self.show_search(host, query),
            Route::PlayVideo { channel, view } => self.play_video(host, &channel, &view),
        }
    }

    fn show<H: Host>(&self, host: &mut H, items: Vec<CatalogItem>, options: ListingOptions) {
        debug!(items = items.len(), "showing listing");
        host.show_listing(Listing::build(items, options, &self.settings));
    }

    fn show_category_index<H: Host>(&self, host: &mut H) -> Result<(), AddonError> {
        let categories = self.source.list_categories()?;
        let items = catalog::map_categories(categories, &self.artwork)?
            .into_iter()
            .map(CatalogItem::from)
            .collect();

        let options = ListingOptions {
            category: Some(CATEGORIES_LABEL.to_string()),
            sort: Some(SortMethod::Unsorted),
            content: Some(ContentType::Images),
            cache: None,
        };
        self.show(host, items, options);
        Ok(())
    }

    fn show_category<H: Host>(&self, host: &mut H, category: String) -> Result<(), AddonError> {
        let videos = self.source.scrape_category(&category)?;
        let items = catalog::map_scraped_videos(videos, &self.artwork)?;

        self.show(host, items, video_options(category));
        Ok(())
    }

    fn show_explore<H: Host>(&self, host: &mut H) -> Result<(), AddonError> {
        let videos = self.source.scrape_explore()?;
        let items = catalog::map_scraped_videos(videos, &self.artwork)?;

        self.show(host, items, video_options(EXPLORE_LABEL.to_string()));
        Ok(())
    }

    fn show_search<H: Host>(&self, host: &mut H, query: Option<String>) -> Result<(), AddonError> {
        let query = match query.or_else(|| host.read_text(SEARCH_LABEL)) {
            Some(query) if !query.trim().is_empty() => query,
            _ => {
                debug!("search cancelled");
                return Ok(());
            }
        };

        let videos = self.source.scrape_search(query.trim())?;
        let items = catalog::map_scraped_videos(videos, &self.artwork)?;

        self.show(host, items, video_options(SEARCH_LABEL.to_string()));
        Ok(())
    }

    fn play_video<H: Host>(
        &self,
        host: &mut H,
        channel: &str,
        view: &str,
    ) -> Result<(), AddonError> {
        let url = self.source.resolve_stream(channel, view)?.into_playable_url();
        let request = PlaybackRequest::new(url, &self.settings);
        let show_subtitles = request.show_subtitles;

        if !host.resolve_playback(request) {
            return Err(AddonError::PlaybackRejected {
                channel: channel.to_string(),
                view: view.to_string(),
            });
        }

        while !host.is_playing() && !host.abort_requested() {
            thread::sleep(self.poll_interval);
        }
        host.set_subtitles_visible(show_subtitles);

        Ok(())
    }
}

fn video_options(category: String) -> ListingOptions {
    ListingOptions {
        category: Some(category),
        sort: Some(SortMethod::Label),
        content: Some(ContentType::Videos),
        cache: None,
    }
}

/// Entries of the addon's root menu
fn main_menu() -> Vec<CatalogItem> {
    let entry = |label: &str, route: Route, icon: &str, plot: &str| CatalogItem {
        label: label.to_string(),
        navigation_target: route,
        artwork: Artwork::thumb(icon),
        description: Some(plot.to_string()),
        is_playable: false,
    };

    vec![
        entry(
            CATEGORIES_LABEL,
            Route::Categories { category: None },
            "DefaultGenre.png",
            "Browse videos by category",
        ),
        entry(
            EXPLORE_LABEL,
            Route::Explore,
            "DefaultCountry.png",
            "Discover featured videos",
        ),
        entry(
            SEARCH_LABEL,
            Route::Search { query: None },
            "DefaultAddonsSearch.png",
            "Search for videos",
        ),
    ]
}
