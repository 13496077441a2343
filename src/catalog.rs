//! Catalog items
//!
//! Scraped entries are turned into [`CatalogItem`]s here: the uniform shape the
//! host's directory listing consumes. Mapping resolves artwork through the
//! thumbnail cache so the host only ever sees local files.

use crate::route::Route;
use crate::site::{ScrapedCategory, ScrapedVideo};
use crate::thumbnail_cache::{ArtworkResolver, CacheError};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while mapping scraped entries
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The episode URL does not contain a channel and a view id
    #[error("Malformed episode URL: {0}")]
    MalformedEpisodeUrl(String),

    /// The artwork could not be cached
    #[error("Artwork unavailable: {0}")]
    Artwork(#[from] CacheError),
}

/// Images shown for an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Artwork {
    pub thumb: Option<PathBuf>,
    pub fanart: Option<PathBuf>,
    pub icon: Option<PathBuf>,
}

impl Artwork {
    /// Uses the same image for thumbnail, fanart and icon
    pub fn uniform(path: PathBuf) -> Self {
        Self {
            thumb: Some(path.clone()),
            fanart: Some(path.clone()),
            icon: Some(path),
        }
    }

    /// Only a thumbnail, typically one of the host's built-in icons
    pub fn thumb(name: &str) -> Self {
        Self {
            thumb: Some(PathBuf::from(name)),
            ..Self::default()
        }
    }
}

/// A single entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    pub label: String,
    /// Route the host invokes when the entry is selected
    pub navigation_target: Route,
    pub artwork: Artwork,
    /// Plot text shown by the host
    pub description: Option<String>,
    /// Playable entries resolve to a stream, the others open a directory
    pub is_playable: bool,
}

impl CatalogItem {
    /// Whether the host should treat the entry as a folder
    pub fn is_folder(&self) -> bool {
        !self.is_playable
    }
}

/// An entry of the category index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub label: String,
    pub category_key: String,
    pub artwork: Artwork,
}

impl From<CategoryRef> for CatalogItem {
    fn from(category: CategoryRef) -> Self {
        CatalogItem {
            label: category.label,
            navigation_target: Route::Categories {
                category: Some(category.category_key),
            },
            artwork: category.artwork,
            description: None,
            is_playable: false,
        }
    }
}

/// Channel and view ids of an episode URL
///
/// The URL is split on `/` and the third and fifth segments (counting from
/// zero) are taken, so `/watch/CHAN42/view/V99/extra` yields `CHAN42` and
/// `V99`.
pub fn channel_and_view(episode_url: &str) -> Result<(String, String), CatalogError> {
    let segments: Vec<&str> = episode_url.split('/').collect();

    match (segments.get(2), segments.get(4)) {
        (Some(channel), Some(view)) if !channel.is_empty() && !view.is_empty() => {
            Ok((channel.to_string(), view.to_string()))
        }
        _ => Err(CatalogError::MalformedEpisodeUrl(episode_url.to_string())),
    }
}

/// Plot text shown for a video
fn video_description(title: &str, channel: &str) -> String {
    format!("Title: {}\nChannel: {}", title, channel)
}

/// Maps parallel title, episode URL and artwork sequences to playable items
///
/// Items keep the input order. When the sequences differ in length the
/// surplus of the longer ones is ignored.
///
/// # Arguments
///
/// * `titles` - Display titles, one per video
/// * `episode_urls` - Episode URLs of the form `/channel/<channel>/view/<view>`
/// * `art_urls` - Remote artwork URLs, resolved through `artwork`
/// * `artwork` - Resolver turning remote artwork into local files
///
/// # Returns
///
/// One playable item per complete triple, or the first error from URL
/// parsing or artwork resolution
///
/// # Examples
///
/// ```ignore
/// let items = map_videos(&titles, &episode_urls, &art_urls, &cache)?;
/// assert!(items.iter().all(|item| item.is_playable));
/// ```
pub fn map_videos<A: ArtworkResolver + ?Sized>(
    titles: &[String],
    episode_urls: &[String],
    art_urls: &[String],
    artwork: &A,
) -> Result<Vec<CatalogItem>, CatalogError> {
    titles
        .iter()
        .zip(episode_urls)
        .zip(art_urls)
        .map(|((title, episode_url), art_url)| {
            let (channel, view) = channel_and_view(episode_url)?;
            let local = artwork.resolve_local_path(art_url)?;

            Ok(CatalogItem {
                label: title.clone(),
                description: Some(video_description(title, &channel)),
                navigation_target: Route::PlayVideo { channel, view },
                artwork: Artwork::uniform(local),
                is_playable: true,
            })
        })
        .collect()
}

/// Maps scraped video cards to playable items
pub fn map_scraped_videos<A: ArtworkResolver + ?Sized>(
    videos: Vec<ScrapedVideo>,
    artwork: &A,
) -> Result<Vec<CatalogItem>, CatalogError> {
    let mut titles = Vec::with_capacity(videos.len());
    let mut episode_urls = Vec::with_capacity(videos.len());
    let mut art_urls = Vec::with_capacity(videos.len());

    for video in videos {
        titles.push(video.title);
        episode_urls.push(video.episode_url);
        art_urls.push(video.art_url);
    }

    map_videos(&titles, &episode_urls, &art_urls, artwork)
}

/// Maps the scraped category index to category references
pub fn map_categories<A: ArtworkResolver + ?Sized>(
    categories: Vec<ScrapedCategory>,
    artwork: &A,
) -> Result<Vec<CategoryRef>, CatalogError> {
    categories
        .into_iter()
        .map(|category| {
            let local = artwork.resolve_local_path(&category.art_url)?;
            Ok(CategoryRef {
                label: category.label,
                category_key: category.key,
                artwork: Artwork::uniform(local),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    /// Pretends every image is cached under /thumbs
    #[derive(Default)]
    struct FakeArtwork {
        requested: RefCell<Vec<String>>,
    }

    impl ArtworkResolver for FakeArtwork {
        fn resolve_local_path(&self, remote_url: &str) -> Result<PathBuf, CacheError> {
            self.requested.borrow_mut().push(remote_url.to_string());
            let name = remote_url.rsplit('/').next().unwrap_or_default();
            Ok(Path::new("/thumbs").join(name))
        }
    }

    struct BrokenArtwork;

    impl ArtworkResolver for BrokenArtwork {
        fn resolve_local_path(&self, remote_url: &str) -> Result<PathBuf, CacheError> {
            Err(CacheError::InvalidUrl(remote_url.to_string()))
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_channel_and_view() {
        assert_eq!(
            channel_and_view("/watch/CHAN42/view/V99/extra").unwrap(),
            ("CHAN42".to_string(), "V99".to_string())
        );
        assert_eq!(
            channel_and_view("/channel/abc/view/def").unwrap(),
            ("abc".to_string(), "def".to_string())
        );
        assert!(matches!(
            channel_and_view("/channel/abc"),
            Err(CatalogError::MalformedEpisodeUrl(_))
        ));
    }

    #[test]
    fn test_map_videos_preserves_order() {
        let artwork = FakeArtwork::default();
        let items = map_videos(
            &strings(&["Zebra", "Apple", "Mango"]),
            &strings(&[
                "/channel/c1/view/v1",
                "/channel/c2/view/v2",
                "/channel/c3/view/v3",
            ]),
            &strings(&["https://x/1", "https://x/2", "https://x/3"]),
            &artwork,
        )
        .unwrap();

        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Zebra", "Apple", "Mango"]);
        assert!(items.iter().all(|i| i.is_playable && !i.is_folder()));

        assert_eq!(
            items[1].navigation_target,
            Route::PlayVideo {
                channel: "c2".to_string(),
                view: "v2".to_string()
            }
        );
        assert_eq!(
            items[1].description.as_deref(),
            Some("Title: Apple\nChannel: c2")
        );
        assert_eq!(
            items[1].artwork,
            Artwork::uniform(PathBuf::from("/thumbs/2"))
        );
    }

    #[test]
    fn test_map_videos_truncates_to_shortest() {
        let artwork = FakeArtwork::default();
        let items = map_videos(
            &strings(&["One", "Two", "Three"]),
            &strings(&["/channel/c1/view/v1", "/channel/c2/view/v2"]),
            &strings(&["https://x/1", "https://x/2", "https://x/3"]),
            &artwork,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(artwork.requested.borrow().len(), 2);
    }

    #[test]
    fn test_map_videos_artwork_failure() {
        let result = map_videos(
            &strings(&["One"]),
            &strings(&["/channel/c1/view/v1"]),
            &strings(&["https://x/"]),
            &BrokenArtwork,
        );
        assert!(matches!(result, Err(CatalogError::Artwork(_))));
    }

    #[test]
    fn test_map_categories() {
        let artwork = FakeArtwork::default();
        let categories = map_categories(
            vec![ScrapedCategory {
                label: "Horror".to_string(),
                key: "horror".to_string(),
                art_url: "https://x/horror.png".to_string(),
            }],
            &artwork,
        )
        .unwrap();

        assert_eq!(categories[0].category_key, "horror");

        let item = CatalogItem::from(categories[0].clone());
        assert!(item.is_folder());
        assert_eq!(
            item.navigation_target,
            Route::Categories {
                category: Some("horror".to_string())
            }
        );
    }
}
