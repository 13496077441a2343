//! Directory listings
//!
//! A [`Listing`] is what the host renders as a virtual directory: the items
//! plus display configuration. The settings that shape how a listing looks
//! (sorting, disk caching, fanart) are applied here so every view behaves the
//! same.

use crate::catalog::CatalogItem;
use crate::settings::Settings;
use serde::Serialize;
use std::path::PathBuf;

/// Name shown at the root of the breadcrumb
pub const ADDON_NAME: &str = "Gab TV";

/// Sort methods offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMethod {
    Label,
    Unsorted,
}

impl SortMethod {
    const ALL: [SortMethod; 2] = [SortMethod::Label, SortMethod::Unsorted];
}

/// Kind of content a listing holds, used by the host to pick a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Videos,
    Images,
}

/// How a view wants its listing shown
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingOptions {
    /// Breadcrumb label of the view
    pub category: Option<String>,
    /// Preferred sort method
    pub sort: Option<SortMethod>,
    pub content: Option<ContentType>,
    /// Explicit disk-caching choice; the setting decides when unset
    pub cache: Option<bool>,
}

/// A listing ready to be handed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub items: Vec<CatalogItem>,
    /// Breadcrumb shown above the listing
    pub category_label: String,
    /// Sort methods, the preferred one first
    pub sort_methods: Vec<SortMethod>,
    pub content: Option<ContentType>,
    /// Whether the host may cache the listing on disk
    pub cache_to_disc: bool,
}

impl Listing {
    /// Builds a listing, applying the display settings to `items`
    ///
    /// # Arguments
    ///
    /// * `items` - Entries in display order
    /// * `options` - Per-listing category, sort, content type and cache hint
    /// * `settings` - Addon settings; `use_menu_caching`, `show_oneoff` and
    ///   `show_fanart` shape the result
    ///
    /// # Returns
    ///
    /// The listing with breadcrumb, sort methods (preferred first) and fanart
    /// fallback applied
    pub fn build(
        mut items: Vec<CatalogItem>,
        options: ListingOptions,
        settings: &Settings,
    ) -> Self {
        let cache_to_disc = match options.cache {
            Some(cache) => cache && settings.use_menu_caching,
            None => settings.use_menu_caching,
        };

        let mut sort = options.sort.unwrap_or(SortMethod::Unsorted);
        // Keep the site's order for video listings when asked to
        if settings.show_oneoff
            && sort == SortMethod::Label
            && options.content == Some(ContentType::Videos)
        {
            sort = SortMethod::Unsorted;
        }

        let mut sort_methods = vec![sort];
        sort_methods.extend(SortMethod::ALL.iter().copied().filter(|s| *s != sort));

        if settings.show_fanart {
            if let Some(fanart) = &settings.addon_fanart {
                for item in &mut items {
                    if item.artwork.fanart.is_none() {
                        item.artwork.fanart = Some(PathBuf::from(fanart));
                    }
                }
            }
        }

        Self {
            items,
            category_label: breadcrumb(options.category.as_deref(), options.content),
            sort_methods,
            content: options.content,
            cache_to_disc,
        }
    }

    /// The sort method the listing opens with
    pub fn preferred_sort(&self) -> SortMethod {
        self.sort_methods
            .first()
            .copied()
            .unwrap_or(SortMethod::Unsorted)
    }
}

fn breadcrumb(category: Option<&str>, content: Option<ContentType>) -> String {
    match (category, content) {
        (Some(category), None) => format!("{} / {}", ADDON_NAME, category),
        (Some(category), Some(_)) => category.to_string(),
        (None, None) => ADDON_NAME.to_string(),
        (None, Some(_)) => String::new(),
    }
}
