//! HTML parsers for Gab TV pages
//!
//! Every parser works on the raw page source and either returns all entries
//! it found or a parse error naming the element that was missing. A page
//! without the expected container is an error; a container without children
//! is an empty, successful result.

use super::{ScrapeError, ScrapedCategory, ScrapedVideo};
use scraper::{ElementRef, Html, Selector};

/// Grid holding the video cards on the front page and search results
const VIDEO_GRID: &str = "div.uk-grid-small.uk-flex-center";

/// Video card on a category page
const CATEGORY_CARD: &str =
    r#"div[class="uk-width-1-1 uk-width-1-2@s uk-width-1-3@m uk-width-1-4@l uk-width-1-5@xl"]"#;

/// Grid holding the category tiles
const CATEGORY_GRID: &str = "div.uk-flex-center";

const CARD_THUMBNAIL: &str = "div.studio-episode-thumbnail img";
const CATEGORY_LABEL: &str = "div.uk-text-bold.uk-text-truncate";
const VIDEO_META: &str = r#"meta[property="og:video"]"#;
const PLAYER: &str = "div.studio-player";

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::parse(css, format!("invalid selector: {}", e)))
}

/// Prefixes site-relative paths with `base_url`
fn absolute_url(base_url: &str, src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        src.to_string()
    } else {
        format!("{}{}", base_url, src)
    }
}

/// Immediate `div` children of an element
fn child_divs<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "div")
}

fn required_attr(
    element: ElementRef<'_>,
    attr: &str,
    page: &str,
    what: &str,
) -> Result<String, ScrapeError> {
    element
        .value()
        .attr(attr)
        .map(str::to_string)
        .ok_or_else(|| ScrapeError::parse(page, format!("{} has no '{}' attribute", what, attr)))
}

/// Extracts one video card
fn parse_video_card(
    card: ElementRef<'_>,
    base_url: &str,
    page: &str,
) -> Result<ScrapedVideo, ScrapeError> {
    let thumbnail = card
        .select(&selector(CARD_THUMBNAIL)?)
        .next()
        .ok_or_else(|| ScrapeError::parse(page, "video card without thumbnail image"))?;
    let src = required_attr(thumbnail, "src", page, "thumbnail image")?;

    let details = card
        .select(&selector("div")?)
        .next()
        .ok_or_else(|| ScrapeError::parse(page, "video card without details element"))?;

    Ok(ScrapedVideo {
        title: required_attr(details, "title", page, "video card")?,
        episode_url: required_attr(details, "data-episode-url", page, "video card")?,
        art_url: absolute_url(base_url, &src),
    })
}

/// Parses the video grid of the front page or a search result page
pub(crate) fn parse_video_grid(
    html: &str,
    base_url: &str,
    page: &str,
) -> Result<Vec<ScrapedVideo>, ScrapeError> {
    let document = Html::parse_document(html);
    let grid = document
        .select(&selector(VIDEO_GRID)?)
        .next()
        .ok_or_else(|| ScrapeError::parse(page, "video grid not found"))?;

    child_divs(grid)
        .map(|card| parse_video_card(card, base_url, page))
        .collect()
}

/// Parses the video cards of a category page
pub(crate) fn parse_category_page(
    html: &str,
    base_url: &str,
    page: &str,
) -> Result<Vec<ScrapedVideo>, ScrapeError> {
    let document = Html::parse_document(html);
    let cards = selector(CATEGORY_CARD)?;

    document
        .select(&cards)
        .map(|card| parse_video_card(card, base_url, page))
        .collect()
}

/// Parses the category index
pub(crate) fn parse_category_index(
    html: &str,
    base_url: &str,
    page: &str,
) -> Result<Vec<ScrapedCategory>, ScrapeError> {
    let document = Html::parse_document(html);
    let grid = document
        .select(&selector(CATEGORY_GRID)?)
        .next()
        .ok_or_else(|| ScrapeError::parse(page, "category grid not found"))?;

    let image_sel = selector("img")?;
    let label_sel = selector(CATEGORY_LABEL)?;
    let link_sel = selector("a")?;

    child_divs(grid)
        .map(|tile| {
            let img = tile
                .select(&image_sel)
                .next()
                .ok_or_else(|| ScrapeError::parse(page, "category tile without image"))?;
            let src = required_attr(img, "src", page, "category image")?;

            let label = tile
                .select(&label_sel)
                .next()
                .and_then(|el| el.text().next())
                .map(|text| text.trim().to_string())
                .ok_or_else(|| ScrapeError::parse(page, "category tile without label"))?;

            let anchor = tile
                .select(&link_sel)
                .next()
                .ok_or_else(|| ScrapeError::parse(page, "category tile without link"))?;
            let href = required_attr(anchor, "href", page, "category link")?;

            Ok(ScrapedCategory {
                label,
                key: category_slug(&href),
                art_url: absolute_url(base_url, &src),
            })
        })
        .collect()
}

/// Last path segment of a category link
pub(crate) fn category_slug(href: &str) -> String {
    href.rsplit('/').next().unwrap_or_default().to_string()
}

/// Parses a video page into its media URL and view key
pub(crate) fn parse_stream_page(html: &str, page: &str) -> Result<(String, String), ScrapeError> {
    let document = Html::parse_document(html);

    let meta = document
        .select(&selector(VIDEO_META)?)
        .next()
        .ok_or_else(|| ScrapeError::parse(page, "og:video meta tag not found"))?;
    let media_url = required_attr(meta, "content", page, "og:video meta tag")?;

    let player = document
        .select(&selector(PLAYER)?)
        .next()
        .ok_or_else(|| ScrapeError::parse(page, "player element not found"))?;
    let view_key = required_attr(player, "data-view-key", page, "player element")?;

    Ok((media_url, view_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://tv.gab.com";

    fn video_card(title: &str, episode_url: &str, image: &str) -> String {
        format!(
            r#"<div>
                 <div title="{title}" data-episode-url="{episode_url}">
                   <div class="studio-episode-thumbnail"><img src="{image}"></div>
                 </div>
               </div>"#
        )
    }

    #[test]
    fn test_parse_video_grid() {
        let html = format!(
            r#"<html><body>
                 <div class="uk-grid-small uk-flex-center" uk-grid>{}{}</div>
               </body></html>"#,
            video_card("First", "/channel/chan1/view/view1", "/image/one"),
            video_card("Second &amp; more", "/channel/chan2/view/view2", "/image/two"),
        );

        let videos = parse_video_grid(&html, BASE, "/").unwrap();

        assert_eq!(
            videos,
            vec![
                ScrapedVideo {
                    title: "First".to_string(),
                    episode_url: "/channel/chan1/view/view1".to_string(),
                    art_url: "https://tv.gab.com/image/one".to_string(),
                },
                ScrapedVideo {
                    title: "Second & more".to_string(),
                    episode_url: "/channel/chan2/view/view2".to_string(),
                    art_url: "https://tv.gab.com/image/two".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_grid_is_parse_error() {
        let html = "<html><body><p>Maintenance</p></body></html>";
        let result = parse_video_grid(html, BASE, "/");
        assert!(matches!(result, Err(ScrapeError::Parse { .. })));
    }

    #[test]
    fn test_empty_grid_is_empty_listing() {
        let html = r#"<div class="uk-grid-small uk-flex-center"></div>"#;
        let videos = parse_video_grid(html, BASE, "/search?q=nothing").unwrap();
        assert!(videos.is_empty());
    }

    #[test]
    fn test_card_without_episode_url() {
        let html = r#"<div class="uk-grid-small uk-flex-center">
            <div><div title="Broken"><div class="studio-episode-thumbnail"><img src="/i"></div></div></div>
        </div>"#;
        let err = parse_video_grid(html, BASE, "/").unwrap_err();
        assert!(err.to_string().contains("data-episode-url"));
    }

    #[test]
    fn test_parse_category_page() {
        let class = "uk-width-1-1 uk-width-1-2@s uk-width-1-3@m uk-width-1-4@l uk-width-1-5@xl";
        let html = format!(
            r#"<div class="{class}"><div title="Scary" data-episode-url="/channel/c/view/v">
                 <div class="studio-episode-thumbnail"><img src="https://cdn.gab.com/i.jpg"></div>
               </div></div>
               <div class="uk-width-1-1">ignored</div>"#
        );

        let videos = parse_category_page(&html, BASE, "/category/horror").unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].title, "Scary");
        assert_eq!(videos[0].art_url, "https://cdn.gab.com/i.jpg");
    }

    #[test]
    fn test_parse_category_index() {
        let html = r#"<div class="uk-flex-center">
            <div>
              <a href="/category/horror"><img src="/img/horror.png"></a>
              <div class="uk-text-bold uk-text-truncate"> Horror </div>
            </div>
            <div>
              <a href="https://tv.gab.com/category/news"><img src="/img/news.png"></a>
              <div class="uk-text-bold uk-text-truncate">News<span>12</span></div>
            </div>
        </div>"#;

        let categories = parse_category_index(html, BASE, "/category").unwrap();

        assert_eq!(
            categories,
            vec![
                ScrapedCategory {
                    label: "Horror".to_string(),
                    key: "horror".to_string(),
                    art_url: "https://tv.gab.com/img/horror.png".to_string(),
                },
                ScrapedCategory {
                    label: "News".to_string(),
                    key: "news".to_string(),
                    art_url: "https://tv.gab.com/img/news.png".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_category_index_without_grid_is_parse_error() {
        let html = r#"<div class="uk-grid-small"><p>No categories today</p></div>"#;
        let err = parse_category_index(html, BASE, "/category").unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
        assert!(err.to_string().contains("category grid not found"));
    }

    #[test]
    fn test_category_page_without_cards_is_empty_listing() {
        let html = r#"<html><body>
            <div class="uk-width-1-1"><p>Nothing in this category yet</p></div>
        </body></html>"#;
        let videos = parse_category_page(html, BASE, "/category/empty").unwrap();
        assert!(videos.is_empty());
    }

    #[test]
    fn test_category_slug() {
        assert_eq!(category_slug("/some/path/category/horror"), "horror");
        assert_eq!(category_slug("horror"), "horror");
    }

    #[test]
    fn test_parse_stream_page() {
        let html = r#"<html><head>
            <meta property="og:video" content="https://media.gab.com/video.mp4">
            </head><body>
            <div class="studio-player" data-view-key="abc123"></div>
            </body></html>"#;

        let (media, key) = parse_stream_page(html, "/channel/c/view/v").unwrap();
        assert_eq!(media, "https://media.gab.com/video.mp4");
        assert_eq!(key, "abc123");
    }

    #[test]
    fn test_stream_page_without_player() {
        let html = r#"<meta property="og:video" content="https://media.gab.com/video.mp4">"#;
        let err = parse_stream_page(html, "/channel/c/view/v").unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
        assert!(err.to_string().contains("player"));
    }
}
