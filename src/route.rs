//! Navigation routes
//!
//! Every entry the addon shows points at a route. Routes travel through the
//! host as plugin paths (`/categories/horror`, `/play_video/abc/def`) and are
//! parsed back into a [`Route`] when the host invokes the addon.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while parsing a plugin path
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// No route is registered for the path
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// The route needs a parameter the path does not provide
    #[error("Route {route} is missing parameter '{parameter}'")]
    MissingParameter {
        route: &'static str,
        parameter: &'static str,
    },
}

/// A navigation intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    /// The addon's root menu
    MainMenu,
    /// The category index, or one category's videos
    Categories { category: Option<String> },
    /// Videos featured on the front page
    Explore,
    /// Search results; without a query the user is asked for one
    Search { query: Option<String> },
    /// Play one video
    PlayVideo { channel: String, view: String },
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::MainMenu => write!(f, "/"),
            Route::Categories { category: None } => write!(f, "/categories"),
            Route::Categories {
                category: Some(category),
            } => write!(f, "/categories/{}", urlencoding::encode(category)),
            Route::Explore => write!(f, "/explore"),
            Route::Search { query: None } => write!(f, "/search"),
            Route::Search { query: Some(query) } => {
                write!(f, "/search/{}", urlencoding::encode(query))
            }
            Route::PlayVideo { channel, view } => write!(
                f,
                "/play_video/{}/{}",
                urlencoding::encode(channel),
                urlencoding::encode(view)
            ),
        }
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

impl FromStr for Route {
    type Err = RouteError;

    /// Parses a plugin path. A leading `plugin://<addon id>` prefix and any
    /// trailing slash are ignored.
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = match path.strip_prefix("plugin://") {
            Some(rest) => rest.find('/').map(|i| &rest[i..]).unwrap_or("/"),
            None => path,
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Ok(Route::MainMenu),
            ["categories"] => Ok(Route::Categories { category: None }),
            ["categories", category] => Ok(Route::Categories {
                category: Some(decode(category)),
            }),
            ["explore"] => Ok(Route::Explore),
            ["search"] => Ok(Route::Search { query: None }),
            ["search", query] => Ok(Route::Search {
                query: Some(decode(query)),
            }),
            ["play_video"] => Err(RouteError::MissingParameter {
                route: "play_video",
                parameter: "channel",
            }),
            ["play_video", _] => Err(RouteError::MissingParameter {
                route: "play_video",
                parameter: "view",
            }),
            ["play_video", channel, view] => Ok(Route::PlayVideo {
                channel: decode(channel),
                view: decode(view),
            }),
            _ => Err(RouteError::UnknownRoute(path.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        assert_eq!("/".parse::<Route>(), Ok(Route::MainMenu));
        assert_eq!("".parse::<Route>(), Ok(Route::MainMenu));
        assert_eq!(
            "/categories".parse::<Route>(),
            Ok(Route::Categories { category: None })
        );
        assert_eq!(
            "/categories/horror/".parse::<Route>(),
            Ok(Route::Categories {
                category: Some("horror".to_string())
            })
        );
        assert_eq!("/explore".parse::<Route>(), Ok(Route::Explore));
        assert_eq!(
            "/search".parse::<Route>(),
            Ok(Route::Search { query: None })
        );
        assert_eq!(
            "/play_video/CHAN42/V99".parse::<Route>(),
            Ok(Route::PlayVideo {
                channel: "CHAN42".to_string(),
                view: "V99".to_string()
            })
        );
    }

    #[test]
    fn test_parse_plugin_url() {
        assert_eq!(
            "plugin://plugin.video.gabtv/explore".parse::<Route>(),
            Ok(Route::Explore)
        );
        assert_eq!(
            "plugin://plugin.video.gabtv".parse::<Route>(),
            Ok(Route::MainMenu)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "/play_video/CHAN42".parse::<Route>(),
            Err(RouteError::MissingParameter {
                route: "play_video",
                parameter: "view"
            })
        );
        assert!(matches!(
            "/find_fanart/x".parse::<Route>(),
            Err(RouteError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_display_encodes_parameters() {
        let route = Route::Search {
            query: Some("free speech/news".to_string()),
        };
        assert_eq!(route.to_string(), "/search/free%20speech%2Fnews");
        assert_eq!(route.to_string().parse::<Route>(), Ok(route));
    }
}
