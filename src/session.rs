//! HTTP session
//!
//! The session owns the blocking HTTP client together with its cookie jar and
//! the extra headers sent with every request. Stream URLs handed to the player
//! carry the same cookies and headers, so the session also knows how to render
//! them into the player's header fragment.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;
use url::form_urlencoded;

/// User agent sent with every request to the site
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3987.163 Safari/537.36 OPR/67.0.3575.137";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters left as-is in the cookie header: unreserved ones plus `/`
const COOKIE_HEADER: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Errors that can occur while talking to a remote server
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuildFailed(reqwest::Error),

    /// The request could not be sent or the body could not be read
    #[error("Request to {url} failed: {source}")]
    RequestFailed { url: String, source: reqwest::Error },

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// The URL could not be parsed
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

/// A fully read HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    /// Raw `Content-Type` header, if the server sent a readable one
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

/// Something that can GET a URL and hand back the whole response.
///
/// The scraper and the thumbnail cache only ever need this, which keeps them
/// testable without a network.
pub trait Fetcher {
    /// Performs a blocking GET of `url`
    ///
    /// # Errors
    ///
    /// Returns an error on connection failures, timeouts and non-2xx statuses.
    fn fetch(&self, url: &str) -> Result<FetchedResponse, NetworkError>;
}

/// Blocking HTTP session with an explicit cookie jar
pub struct HttpSession {
    client: reqwest::blocking::Client,
    jar: Arc<Jar>,
    cookie_url: Url,
    headers: Vec<(String, String)>,
}

impl HttpSession {
    /// Creates a session whose cookies are scoped to `base_url`
    pub fn new(base_url: &str) -> Result<Self, NetworkError> {
        let cookie_url = Url::parse(base_url).map_err(|e| NetworkError::InvalidUrl {
            url: base_url.to_string(),
            source: e,
        })?;

        let jar = Arc::new(Jar::default());
        let client = reqwest::blocking::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(NetworkError::ClientBuildFailed)?;

        Ok(Self {
            client,
            jar,
            cookie_url,
            headers: Vec::new(),
        })
    }

    /// Adds a header sent with every request and forwarded to the player
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Stores a cookie as if the site had set it (`name=value; attributes`)
    pub fn add_cookie(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, &self.cookie_url);
    }

    /// Cookies currently held for the site, in jar order
    pub fn cookies(&self) -> Vec<(String, String)> {
        let Some(header) = self.jar.cookies(&self.cookie_url) else {
            return Vec::new();
        };
        let Ok(header) = header.to_str() else {
            return Vec::new();
        };

        header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                Some((name.to_string(), value.to_string()))
            })
            .collect()
    }

    /// The header fragment the player appends to stream URLs
    pub fn auth_fragment(&self) -> String {
        auth_fragment(&self.cookies(), &self.headers)
    }

    fn request_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                map.insert(name, value);
            }
        }
        map
    }
}

impl Fetcher for HttpSession {
    fn fetch(&self, url: &str) -> Result<FetchedResponse, NetworkError> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .headers(self.request_headers())
            .send()
            .map_err(|e| NetworkError::RequestFailed {
                url: url.to_string(),
                source: e,
            })?;

        read_response(url, response)
    }
}

/// Cookie-less client used for artwork downloads
pub struct PlainFetcher {
    client: reqwest::blocking::Client,
}

impl PlainFetcher {
    /// Creates a client with the shared request timeout and no cookie store
    pub fn new() -> Result<Self, NetworkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(NetworkError::ClientBuildFailed)?;
        Ok(Self { client })
    }
}

impl Fetcher for PlainFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedResponse, NetworkError> {
        debug!(url, "GET artwork");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| NetworkError::RequestFailed {
                url: url.to_string(),
                source: e,
            })?;

        read_response(url, response)
    }
}

fn read_response(
    url: &str,
    response: reqwest::blocking::Response,
) -> Result<FetchedResponse, NetworkError> {
    if !response.status().is_success() {
        return Err(NetworkError::HttpStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .bytes()
        .map_err(|e| NetworkError::RequestFailed {
            url: url.to_string(),
            source: e,
        })?
        .to_vec();

    Ok(FetchedResponse { content_type, body })
}

/// Renders cookies and headers into the player's URL header fragment
///
/// The fragment starts with `|`, followed by a percent-encoded `Cookie` header
/// (pairs joined with `;`), a `&`, and the remaining headers form-encoded.
pub fn auth_fragment(cookies: &[(String, String)], headers: &[(String, String)]) -> String {
    let cookie_header = cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(";");

    let encoded_headers = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(headers.iter())
        .finish();

    format!(
        "|Cookie={}&{}",
        utf8_percent_encode(&cookie_header, COOKIE_HEADER),
        encoded_headers
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_auth_fragment_single_cookie() {
        let fragment = auth_fragment(&pairs(&[("a", "1")]), &[]);
        assert_eq!(fragment, "|Cookie=a%3D1&");
    }

    #[test]
    fn test_auth_fragment_multiple_cookies_and_headers() {
        let fragment = auth_fragment(
            &pairs(&[("a", "1"), ("session", "x y")]),
            &pairs(&[("Referer", "https://tv.gab.com/"), ("X-Test", "a b")]),
        );
        assert_eq!(
            fragment,
            "|Cookie=a%3D1%3Bsession%3Dx%20y&Referer=https%3A%2F%2Ftv.gab.com%2F&X-Test=a+b"
        );
    }

    #[test]
    fn test_auth_fragment_keeps_slash_in_cookies() {
        let fragment = auth_fragment(&pairs(&[("sid", "ab/cd+ef=="), ("t", "x~y.z")]), &[]);
        assert_eq!(fragment, "|Cookie=sid%3Dab/cd%2Bef%3D%3D%3Bt%3Dx~y.z&");
    }

    #[test]
    fn test_auth_fragment_without_cookies() {
        assert_eq!(auth_fragment(&[], &[]), "|Cookie=&");
    }

    #[test]
    fn test_session_cookies_from_jar() {
        let session = HttpSession::new("https://tv.gab.com").unwrap();
        assert!(session.cookies().is_empty());

        session.add_cookie("a=1; Path=/");
        assert_eq!(session.cookies(), pairs(&[("a", "1")]));
        assert_eq!(session.auth_fragment(), "|Cookie=a%3D1&");
    }

    #[test]
    fn test_session_headers_in_fragment() {
        let session = HttpSession::new("https://tv.gab.com")
            .unwrap()
            .with_header("Referer", "https://tv.gab.com/");
        assert_eq!(
            session.auth_fragment(),
            "|Cookie=&Referer=https%3A%2F%2Ftv.gab.com%2F"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpSession::new("not a url");
        assert!(matches!(result, Err(NetworkError::InvalidUrl { .. })));
    }
}
