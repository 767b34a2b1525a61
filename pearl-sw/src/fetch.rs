//! Fetch Model
//!
//! Requests, responses and origin matching used by the fetch interception
//! path, plus the [`Network`] trait the host implements to reach the real
//! network.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use async_trait::async_trait;

use crate::error::{ConfigError, NetworkError};

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
        }
    }
}

/// Request destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// Unknown (fetch/XHR)
    #[default]
    Empty,
    /// Top-level document navigation
    Document,
    Frame,
    IFrame,
    Image,
    Font,
    Manifest,
    Script,
    Style,
    Worker,
    Audio,
    Video,
}

impl Destination {
    /// Whether this request loads a full document.
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Document)
    }
}

/// An absolute `scheme://host[:port]` origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Origin(String);

impl Origin {
    /// Parse an origin, dropping any trailing slash.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let trimmed = value.trim().trim_end_matches('/');
        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .ok_or_else(|| ConfigError::InvalidOrigin(value.to_string()))?;

        if rest.is_empty() || rest.contains(['/', '?', '#']) {
            return Err(ConfigError::InvalidOrigin(value.to_string()));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Wrap a known-good lower-case origin literal.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    /// Get the origin string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether `url` belongs to this origin.
    ///
    /// The origin must be followed by a path, query, fragment or nothing,
    /// so `https://a.test` does not match `https://a.test.evil`.
    pub fn contains(&self, url: &str) -> bool {
        let Some(head) = url.get(..self.0.len()) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(&self.0) {
            return false;
        }
        matches!(url[self.0.len()..].chars().next(), None | Some('/' | '?' | '#'))
    }

    /// Resolve a path (or absolute URL) against this origin.
    pub fn resolve(&self, path: &str) -> String {
        if path.contains("://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.0, path)
        } else {
            format!("{}/{}", self.0, path)
        }
    }
}

impl core::fmt::Display for Origin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cache key for a URL: the URL without its fragment.
pub fn cache_key(url: &str) -> &str {
    match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// Fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Absolute request URL
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Request destination
    pub destination: Destination,
}

impl Request {
    /// Create a GET request with an empty destination
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            destination: Destination::Empty,
        }
    }

    /// Create a document navigation request
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::get(url).with_destination(Destination::Document)
    }

    /// Set the method
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the destination
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }
}

/// Fetch response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL (empty for synthetic responses)
    pub url: String,
    /// Status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// Response headers (lower-cased names)
    pub headers: BTreeMap<String, String>,
    /// Response body
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response
    pub fn new(status: u16) -> Self {
        Self {
            url: String::new(),
            status,
            status_text: status_text_for(status).to_string(),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// 200 response with a `text/html` body
    pub fn html(body: &str) -> Self {
        Self::new(200)
            .with_header("Content-Type", "text/html")
            .with_body(body.as_bytes())
    }

    /// Set the URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Add a header
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Check if response is OK
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// `Content-Type` header
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> Option<&str> {
        core::str::from_utf8(&self.body).ok()
    }

    /// Approximate stored size in bytes
    pub fn size(&self) -> usize {
        self.body.len()
            + self
                .headers
                .iter()
                .map(|(k, v)| k.len() + v.len())
                .sum::<usize>()
    }
}

/// Get status text for status code
fn status_text_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

/// Network access provided by the host.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform a network fetch for `request`.
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}
