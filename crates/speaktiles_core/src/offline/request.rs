//! Request/response values crossing the offline cache boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

/// Body of the synthesized response returned when nothing else is available.
pub const OFFLINE_BODY: &str = "Offline - Please check your connection";

/// What kind of resource the page asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDestination {
    /// Top-level page navigation.
    Document,
    /// Script, style, image, data or anything else.
    Subresource,
}

/// An outgoing resource request seen by the cache controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub method: String,
    pub url: Url,
    pub destination: RequestDestination,
}

impl ResourceRequest {
    /// A `GET` for a subresource.
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            destination: RequestDestination::Subresource,
        }
    }

    /// A `GET` page navigation.
    pub fn navigate(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            destination: RequestDestination::Document,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }

    pub fn is_navigation(&self) -> bool {
        self.destination == RequestDestination::Document
    }

    /// Key used to store and look up this request in a cache generation.
    pub fn cache_key(&self) -> String {
        cache_key(&self.url)
    }
}

/// Cache key for a URL: the URL without its fragment.
pub fn cache_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}

/// A response body with the metadata needed to replay it offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ResourceResponse {
    /// A `200 OK` response.
    pub fn ok(content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// The `503` placeholder served when offline with no cached copy.
    pub fn offline_placeholder() -> Self {
        Self {
            status: 503,
            status_text: "Service Unavailable".to_string(),
            content_type: Some("text/plain".to_string()),
            body: OFFLINE_BODY.as_bytes().to_vec(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure: the network could not be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkError {
    pub url: String,
    pub reason: String,
}

impl NetworkError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "network request to `{}` failed: {}", self.url, self.reason)
    }
}

impl Error for NetworkError {}

/// The real network, as seen by the cache controller.
pub trait Network {
    fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse, NetworkError>;
}

impl<N: Network + ?Sized> Network for &N {
    fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse, NetworkError> {
        (**self).fetch(request)
    }
}
