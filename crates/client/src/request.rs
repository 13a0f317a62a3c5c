//! Request and response data model
//!
//! Everything that flows through the interceptor chain is defined here: the
//! normalized request, the per-call options, and the reply value that
//! post-request hooks transform.

use reqwest::header::HeaderMap;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// A configuration record: a JSON object merged by shallow key override
pub type ConfigMap = Map<String, Value>;

/// An argument record: path parameters and/or payload fields
pub type ArgMap = Map<String, Value>;

/// Shallow-merge two records; keys in `overrides` win
#[must_use]
pub fn merge_maps(base: &ConfigMap, overrides: &ConfigMap) -> ConfigMap {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Convert a JSON value into a record; non-object values yield an empty record
#[must_use]
pub fn record_of(value: Value) -> ConfigMap {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// HTTP methods supported by member declarations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET — residual arguments become a query string
    #[default]
    Get,
    /// POST — residual arguments become the request payload
    Post,
    /// PATCH — residual arguments become the request payload
    Patch,
    /// PUT — residual arguments become the request payload
    Put,
    /// DELETE — residual arguments become a query string
    Delete,
}

impl Method {
    /// Wire name of the method
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether arguments ride in the request body rather than the query string
    #[must_use]
    pub fn has_request_body(&self) -> bool {
        matches!(self, Self::Post | Self::Patch | Self::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// The single normalized request representation seen by `pre_request` hooks
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    /// Fully resolved destination URL
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Request headers
    pub headers: HeaderMap,
    /// Serialized request body, if any
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request for the given URL with default method and no headers
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// The two accepted request forms: a destination plus options, or a request
/// that has already been built by an outer layer
#[derive(Debug, Clone)]
pub enum RequestTarget {
    /// A bare destination URL; the request is assembled from the options
    Url(String),
    /// A pre-built request, passed through unchanged
    Request(HttpRequest),
}

impl RequestTarget {
    /// Normalize into the single request representation
    #[must_use]
    pub fn into_request(self, options: &RequestOptions) -> HttpRequest {
        match self {
            Self::Request(request) => request,
            Self::Url(url) => HttpRequest {
                url,
                method: options.method.unwrap_or_default(),
                headers: options.headers.clone(),
                body: None,
            },
        }
    }
}

impl From<&str> for RequestTarget {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for RequestTarget {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<HttpRequest> for RequestTarget {
    fn from(request: HttpRequest) -> Self {
        Self::Request(request)
    }
}

/// Per-call request options
///
/// Carried alongside the request through every layer of the chain. The
/// `config` fragment participates in the per-call configuration merge; `data`
/// is the not-yet-serialized payload consumed by the body-serializer
/// interceptor; `timeout` is caller-owned and opaque to the chain.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method override used when normalizing a bare URL target
    pub method: Option<Method>,
    /// Request headers
    pub headers: HeaderMap,
    /// Unserialized request payload
    pub data: Option<Value>,
    /// Per-call configuration fragment; wins over static configuration
    pub config: ConfigMap,
    /// Per-call timeout, applied by the base transport only
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Create empty options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to set the HTTP method
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Builder-style method to set the headers
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Builder-style method to set the payload
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Builder-style method to set the per-call configuration fragment.
    /// Non-object values are treated as an empty fragment.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = record_of(config);
        self
    }

    /// Builder-style method to set the per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A response produced by the base transport
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Status text reported alongside the code
    pub status_text: String,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub body: String,
}

impl HttpResponse {
    /// Whether the status code is in the 2xx range
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; an empty body parses to `Value::Null`
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body)
    }
}

/// The value flowing through post-request hooks
///
/// The base transport yields `Http`; the JSON-parser interceptor maps it to
/// `Json`. Hooks that only understand one form pass the other through.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A raw response that no interceptor has parsed yet
    Http(HttpResponse),
    /// An already-parsed JSON value
    Json(Value),
}

impl Reply {
    /// View the raw response, if this reply still is one
    #[must_use]
    pub fn as_http(&self) -> Option<&HttpResponse> {
        match self {
            Self::Http(response) => Some(response),
            Self::Json(_) => None,
        }
    }

    /// Convert into a JSON value, parsing the response body if necessary
    pub fn into_json(self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Http(response) => response.json(),
            Self::Json(value) => Ok(value),
        }
    }
}
