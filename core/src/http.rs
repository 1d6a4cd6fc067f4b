//! HTTP request and response types described as plain data.
//!
//! # Design
//! `HttpRequest` is everything a caller says about one call: method, a
//! relative or absolute URL, headers, query pairs, an optional JSON body, an
//! optional deadline and an optional cancel handle. Building one never
//! touches the network. `Transport` resolves it into a `PreparedRequest`
//! (absolute URL, merged headers) before handing it to a `Backend`, which
//! answers with an `HttpResponse`.
//!
//! All fields use owned types (`String`, `Vec`) so values can move freely
//! between tasks and threads.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::cancel::CancelHandle;

/// Ordered `(name, value)` header pairs. Names compare case-insensitively.
pub type Headers = Vec<(String, String)>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One HTTP call described as plain data.
///
/// The value is consumed by `Transport::send`, so a request cannot change
/// after it has been issued.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL, or a path resolved against the transport's base URL.
    pub url: String,
    pub headers: Headers,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelHandle>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Set a header, replacing any existing header with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Append a query pair. Pairs are percent-encoded when the request is
    /// prepared.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Serialize `payload` as the JSON body. Adds `Content-Type:
    /// application/json` unless a content type is already set.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_string(payload)?);
        if self.header_value("content-type").is_none() {
            self.headers
                .push(("Content-Type".to_string(), "application/json".to_string()));
        }
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancel_with(mut self, handle: &CancelHandle) -> Self {
        self.cancel = Some(handle.clone());
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A request after URL resolution and header merging, ready for a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
}

/// A raw HTTP response as returned by a backend, before classification.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
}

/// Case-insensitive header lookup. The last matching header wins.
pub fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .rev()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Layer `overrides` on top of `defaults`. A header in `overrides` replaces
/// every default with the same (case-insensitive) name.
pub fn merge_headers(defaults: &[(String, String)], overrides: &[(String, String)]) -> Headers {
    let mut merged: Headers = defaults.to_vec();
    for (name, value) in overrides {
        merged.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        merged.push((name.clone(), value.clone()));
    }
    merged
}

/// Serialize header pairs as a JSON object instead of an array of pairs.
pub(crate) fn serialize_headers<S: Serializer>(
    headers: &[(String, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(headers.iter().map(|(name, value)| (name, value)))
}
