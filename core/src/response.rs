//! Successful outcomes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Failure;
use crate::http::{find_header, serialize_headers, Headers, HttpMethod};

/// What every issued request resolves to: exactly one of a response or a
/// classified failure.
pub type Outcome = Result<ResponseResult, Failure>;

/// The request that produced a response, as it went over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    pub method: HttpMethod,
    pub url: String,
    #[serde(serialize_with = "serialize_headers")]
    pub headers: Headers,
}

/// A response with status below 400, decoded and transformed.
#[derive(Debug, Clone)]
pub struct ResponseResult {
    pub status: u16,
    pub headers: Headers,
    pub body: Value,
    pub request: RequestSummary,
}

impl ResponseResult {
    /// Deserialize the decoded body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Decode a raw body. Text that is not JSON is kept as a JSON string.
pub fn decode_body(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
