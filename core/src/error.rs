//! Error types for the harness.
//!
//! # Design
//! `Failure` is the four-way outcome taxonomy every request can end in. The
//! transport returns it as a value and never panics for any of the four.
//! `HttpStatus` keeps the decoded body and headers because callers branch on
//! them; it is never folded into `Network`. `Network` wraps a `NetworkError`
//! whose source chain is preserved for reporting.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::http::Headers;

/// Errors raised by a `Backend` while performing the raw exchange.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend's own deadline elapsed.
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// A response transform rejected the body it was given.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransformError(String);

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Connection-level failures, plus everything else that prevents a response
/// from being delivered that is neither a timeout nor a cancellation.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to encode request body")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("response transform #{index} failed")]
    Transform {
        index: usize,
        #[source]
        source: TransformError,
    },
}

/// How a request failed.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("network error")]
    Network(#[source] NetworkError),

    #[error("{}", timeout_message(.0))]
    Timeout(Option<Duration>),

    #[error("{0}")]
    Cancelled(String),

    #[error("request failed with status code {status}")]
    HttpStatus {
        status: u16,
        headers: Headers,
        body: Value,
    },
}

impl Failure {
    /// Stable name of the failure class.
    pub fn tag(&self) -> &'static str {
        match self {
            Failure::Network(_) => "NetworkFailure",
            Failure::Timeout(_) => "TimeoutFailure",
            Failure::Cancelled(_) => "CancelledFailure",
            Failure::HttpStatus { .. } => "HttpStatusFailure",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<NetworkError> for Failure {
    fn from(err: NetworkError) -> Self {
        Failure::Network(err)
    }
}

fn timeout_message(timeout: &Option<Duration>) -> String {
    match timeout {
        Some(timeout) => format!("timeout of {}ms exceeded", timeout.as_millis()),
        None => "timeout exceeded".to_string(),
    }
}

/// Invalid harness configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of milliseconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Render an error and its source chain as `outer: inner: root`.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
