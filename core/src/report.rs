//! Renders outcomes for display.
//!
//! A success shows its status, response headers, decoded body and the
//! request that produced it. A failure shows its tag, its message and any
//! payload it carries. Rendering never fails: a value that cannot be
//! serialized is shown as a diagnostic string, and a sink that cannot be
//! written to is logged and skipped.

use std::fmt::Write as _;
use std::io;

use serde::Serialize;
use tracing::warn;

use crate::error::{error_chain, Failure};
use crate::http::serialize_headers;
use crate::response::{Outcome, ResponseResult};

/// Header pairs rendered as a JSON object.
struct HeaderView<'a>(&'a [(String, String)]);

impl Serialize for HeaderView<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_headers(self.0, serializer)
    }
}

/// Pretty-print `value` as JSON, or describe why it could not be.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| format!("<unserializable: {err}>"))
}

pub fn render(outcome: &Outcome) -> String {
    match outcome {
        Ok(response) => render_response(response),
        Err(failure) => render_failure(failure),
    }
}

fn render_response(response: &ResponseResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Status: {}", response.status);
    push_section(&mut out, "Headers", &HeaderView(&response.headers));
    push_section(&mut out, "Data", &response.body);
    push_section(&mut out, "Config", &response.request);
    out
}

fn render_failure(failure: &Failure) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ERROR: {}", failure.tag());
    match failure {
        Failure::HttpStatus {
            status,
            headers,
            body,
        } => {
            let _ = writeln!(out, "{failure}");
            let _ = writeln!(out, "Status: {status}");
            push_section(&mut out, "Headers", &HeaderView(headers));
            push_section(&mut out, "Data", body);
        }
        Failure::Network(_) => {
            let _ = writeln!(out, "{}", error_chain(failure));
        }
        Failure::Timeout(_) | Failure::Cancelled(_) => {
            let _ = writeln!(out, "{failure}");
        }
    }
    out
}

fn push_section<T: Serialize + ?Sized>(out: &mut String, title: &str, value: &T) {
    let _ = writeln!(out, "{title}:");
    let _ = writeln!(out, "{}", render_json(value));
}

/// Writes rendered outcomes to a sink.
pub struct Reporter<W> {
    sink: W,
}

impl<W: io::Write> Reporter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn report(&mut self, outcome: &Outcome) {
        let text = render(outcome);
        if let Err(err) = self
            .sink
            .write_all(text.as_bytes())
            .and_then(|()| self.sink.flush())
        {
            warn!(%err, "failed to write report");
        }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
