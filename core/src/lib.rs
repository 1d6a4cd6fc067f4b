//! HTTP client harness for a placeholder REST API.
//!
//! # Overview
//! Issues configurable HTTP calls, supports cancellation and timeouts, and
//! reports every outcome through one contract. A fixed catalog of named
//! operations exercises the whole surface: CRUD methods, parallel fetches,
//! custom headers, response transforms, error statuses, cancellation,
//! base-URL sub-clients and deadlines.
//!
//! # Design
//! - Requests are plain data (`HttpRequest`), built by the templates in
//!   `api` without touching the network.
//! - `Transport` turns a request into exactly one `Outcome`: a
//!   `ResponseResult` or a classified `Failure`. It never panics for
//!   timeouts, cancellations or error statuses.
//! - The raw exchange sits behind the `Backend` trait. `UreqBackend` is the
//!   production implementation; tests substitute in-memory backends.
//! - Configuration is an explicit `ClientConfig` value. There is no global
//!   client state.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod backend;
pub mod cancel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod report;
pub mod response;
pub mod transform;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use backend::{Backend, UreqBackend};
pub use cancel::CancelHandle;
pub use catalog::{Catalog, Operation, UnknownOperation};
pub use config::{ClientConfig, HarnessConfig};
pub use error::{BackendError, ConfigError, Failure, NetworkError, TransformError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse, PreparedRequest};
pub use report::{render, Reporter};
pub use response::{Outcome, RequestSummary, ResponseResult};
pub use transform::{RequestHook, ResponseTransform};
pub use transport::Transport;
pub use types::{NewTodo, Post, Todo, TodoPatch};
