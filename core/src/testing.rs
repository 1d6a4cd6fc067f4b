//! In-memory backend for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use crate::backend::Backend;
use crate::error::BackendError;
use crate::http::{HttpMethod, HttpResponse, PreparedRequest};

struct Route {
    fragment: &'static str,
    status: u16,
    body: String,
    delay: Duration,
}

/// Answers from a fixed route table and records every request it sees.
///
/// Unmatched requests are echoed the way a permissive REST API would: writes
/// return the request body, reads return `[]`, deletes return `{}`.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    routes: Vec<Route>,
    seen: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(self, fragment: &'static str, status: u16, body: &str) -> Self {
        self.slow_route(fragment, status, body, Duration::ZERO)
    }

    pub(crate) fn slow_route(
        mut self,
        fragment: &'static str,
        status: u16,
        body: &str,
        delay: Duration,
    ) -> Self {
        self.routes.push(Route {
            fragment,
            status,
            body: body.to_string(),
            delay,
        });
        self
    }

    pub(crate) fn seen(&self) -> Vec<PreparedRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Backend for ScriptedBackend {
    async fn execute(&self, request: PreparedRequest) -> Result<HttpResponse, BackendError> {
        self.seen.lock().unwrap().push(request.clone());

        let route = self
            .routes
            .iter()
            .find(|route| request.url.contains(route.fragment));
        let (status, body, delay) = match route {
            Some(route) => (route.status, route.body.clone(), route.delay),
            None => match request.method {
                HttpMethod::Post => (201, request.body.clone().unwrap_or_default(), Duration::ZERO),
                HttpMethod::Put | HttpMethod::Patch => {
                    (200, request.body.clone().unwrap_or_default(), Duration::ZERO)
                }
                HttpMethod::Delete => (200, "{}".to_string(), Duration::ZERO),
                HttpMethod::Get => (200, "[]".to_string(), Duration::ZERO),
            },
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        })
    }
}
