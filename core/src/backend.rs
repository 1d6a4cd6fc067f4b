//! Pluggable backends that perform the raw HTTP exchange.

use std::future::Future;
use std::time::Duration;

use crate::error::BackendError;
use crate::http::{HttpResponse, PreparedRequest};

/// Upper bound on any single exchange, independent of per-request timeouts.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Performs one HTTP exchange. Status codes are data, never errors.
pub trait Backend: Send + Sync {
    fn execute(
        &self,
        request: PreparedRequest,
    ) -> impl Future<Output = Result<HttpResponse, BackendError>> + Send;
}

/// A [`Backend`] backed by a blocking [`ureq`] agent.
///
/// Each exchange runs on tokio's blocking pool. When the transport stops
/// waiting (timeout or cancellation) the blocking call is left to finish on
/// its own and its result is dropped.
#[derive(Debug, Clone)]
pub struct UreqBackend {
    agent: ureq::Agent,
}

impl Default for UreqBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_TIMEOUT)
    }
}

impl UreqBackend {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            // Status codes are classified by the transport.
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Backend for UreqBackend {
    async fn execute(&self, request: PreparedRequest) -> Result<HttpResponse, BackendError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || run_blocking(&agent, request))
            .await
            .map_err(|e| BackendError::Other(Box::new(e)))?
    }
}

fn run_blocking(agent: &ureq::Agent, request: PreparedRequest) -> Result<HttpResponse, BackendError> {
    let mut builder = ureq::http::Request::builder()
        .method(request.method.as_str())
        .uri(&request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let result = match request.body {
        Some(body) => {
            let req = builder
                .body(body.into_bytes())
                .map_err(|e| BackendError::Other(Box::new(e)))?;
            agent.run(req)
        }
        None => {
            let req = builder.body(()).map_err(|e| BackendError::Other(Box::new(e)))?;
            agent.run(req)
        }
    };

    match result {
        Ok(response) => convert_response(response),
        Err(ureq::Error::Timeout(_)) => Err(BackendError::Timeout),
        Err(ureq::Error::HostNotFound) => Err(BackendError::Connection("host not found".to_owned())),
        Err(ureq::Error::Io(e)) => Err(BackendError::Connection(e.to_string())),
        Err(e) => Err(BackendError::Other(Box::new(e))),
    }
}

fn convert_response(response: ureq::http::Response<ureq::Body>) -> Result<HttpResponse, BackendError> {
    let (parts, mut body) = response.into_parts();
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    // Bytes that are not UTF-8 are replaced, never treated as a failed exchange.
    let bytes = body
        .read_to_vec()
        .map_err(|e| BackendError::Connection(e.to_string()))?;
    let body = String::from_utf8_lossy(&bytes).into_owned();

    Ok(HttpResponse {
        status: parts.status.as_u16(),
        headers,
        body,
    })
}
