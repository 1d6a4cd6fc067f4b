//! Issues requests through a backend and classifies the result.
//!
//! # Design
//! `Transport` owns everything between a caller's `HttpRequest` and an
//! `Outcome`:
//! 1. merge default headers under the request's own headers,
//! 2. run request hooks in order,
//! 3. resolve an already-signalled cancel handle without touching the
//!    network,
//! 4. resolve the URL against the base URL and append query pairs,
//! 5. race the exchange against the cancel handle and the deadline
//!    (cancellation first, then timeout),
//! 6. classify status >= 400 as `HttpStatus`, otherwise decode the body and
//!    run response transforms.
//!
//! Every path ends in exactly one `Outcome`.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::backend::Backend;
use crate::cancel::CancelHandle;
use crate::config::ClientConfig;
use crate::error::{BackendError, Failure, NetworkError};
use crate::http::{merge_headers, Headers, HttpRequest, HttpResponse, PreparedRequest};
use crate::response::{decode_body, Outcome, RequestSummary, ResponseResult};
use crate::transform::{apply_transforms, RequestHook, ResponseTransform};

pub struct Transport<B> {
    backend: Arc<B>,
    config: ClientConfig,
    hooks: Vec<RequestHook>,
}

impl<B> Clone for Transport<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

impl<B: Backend> Transport<B> {
    pub fn new(backend: B, config: ClientConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            config,
            hooks: Vec::new(),
        }
    }

    /// Append a hook that runs on every request before dispatch.
    pub fn with_hook(mut self, hook: RequestHook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build a sub-client bound to `base_url`.
    ///
    /// The sub-client shares this transport's backend and hooks. Its default
    /// headers are this transport's defaults with `headers` layered on top.
    pub fn instance(&self, base_url: &str, headers: Headers) -> Self {
        let config = ClientConfig {
            base_url: Some(base_url.trim_end_matches('/').to_string()),
            default_headers: merge_headers(&self.config.default_headers, &headers),
            timeout: self.config.timeout,
        };
        Self {
            backend: Arc::clone(&self.backend),
            config,
            hooks: self.hooks.clone(),
        }
    }

    pub async fn send(&self, request: HttpRequest) -> Outcome {
        self.send_transformed(request, &[]).await
    }

    /// Send `request` and run `transforms` in order over the decoded body of
    /// a successful response.
    pub async fn send_transformed(&self, request: HttpRequest, transforms: &[ResponseTransform]) -> Outcome {
        let method = request.method;
        let url = request.url.clone();
        let outcome = self.dispatch(request, transforms).await;
        match &outcome {
            Ok(response) => debug!(%method, %url, status = response.status, "request completed"),
            Err(failure) => debug!(%method, %url, failure = failure.tag(), "request failed"),
        }
        outcome
    }

    /// Start both requests before awaiting either. Outcomes come back in
    /// call order, and one failing does not affect the other.
    pub async fn send_pair(&self, first: HttpRequest, second: HttpRequest) -> (Outcome, Outcome) {
        tokio::join!(self.send(first), self.send(second))
    }

    async fn dispatch(&self, mut request: HttpRequest, transforms: &[ResponseTransform]) -> Outcome {
        request.headers = merge_headers(&self.config.default_headers, &request.headers);
        // Hooks see the URL that will be dialled.
        request.url = resolve_url(self.config.base_url.as_deref(), &request.url);
        for hook in &self.hooks {
            request = hook(request);
        }

        let cancel = request.cancel.clone();
        if let Some(reason) = cancel.as_ref().and_then(CancelHandle::reason) {
            return Err(Failure::Cancelled(reason));
        }

        let timeout = request.timeout.or(self.config.timeout);
        let prepared = self.prepare(request)?;
        let summary = RequestSummary {
            method: prepared.method,
            url: prepared.url.clone(),
            headers: prepared.headers.clone(),
        };

        let exchange = self.backend.execute(prepared);
        let cancelled = async {
            match &cancel {
                Some(handle) => handle.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let deadline = async {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        let response = tokio::select! {
            biased;
            reason = cancelled => return Err(Failure::Cancelled(reason)),
            () = deadline => return Err(Failure::Timeout(timeout)),
            response = exchange => response,
        };
        let response = response.map_err(|err| match err {
            BackendError::Timeout => Failure::Timeout(timeout),
            other => Failure::Network(other.into()),
        })?;

        classify(response, summary, transforms)
    }

    fn prepare(&self, request: HttpRequest) -> Result<PreparedRequest, NetworkError> {
        let raw = resolve_url(self.config.base_url.as_deref(), &request.url);
        let mut url = Url::parse(&raw).map_err(|source| NetworkError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(PreparedRequest {
            method: request.method,
            url: url.into(),
            headers: request.headers,
            body: request.body,
        })
    }
}

/// Join a relative URL onto `base`. Absolute URLs pass through unchanged.
pub fn resolve_url(base: Option<&str>, url: &str) -> String {
    if url.contains("://") {
        return url.to_string();
    }
    match base {
        Some(base) if url.is_empty() => base.to_string(),
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/')),
        None => url.to_string(),
    }
}

fn classify(response: HttpResponse, request: RequestSummary, transforms: &[ResponseTransform]) -> Outcome {
    let body = decode_body(&response.body);
    if response.status >= 400 {
        return Err(Failure::HttpStatus {
            status: response.status,
            headers: response.headers,
            body,
        });
    }

    let body = apply_transforms(body, transforms)?;
    Ok(ResponseResult {
        status: response.status,
        headers: response.headers,
        body,
        request,
    })
}
