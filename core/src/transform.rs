//! Pipeline hooks: request hooks run before dispatch, response transforms
//! run on decoded bodies of successful responses.
//!
//! Both are ordered lists of plain functions. Nothing is registered
//! globally; a `Transport` owns its hooks and a caller passes transforms per
//! request.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::info;

use crate::error::{NetworkError, TransformError};
use crate::http::HttpRequest;

pub type RequestHook = Arc<dyn Fn(HttpRequest) -> HttpRequest + Send + Sync>;

pub type ResponseTransform = Arc<dyn Fn(Value) -> Result<Value, TransformError> + Send + Sync>;

pub fn request_hook<F>(hook: F) -> RequestHook
where
    F: Fn(HttpRequest) -> HttpRequest + Send + Sync + 'static,
{
    Arc::new(hook)
}

pub fn response_transform<F>(transform: F) -> ResponseTransform
where
    F: Fn(Value) -> Result<Value, TransformError> + Send + Sync + 'static,
{
    Arc::new(transform)
}

/// Log every outgoing request with its method, URL and send time.
pub fn log_request() -> RequestHook {
    request_hook(|request| {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        info!("{} request sent to: {} at: {millis}", request.method, request.url);
        request
    })
}

/// Upper-case the `title` field of an object body.
pub fn uppercase_title() -> ResponseTransform {
    response_transform(|mut body| {
        let title = body
            .get_mut("title")
            .ok_or_else(|| TransformError::new("body has no title"))?;
        let upper = title
            .as_str()
            .ok_or_else(|| TransformError::new("title is not a string"))?
            .to_uppercase();
        *title = Value::String(upper);
        Ok(body)
    })
}

/// Apply `transforms` in order. The first failure stops the chain.
pub fn apply_transforms(mut body: Value, transforms: &[ResponseTransform]) -> Result<Value, NetworkError> {
    for (index, transform) in transforms.iter().enumerate() {
        body = transform(body).map_err(|source| NetworkError::Transform { index, source })?;
    }
    Ok(body)
}
