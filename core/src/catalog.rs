//! Named demonstration operations.
//!
//! # Design
//! Each operation is a fixed request template sent through one `Transport`.
//! Payloads, ids and limits are constants. `Catalog::run` returns one
//! outcome per issued request, in call order, so a caller can report them
//! uniformly.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use crate::api;
use crate::backend::Backend;
use crate::cancel::CancelHandle;
use crate::config::HarnessConfig;
use crate::error::{Failure, NetworkError};
use crate::http::{HttpMethod, HttpRequest};
use crate::response::Outcome;
use crate::transform::{log_request, uppercase_title};
use crate::transport::Transport;
use crate::types::{NewTodo, TodoPatch};

pub const LIST_LIMIT: u32 = 5;
pub const PARALLEL_LIMIT: u32 = 2;
pub const DEMO_TODO_ID: u64 = 1;
pub const CANCEL_REASON: &str = "Request cancelled";
pub const DEMO_TIMEOUT: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetTodos,
    GetTodosShort,
    AddTodo,
    UpdateTodo,
    RemoveTodo,
    GetData,
    CustomHeaders,
    TransformResponse,
    ErrorHandling,
    CancelToken,
    UsingInstance,
    Timeout,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Operation::GetTodos,
        Operation::GetTodosShort,
        Operation::AddTodo,
        Operation::UpdateTodo,
        Operation::RemoveTodo,
        Operation::GetData,
        Operation::CustomHeaders,
        Operation::TransformResponse,
        Operation::ErrorHandling,
        Operation::CancelToken,
        Operation::UsingInstance,
        Operation::Timeout,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::GetTodos => "get-todos",
            Operation::GetTodosShort => "get-todos-short",
            Operation::AddTodo => "add-todo",
            Operation::UpdateTodo => "update-todo",
            Operation::RemoveTodo => "remove-todo",
            Operation::GetData => "get-data",
            Operation::CustomHeaders => "custom-headers",
            Operation::TransformResponse => "transform-response",
            Operation::ErrorHandling => "error-handling",
            Operation::CancelToken => "cancel-token",
            Operation::UsingInstance => "using-instance",
            Operation::Timeout => "timeout",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Operation::GetTodos => "GET a limited list of todos from an explicit request",
            Operation::GetTodosShort => "GET a limited list of todos with the shorthand builder",
            Operation::AddTodo => "POST a new todo",
            Operation::UpdateTodo => "PATCH an existing todo",
            Operation::RemoveTodo => "DELETE a todo",
            Operation::GetData => "GET todos and posts in parallel",
            Operation::CustomHeaders => "POST with custom headers",
            Operation::TransformResponse => "POST and upper-case the returned title",
            Operation::ErrorHandling => "GET a path that does not exist",
            Operation::CancelToken => "GET with a request cancelled before it is sent",
            Operation::UsingInstance => "GET through a client bound to a base URL",
            Operation::Timeout => "GET with a 5ms timeout",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown operation {0:?}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

pub struct Catalog<B> {
    transport: Transport<B>,
}

impl<B: Backend> Catalog<B> {
    pub fn new(transport: Transport<B>) -> Self {
        Self { transport }
    }

    /// Catalog over `backend` with the configured base URL, auth header and
    /// default timeout. Every request is logged as it is sent.
    pub fn from_config(backend: B, config: &HarnessConfig) -> Self {
        let transport = Transport::new(backend, config.client_config()).with_hook(log_request());
        Self::new(transport)
    }

    pub fn transport(&self) -> &Transport<B> {
        &self.transport
    }

    pub async fn run(&self, operation: Operation) -> Vec<Outcome> {
        let outcome = match operation {
            Operation::GetTodos => self.get_todos().await,
            Operation::GetTodosShort => self.get_todos_short().await,
            Operation::AddTodo => self.add_todo().await,
            Operation::UpdateTodo => self.update_todo().await,
            Operation::RemoveTodo => self.remove_todo().await,
            Operation::GetData => {
                let (todos, posts) = self.get_data().await;
                return vec![todos, posts];
            }
            Operation::CustomHeaders => self.custom_headers().await,
            Operation::TransformResponse => self.transform_response().await,
            Operation::ErrorHandling => self.error_handling().await,
            Operation::CancelToken => self.cancel_token().await,
            Operation::UsingInstance => self.using_instance().await,
            Operation::Timeout => self.timeout().await,
        };
        vec![outcome]
    }

    pub async fn get_todos(&self) -> Outcome {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: api::TODOS.to_string(),
            query: vec![(api::LIMIT_PARAM.to_string(), LIST_LIMIT.to_string())],
            ..HttpRequest::default()
        };
        self.transport.send(request).await
    }

    pub async fn get_todos_short(&self) -> Outcome {
        self.transport.send(api::list_todos(Some(LIST_LIMIT))).await
    }

    pub async fn add_todo(&self) -> Outcome {
        let todo = NewTodo {
            title: "new todo".to_string(),
            completed: false,
        };
        self.send_built(api::create_todo(&todo)).await
    }

    pub async fn update_todo(&self) -> Outcome {
        let patch = TodoPatch {
            title: Some("updated todo".to_string()),
            completed: Some(true),
        };
        self.send_built(api::update_todo(DEMO_TODO_ID, &patch)).await
    }

    pub async fn remove_todo(&self) -> Outcome {
        self.transport.send(api::delete_todo(DEMO_TODO_ID)).await
    }

    /// Todos and posts, fetched concurrently, in that order.
    pub async fn get_data(&self) -> (Outcome, Outcome) {
        self.transport
            .send_pair(
                api::list_todos(Some(PARALLEL_LIMIT)),
                api::list_posts(Some(PARALLEL_LIMIT)),
            )
            .await
    }

    pub async fn custom_headers(&self) -> Outcome {
        let todo = NewTodo {
            title: "new todo".to_string(),
            completed: false,
        };
        let request = HttpRequest::post(api::TODOS)
            .header("Content-Type", "application/json")
            .header("Authorization", "someToken")
            .json(&todo);
        self.send_built(request).await
    }

    pub async fn transform_response(&self) -> Outcome {
        match HttpRequest::post(api::TODOS).json(&json!({"title": "using transform response"})) {
            Ok(request) => {
                self.transport
                    .send_transformed(request, &[uppercase_title()])
                    .await
            }
            Err(err) => Err(NetworkError::from(err).into()),
        }
    }

    pub async fn error_handling(&self) -> Outcome {
        self.transport.send(HttpRequest::get(api::INVALID_PATH)).await
    }

    /// The handle is signalled before the request is handed over, so the
    /// outcome is always a cancellation.
    pub async fn cancel_token(&self) -> Outcome {
        let handle = CancelHandle::new();
        handle.signal(CANCEL_REASON);
        self.transport
            .send(api::list_posts(None).cancel_with(&handle))
            .await
    }

    /// GET `/todos` through a sub-client bound to the catalog's base URL.
    pub async fn using_instance(&self) -> Outcome {
        let base_url = self.transport.config().base_url.as_deref().unwrap_or_default();
        let instance = self.transport.instance(base_url, Vec::new());
        instance.send(HttpRequest::get(api::TODOS)).await
    }

    pub async fn timeout(&self) -> Outcome {
        self.transport
            .send(api::list_todos(Some(LIST_LIMIT)).timeout(DEMO_TIMEOUT))
            .await
    }

    async fn send_built(&self, request: Result<HttpRequest, serde_json::Error>) -> Outcome {
        match request {
            Ok(request) => self.transport.send(request).await,
            Err(err) => Err(Failure::Network(err.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::find_header;
    use crate::testing::ScriptedBackend;

    fn catalog(backend: ScriptedBackend) -> Catalog<ScriptedBackend> {
        let config = ClientConfig::new()
            .with_base_url("http://api.test")
            .with_header("X-Auth-Token", "token");
        Catalog::new(Transport::new(backend, config))
    }

    fn sent_body(catalog: &Catalog<ScriptedBackend>) -> Value {
        let seen = catalog.transport().backend().seen();
        serde_json::from_str(seen[0].body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "fly".parse::<Operation>().unwrap_err(),
            UnknownOperation("fly".to_string())
        );
    }

    #[tokio::test]
    async fn both_list_variants_send_the_same_request() {
        let explicit = catalog(ScriptedBackend::new());
        let short = catalog(ScriptedBackend::new());
        explicit.run(Operation::GetTodos).await;
        short.run(Operation::GetTodosShort).await;

        let explicit = explicit.transport().backend().seen();
        let short = short.transport().backend().seen();
        assert_eq!(explicit, short);
        assert_eq!(explicit[0].url, "http://api.test/todos?_limit=5");
    }

    #[tokio::test]
    async fn add_todo_posts_fixed_payload() {
        let c = catalog(ScriptedBackend::new());
        let response = c.add_todo().await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(sent_body(&c), json!({"title": "new todo", "completed": false}));
    }

    #[tokio::test]
    async fn update_todo_patches_item_one() {
        let c = catalog(ScriptedBackend::new());
        c.update_todo().await.unwrap();
        let seen = c.transport().backend().seen();
        assert_eq!(seen[0].method, HttpMethod::Patch);
        assert_eq!(seen[0].url, "http://api.test/todos/1");
        assert_eq!(sent_body(&c), json!({"title": "updated todo", "completed": true}));
    }

    #[tokio::test]
    async fn remove_todo_deletes_item_one() {
        let c = catalog(ScriptedBackend::new());
        c.remove_todo().await.unwrap();
        let seen = c.transport().backend().seen();
        assert_eq!(seen[0].method, HttpMethod::Delete);
        assert_eq!(seen[0].url, "http://api.test/todos/1");
    }

    #[tokio::test]
    async fn get_data_yields_two_outcomes_in_call_order() {
        let c = catalog(
            ScriptedBackend::new()
                .route("/todos", 200, r#"[{"kind":"todo"}]"#)
                .route("/posts", 200, r#"[{"kind":"post"}]"#),
        );
        let outcomes = c.run(Operation::GetData).await;
        assert_eq!(outcomes.len(), 2);
        let bodies: Vec<Value> = outcomes.into_iter().map(|o| o.unwrap().body).collect();
        assert_eq!(bodies, vec![json!([{"kind": "todo"}]), json!([{"kind": "post"}])]);
    }

    #[tokio::test]
    async fn custom_headers_are_sent_alongside_defaults() {
        let c = catalog(ScriptedBackend::new());
        c.custom_headers().await.unwrap();
        let headers = &c.transport().backend().seen()[0].headers;
        assert_eq!(find_header(headers, "authorization"), Some("someToken"));
        assert_eq!(find_header(headers, "content-type"), Some("application/json"));
        assert_eq!(find_header(headers, "x-auth-token"), Some("token"));
    }

    #[tokio::test]
    async fn transform_response_upper_cases_title() {
        let c = catalog(ScriptedBackend::new());
        let response = c.transform_response().await.unwrap();
        assert_eq!(response.body["title"], "USING TRANSFORM RESPONSE");
    }

    #[tokio::test]
    async fn error_handling_surfaces_status_failure() {
        let c = catalog(ScriptedBackend::new().route(api::INVALID_PATH, 404, "{}"));
        let failure = c.error_handling().await.unwrap_err();
        assert_eq!(failure.status(), Some(404));
    }

    #[tokio::test]
    async fn cancel_token_is_always_cancelled() {
        let c = catalog(ScriptedBackend::new());
        let failure = c.cancel_token().await.unwrap_err();
        assert!(matches!(&failure, Failure::Cancelled(reason) if reason == CANCEL_REASON));
        assert!(c.transport().backend().seen().is_empty());
    }

    #[tokio::test]
    async fn using_instance_requests_through_base_url() {
        let c = catalog(ScriptedBackend::new());
        c.using_instance().await.unwrap();
        assert_eq!(c.transport().backend().seen()[0].url, "http://api.test/todos");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_trips_on_slow_api() {
        let c = catalog(ScriptedBackend::new().slow_route(
            "/todos",
            200,
            "[]",
            Duration::from_millis(50),
        ));
        let failure = c.timeout().await.unwrap_err();
        assert!(matches!(failure, Failure::Timeout(Some(d)) if d == DEMO_TIMEOUT));
    }

    #[tokio::test]
    async fn run_returns_one_outcome_for_single_request_operations() {
        let c = catalog(ScriptedBackend::new().route(api::INVALID_PATH, 404, "{}"));
        for op in Operation::ALL {
            let expected = if op == Operation::GetData { 2 } else { 1 };
            assert_eq!(c.run(op).await.len(), expected, "{op}");
        }
    }
}
