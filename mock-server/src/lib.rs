//! In-process stand-in for the public placeholder REST API.
//!
//! Serves seeded `/todos` and `/posts`, honors `_limit` on lists and
//! `_delay=<ms>` on every route, and echoes request headers on `/headers`.
//! Unknown routes and ids answer 404 with `{}`.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const SEEDED_TODOS: u64 = 20;
pub const SEEDED_POSTS: u64 = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub user_id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
struct ListParams {
    #[serde(rename = "_limit")]
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct DelayParams {
    #[serde(rename = "_delay")]
    delay: Option<u64>,
}

#[derive(Debug)]
pub struct Store {
    todos: BTreeMap<u64, Todo>,
    posts: BTreeMap<u64, Post>,
    next_todo_id: u64,
}

impl Store {
    pub fn seeded() -> Self {
        let todos = (1..=SEEDED_TODOS)
            .map(|id| {
                let todo = Todo {
                    user_id: (id - 1) / 10 + 1,
                    id,
                    title: format!("todo {id}"),
                    completed: id % 3 == 0,
                };
                (id, todo)
            })
            .collect();
        let posts = (1..=SEEDED_POSTS)
            .map(|id| {
                let post = Post {
                    user_id: (id - 1) / 10 + 1,
                    id,
                    title: format!("post {id}"),
                    body: format!("body of post {id}"),
                };
                (id, post)
            })
            .collect();
        Self {
            todos,
            posts,
            next_todo_id: SEEDED_TODOS + 1,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(replace_todo)
                .patch(update_todo)
                .delete(delete_todo),
        )
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
        .route("/headers", get(echo_headers))
        .fallback(fallback)
        .layer(middleware::from_fn(artificial_latency))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({})))
}

async fn fallback() -> (StatusCode, Json<Value>) {
    not_found()
}

async fn artificial_latency(Query(params): Query<DelayParams>, request: Request, next: Next) -> Response {
    if let Some(ms) = params.delay {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
    next.run(request).await
}

fn limited<T>(items: impl Iterator<Item = T>, limit: Option<usize>) -> Vec<T> {
    items.take(limit.unwrap_or(usize::MAX)).collect()
}

async fn list_todos(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Todo>> {
    let store = db.read().await;
    Json(limited(store.todos.values().cloned(), params.limit))
}

async fn list_posts(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Post>> {
    let store = db.read().await;
    Json(limited(store.posts.values().cloned(), params.limit))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<Todo>> {
    let store = db.read().await;
    store.todos.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn get_post(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<Post>> {
    let store = db.read().await;
    store.posts.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn create_todo(State(db): State<Db>, Json(input): Json<NewTodo>) -> (StatusCode, Json<Todo>) {
    let mut store = db.write().await;
    let id = store.next_todo_id;
    store.next_todo_id += 1;
    let todo = Todo {
        user_id: input.user_id.unwrap_or(1),
        id,
        title: input.title,
        completed: input.completed,
    };
    store.todos.insert(id, todo.clone());
    debug!(id, "created todo");
    (StatusCode::CREATED, Json(todo))
}

async fn replace_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<NewTodo>,
) -> ApiResult<Json<Todo>> {
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or_else(not_found)?;
    if let Some(user_id) = input.user_id {
        todo.user_id = user_id;
    }
    todo.title = input.title;
    todo.completed = input.completed;
    Ok(Json(todo.clone()))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<TodoPatch>,
) -> ApiResult<Json<Todo>> {
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or_else(not_found)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let mut store = db.write().await;
    store
        .todos
        .remove(&id)
        .map(|_| Json(json!({})))
        .ok_or_else(not_found)
}

async fn echo_headers(headers: HeaderMap) -> Json<Map<String, Value>> {
    let echoed = headers
        .iter()
        .map(|(name, value)| {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            (name.as_str().to_string(), Value::String(value))
        })
        .collect();
    Json(echoed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_with_camel_case_keys() {
        let todo = Todo {
            user_id: 1,
            id: 1,
            title: "Test".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["title"], "Test");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn seeded_store_has_fixed_contents() {
        let store = Store::seeded();
        assert_eq!(store.todos.len() as u64, SEEDED_TODOS);
        assert_eq!(store.posts.len() as u64, SEEDED_POSTS);
        assert_eq!(store.todos[&11].user_id, 2);
        assert!(store.todos[&3].completed);
        assert!(!store.todos[&1].completed);
    }

    #[test]
    fn new_todo_defaults_completed_to_false() {
        let input: NewTodo = serde_json::from_str(r#"{"title":"No completed field"}"#).unwrap();
        assert_eq!(input.title, "No completed field");
        assert!(!input.completed);
        assert!(input.user_id.is_none());
    }

    #[test]
    fn new_todo_rejects_missing_title() {
        let result: Result<NewTodo, _> = serde_json::from_str(r#"{"completed":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn patch_fields_are_optional() {
        let input: TodoPatch = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.title.is_none());
        assert!(input.completed.is_none());
    }

    #[test]
    fn limit_caps_list_length() {
        assert_eq!(limited(1..=10, Some(2)), vec![1, 2]);
        assert_eq!(limited(1..=3, None), vec![1, 2, 3]);
    }
}
