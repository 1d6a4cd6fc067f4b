//! Request templates for the placeholder REST API.
//!
//! Every function returns an `HttpRequest` with a path relative to the
//! transport's base URL and performs no I/O.

use crate::http::HttpRequest;
use crate::types::{NewTodo, TodoPatch};

pub const TODOS: &str = "/todos";
pub const POSTS: &str = "/posts";

/// A path the API does not serve.
pub const INVALID_PATH: &str = "/SOME_INVALID_URL";

/// Query parameter the API uses to cap list lengths.
pub const LIMIT_PARAM: &str = "_limit";

pub fn list_todos(limit: Option<u32>) -> HttpRequest {
    with_limit(HttpRequest::get(TODOS), limit)
}

pub fn list_posts(limit: Option<u32>) -> HttpRequest {
    with_limit(HttpRequest::get(POSTS), limit)
}

pub fn get_todo(id: u64) -> HttpRequest {
    HttpRequest::get(format!("{TODOS}/{id}"))
}

pub fn create_todo(input: &NewTodo) -> Result<HttpRequest, serde_json::Error> {
    HttpRequest::post(TODOS).json(input)
}

/// Partial update: only the fields set in `patch` change.
pub fn update_todo(id: u64, patch: &TodoPatch) -> Result<HttpRequest, serde_json::Error> {
    HttpRequest::patch(format!("{TODOS}/{id}")).json(patch)
}

/// Full replacement of a todo.
pub fn replace_todo(id: u64, input: &NewTodo) -> Result<HttpRequest, serde_json::Error> {
    HttpRequest::put(format!("{TODOS}/{id}")).json(input)
}

pub fn delete_todo(id: u64) -> HttpRequest {
    HttpRequest::delete(format!("{TODOS}/{id}"))
}

fn with_limit(request: HttpRequest, limit: Option<u32>) -> HttpRequest {
    match limit {
        Some(limit) => request.query(LIMIT_PARAM, limit),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[test]
    fn list_todos_with_limit() {
        let req = list_todos(Some(5));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "/todos");
        assert_eq!(req.query, vec![("_limit".to_string(), "5".to_string())]);
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn list_posts_without_limit_has_no_query() {
        let req = list_posts(None);
        assert_eq!(req.url, "/posts");
        assert!(req.query.is_empty());
    }

    #[test]
    fn get_todo_builds_item_path() {
        assert_eq!(get_todo(1).url, "/todos/1");
    }

    #[test]
    fn create_todo_produces_json_post() {
        let input = NewTodo {
            title: "new todo".to_string(),
            completed: false,
        };
        let req = create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "/todos");
        assert_eq!(
            req.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "new todo");
        assert_eq!(body["completed"], false);
    }

    #[test]
    fn update_todo_is_a_patch_with_only_set_fields() {
        let patch = TodoPatch {
            title: None,
            completed: Some(true),
        };
        let req = update_todo(1, &patch).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "/todos/1");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert!(body.get("title").is_none());
        assert_eq!(body["completed"], true);
    }

    #[test]
    fn replace_todo_is_a_put() {
        let input = NewTodo {
            title: "whole".to_string(),
            completed: true,
        };
        let req = replace_todo(3, &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "/todos/3");
    }

    #[test]
    fn delete_todo_has_no_body() {
        let req = delete_todo(1);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "/todos/1");
        assert!(req.body.is_none());
    }
}
