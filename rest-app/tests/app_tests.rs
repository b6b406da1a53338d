//! End-to-end dispatch tests for the demo application

use proptest::prelude::*;
use rest_app::create_app;
use rest_app::rest::{HttpMethod, HttpRequest, RestApp, USER_HEADER};
use serde_json::json;

fn app() -> RestApp {
    create_app().expect("demo endpoints are well formed")
}

// =============================================================================
// Routes
// =============================================================================

#[test]
fn test_mounted_routes() {
    let app = app();
    let mut routes: Vec<String> = app.routes().map(|e| e.definition.to_string()).collect();
    routes.sort();

    assert_eq!(
        routes,
        vec![
            "GET /health",
            "GET /interface/echo",
            "GET /users",
            "GET /users/me",
            "GET /users/{id:[0-9]+}",
            "POST /users",
        ]
    );
}

#[test]
fn test_echo() {
    let response = app().handle(HttpRequest::get("/api/interface/echo?name=world"));

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!("world"));
}

#[test]
fn test_echo_decodes_query() {
    let response = app().handle(HttpRequest::get("/api/interface/echo?name=hello%20world"));
    assert_eq!(response.body, json!("hello world"));
}

#[test]
fn test_unknown_route() {
    let app = app();

    assert_eq!(app.handle(HttpRequest::get("/api/nothing")).status, 404);
    assert_eq!(app.handle(HttpRequest::get("/interface/echo")).status, 404);
    assert_eq!(
        app.handle(HttpRequest::new(HttpMethod::Delete, "/api/health")).status,
        404
    );
}

#[test]
fn test_health() {
    let response = app().handle(HttpRequest::get("/api/health"));

    assert!(response.is_success());
    assert_eq!(response.body["status"], "ok");
}

// =============================================================================
// Users
// =============================================================================

#[test]
fn test_get_user_by_regex_path() {
    let app = app();

    let response = app.handle(HttpRequest::get("/api/users/2"));
    assert_eq!(response.status, 200);
    assert_eq!(response.body["name"], "Bob");

    let response = app.handle(HttpRequest::get("/api/users/99"));
    assert_eq!(response.status, 404);
    assert_eq!(response.body["code"], "NOT_FOUND");
}

#[test]
fn test_non_numeric_id_does_not_match() {
    let response = app().handle(HttpRequest::get("/api/users/abc"));
    assert_eq!(response.status, 404);
}

#[test]
fn test_list_users_with_bean_filter_and_default_limit() {
    let app = app();

    let response = app.handle(HttpRequest::get("/api/users"));
    assert_eq!(response.body.as_array().map(Vec::len), Some(2));

    let response = app.handle(HttpRequest::get("/api/users?q=ali"));
    assert_eq!(response.body, json!([{ "id": 1, "name": "Alice", "email": "alice@example.com" }]));

    let response = app.handle(HttpRequest::get("/api/users?limit=1"));
    assert_eq!(response.body.as_array().map(Vec::len), Some(1));
}

#[test]
fn test_invalid_limit_is_client_error() {
    let response = app().handle(HttpRequest::get("/api/users?limit=many"));

    assert_eq!(response.status, 400);
    assert_eq!(response.body["code"], "INVALID_ARGUMENT");
    assert_eq!(response.body["route"], "/users");
    assert_eq!(response.body["method"], "list");
}

#[test]
fn test_create_user_from_json_body() {
    let app = app();
    let request = HttpRequest::post("/api/users")
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"name":"Carol","email":"carol@example.com"}"#);

    let response = app.handle(request);

    assert_eq!(response.status, 200);
    assert_eq!(response.body["id"], 3);
    assert_eq!(app.context().db.count_users(), 3);
}

#[test]
fn test_create_user_with_malformed_body() {
    let response = app().handle(HttpRequest::post("/api/users").with_body("{not json"));

    assert_eq!(response.status, 400);
    assert_eq!(response.body["code"], "INVALID_ARGUMENT");
}

#[test]
fn test_create_user_without_body() {
    let response = app().handle(HttpRequest::post("/api/users"));

    assert_eq!(response.status, 400);
    assert_eq!(response.body["code"], "BAD_REQUEST");
}

#[test]
fn test_current_user_from_context() {
    let app = app();

    let response = app.handle(HttpRequest::get("/api/users/me").with_header(USER_HEADER, "ann"));
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({ "name": "ann" }));

    let response = app.handle(HttpRequest::get("/api/users/me"));
    assert_eq!(response.status, 401);
}

proptest! {
    /// Property: echo returns any plain query value unchanged
    #[test]
    fn prop_echo_returns_name(name in "[a-zA-Z0-9]{1,20}") {
        let response = app().handle(HttpRequest::get(format!("/api/interface/echo?name={}", name)));
        prop_assert_eq!(response.status, 200);
        prop_assert_eq!(response.body, json!(name));
    }
}
