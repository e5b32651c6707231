use std::sync::Arc;

use agekeeper::AppState;
use agekeeper::api::create_router;
use agekeeper::api::middleware::REQUEST_ID_HEADER;
use agekeeper::error::{AppError, AppResult};
use agekeeper::models::{NewUser, User, UserChanges};
use agekeeper::repositories::{MemoryUserStore, UserStore};
use agekeeper::services::FixedClock;
use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use jiff::civil::{Date, date};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_on(today: Date) -> Router {
    let state = AppState::new(Arc::new(MemoryUserStore::new()), Arc::new(FixedClock(today)));
    create_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_alice(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({"name": "Alice", "dob": "2000-05-15"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn create_returns_user_without_age() {
    let app = app_on(date(2024, 5, 14));

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": "Alice", "dob": "2000-05-15"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1, "name": "Alice", "dob": "2000-05-15"}));
}

#[tokio::test]
async fn get_computes_age_from_clock() {
    let before_birthday = app_on(date(2024, 5, 14));
    let id = create_alice(&before_birthday).await;
    let (status, body) = send(&before_birthday, Method::GET, &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": id, "name": "Alice", "dob": "2000-05-15", "age": 23}));

    let after_birthday = app_on(date(2024, 5, 16));
    let id = create_alice(&after_birthday).await;
    let (_, body) = send(&after_birthday, Method::GET, &format!("/users/{}", id), None).await;
    assert_eq!(body["age"], 24);
}

#[tokio::test]
async fn short_name_is_rejected_with_details() {
    let app = app_on(date(2024, 5, 14));

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": "Al", "dob": "2000-05-15"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert!(body["details"].as_str().unwrap().contains("at least 3 characters"));
}

#[tokio::test]
async fn bad_dob_and_missing_fields_are_validation_errors() {
    let app = app_on(date(2024, 5, 14));

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": "Alice", "dob": "15/05/2000"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "dob: must be in YYYY-MM-DD format");

    let (status, body) = send(&app, Method::POST, "/users", Some(json!({"name": "Alice"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "dob: is required");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app_on(date(2024, 5, 14));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"error": "Invalid request body"}));
}

#[tokio::test]
async fn list_empty_store_returns_empty_array() {
    let app = app_on(date(2024, 5, 14));

    let (status, body) = send(&app, Method::GET, "/users", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_returns_users_in_id_order_with_age() {
    let app = app_on(date(2024, 5, 16));
    create_alice(&app).await;
    send(&app, Method::POST, "/users", Some(json!({"name": "Bob", "dob": "1990-01-01"}))).await;

    let (_, body) = send(&app, Method::GET, "/users", None).await;

    assert_eq!(
        body,
        json!([
            {"id": 1, "name": "Alice", "dob": "2000-05-15", "age": 24},
            {"id": 2, "name": "Bob", "dob": "1990-01-01", "age": 34}
        ])
    );
}

#[tokio::test]
async fn invalid_id_is_bad_request() {
    let app = app_on(date(2024, 5, 14));

    for (method, body) in [
        (Method::GET, None),
        (Method::PUT, Some(json!({"name": "Alice", "dob": "2000-05-15"}))),
        (Method::DELETE, None),
    ] {
        let (status, response) = send(&app, method, "/users/abc", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "Invalid User ID"}));
    }
}

#[tokio::test]
async fn get_missing_user_is_not_found() {
    let app = app_on(date(2024, 5, 14));

    let (status, body) = send(&app, Method::GET, "/users/42", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "User not found"}));
}

#[tokio::test]
async fn update_changes_fields_but_not_id() {
    let app = app_on(date(2024, 5, 16));
    let id = create_alice(&app).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{}", id),
        Some(json!({"name": "Alicia", "dob": "1999-05-15"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": id, "name": "Alicia", "dob": "1999-05-15", "age": 25}));

    let (_, fetched) = send(&app, Method::GET, &format!("/users/{}", id), None).await;
    assert_eq!(fetched["name"], "Alicia");
}

#[tokio::test]
async fn update_missing_user_is_not_found() {
    let app = app_on(date(2024, 5, 16));

    let (status, body) = send(
        &app,
        Method::PUT,
        "/users/7",
        Some(json!({"name": "Alicia", "dob": "1999-05-15"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "User not found"}));
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = app_on(date(2024, 5, 16));
    let id = create_alice(&app).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = app_on(date(2024, 5, 16));
    let request = Request::builder()
        .uri("/users")
        .header(REQUEST_ID_HEADER, "trace-me")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "trace-me");
}

#[tokio::test]
async fn trailing_slash_paths_reach_the_same_handlers() {
    let app = app_on(date(2024, 5, 14));

    let (status, body) = send(
        &app,
        Method::POST,
        "/users/",
        Some(json!({"name": "Alice", "dob": "2000-05-15"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, "/users/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send(&app, Method::GET, &format!("/users/{}/", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["age"], 23);

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{}/", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn unknown_path_is_json_not_found() {
    let app = app_on(date(2024, 5, 14));

    let (status, body) = send(&app, Method::GET, "/accounts/1", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Route not found"}));
}

#[tokio::test]
async fn null_name_is_a_validation_error() {
    let app = app_on(date(2024, 5, 14));

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"name": null, "dob": "2000-05-15"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Validation failed", "details": "name: must be at least 3 characters long"})
    );
}

#[tokio::test]
async fn malformed_update_body_is_bad_request() {
    let app = app_on(date(2024, 5, 14));
    let id = create_alice(&app).await;
    let request = Request::builder()
        .method(Method::PUT)
        .uri(format!("/users/{}", id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"error": "Invalid body"}));
}

/// Store whose every operation fails the same way.
enum BrokenStore {
    Database(&'static str),
    Timeout,
}

impl BrokenStore {
    fn fail<T>(&self, operation: &str) -> AppResult<T> {
        Err(match self {
            BrokenStore::Database(message) => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(*message),
            },
            BrokenStore::Timeout => AppError::timeout(operation),
        })
    }
}

#[async_trait]
impl UserStore for BrokenStore {
    async fn create(&self, _new_user: NewUser) -> AppResult<User> {
        self.fail("create user")
    }

    async fn get(&self, _id: i32) -> AppResult<Option<User>> {
        self.fail("get user")
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        self.fail("list users")
    }

    async fn update(&self, _id: i32, _changes: UserChanges) -> AppResult<Option<User>> {
        self.fail("update user")
    }

    async fn delete(&self, _id: i32) -> AppResult<()> {
        self.fail("delete user")
    }
}

fn broken_app(store: BrokenStore) -> Router {
    let state = AppState::new(Arc::new(store), Arc::new(FixedClock(date(2024, 5, 14))));
    create_router(state)
}

fn every_route() -> Vec<(Method, &'static str, Option<Value>)> {
    let payload = json!({"name": "Alice", "dob": "2000-05-15"});
    vec![
        (Method::POST, "/users", Some(payload.clone())),
        (Method::GET, "/users", None),
        (Method::GET, "/users/1", None),
        (Method::PUT, "/users/1", Some(payload)),
        (Method::DELETE, "/users/1", None),
    ]
}

#[tokio::test]
async fn store_failures_surface_message_with_500() {
    let app = broken_app(BrokenStore::Database("conn reset"));

    for (method, uri, body) in every_route() {
        let (status, response) = send(&app, method.clone(), uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, uri);
        assert_eq!(response, json!({"error": "conn reset"}), "{} {}", method, uri);
    }
}

#[tokio::test]
async fn store_timeouts_are_500_not_404() {
    let app = broken_app(BrokenStore::Timeout);

    let (status, body) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Operation timed out: list users"}));

    for (method, uri, body) in every_route() {
        let (status, _) = send(&app, method.clone(), uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{} {}", method, uri);
    }
}
