//! Tests for users API handlers.

use super::*;
use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::Value;

use crate::domain::ports::{MockUserRepository, UserRepository};
use crate::inbound::http::routes::configure;
use crate::inbound::http::state::AppInfo;
use crate::outbound::memory::InMemoryUserRepository;

fn state_with(users: Arc<dyn UserRepository>) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(users, AppInfo::new("user-service", "1.0.0")))
}

async fn app_with(
    users: Arc<dyn UserRepository>,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    actix_test::init_service(App::new().app_data(state_with(users)).configure(configure)).await
}

async fn app() -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    app_with(Arc::new(InMemoryUserRepository::new())).await
}

async fn send<S>(app: &S, request: actix_test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("envelope JSON")
    };
    (status, body)
}

fn create_request(username: &str, email: &str, password: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({ "username": username, "email": email, "password": password }))
}

async fn create<S>(app: &S, username: &str, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(app, create_request(username, email, "secret1")).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["data"]["id"]
        .as_str()
        .expect("id in response")
        .to_owned()
}

#[actix_web::test]
async fn create_returns_user_without_password() {
    let app = app().await;
    let (status, body) = send(&app, create_request("ada", "ada@example.com", "secret1")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 201);
    assert_eq!(body["message"], "User created successfully");
    let data = body["data"].as_object().expect("user payload");
    assert_eq!(data["username"], "ada");
    assert_eq!(data["email"], "ada@example.com");
    assert!(!data.contains_key("password"));
    assert_eq!(data["created_at"], data["updated_at"]);
    assert!(!data["id"].as_str().unwrap_or_default().is_empty());
}

#[rstest]
#[case(json!({"email": "a@b.co", "password": "secret1"}), "username", "missing_field")]
#[case(json!({"username": "ab", "email": "a@b.co", "password": "secret1"}), "username", "username_too_short")]
#[case(json!({"username": "x".repeat(51), "email": "a@b.co", "password": "secret1"}), "username", "username_too_long")]
#[case(json!({"username": "ada", "email": "not-an-email", "password": "secret1"}), "email", "invalid_email")]
#[case(json!({"username": "ada", "email": "a@b.co", "password": "12345"}), "password", "password_too_short")]
#[actix_web::test]
async fn create_rejects_invalid_fields(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = app().await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(payload);
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        format!("Validation error on field '{field}'")
    );
    assert_eq!(body["data"]["field"], field);
    assert_eq!(body["data"]["code"], code);
}

#[actix_web::test]
async fn create_rejects_malformed_json() {
    let app = app().await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|m| m.starts_with("Invalid request body: ")),
        "unexpected message: {body}"
    );
}

#[rstest]
#[case("ada", "other@example.com", "Username already taken")]
#[case("bob", "ada@example.com", "Email already in use")]
#[actix_web::test]
async fn create_rejects_duplicates(
    #[case] username: &str,
    #[case] email: &str,
    #[case] message: &str,
) {
    let app = app().await;
    create(&app, "ada", "ada@example.com").await;

    let (status, body) = send(&app, create_request(username, email, "secret1")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], message);

    let (_, list) = send(&app, actix_test::TestRequest::get().uri("/api/v1/users")).await;
    assert_eq!(list["data"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn get_unknown_user_reports_id() {
    let app = app().await;
    let (status, body) = send(&app, actix_test::TestRequest::get().uri("/api/v1/users/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"code": 404, "message": "User not found", "data": {"id": "nope"}})
    );
}

#[actix_web::test]
async fn list_is_empty_then_in_creation_order() {
    let app = app().await;
    let (status, body) = send(&app, actix_test::TestRequest::get().uri("/api/v1/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Users retrieved successfully");
    assert_eq!(body["data"], json!([]));

    create(&app, "ada", "ada@example.com").await;
    create(&app, "bob", "bob@example.com").await;
    let (_, body) = send(&app, actix_test::TestRequest::get().uri("/api/v1/users")).await;
    let names: Vec<_> = body["data"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|u| u["username"].as_str())
        .collect();
    assert_eq!(names, ["ada", "bob"]);
}

#[actix_web::test]
async fn get_returns_created_user() {
    let app = app().await;
    let id = create(&app, "ada", "ada@example.com").await;
    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri(&format!("/api/v1/users/{id}")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User retrieved successfully");
    assert_eq!(body["data"]["id"], id.as_str());
}

#[actix_web::test]
async fn update_unknown_user_is_not_found_before_body_is_read() {
    let app = app().await;
    let request = actix_test::TestRequest::put()
        .uri("/api/v1/users/missing")
        .set_payload("{broken");
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["id"], "missing");
}

#[actix_web::test]
async fn update_changes_only_present_fields() {
    let app = app().await;
    let id = create(&app, "ada", "ada@example.com").await;
    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .set_json(json!({"email": "ada@example.org"}));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated successfully");
    assert_eq!(body["data"]["username"], "ada");
    assert_eq!(body["data"]["email"], "ada@example.org");
    assert!(body["data"].get("password").is_none());
}

#[actix_web::test]
async fn update_rejects_malformed_json() {
    let app = app().await;
    let id = create(&app, "ada", "ada@example.com").await;
    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .set_payload("{broken");
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|m| m.starts_with("Invalid request body: "))
    );
}

#[rstest]
#[case(json!({"username": ""}), "username", "empty_username")]
#[case(json!({"email": ""}), "email", "empty_email")]
#[case(json!({"password": ""}), "password", "password_too_short")]
#[actix_web::test]
async fn update_rejects_present_but_empty_fields(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = app().await;
    let id = create(&app, "ada", "ada@example.com").await;
    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .set_json(payload);
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["field"], field);
    assert_eq!(body["data"]["code"], code);
}

#[rstest]
#[case(json!({"username": "bob"}), "Username already taken")]
#[case(json!({"email": "bob@example.com"}), "Email already in use")]
#[actix_web::test]
async fn update_rejects_values_held_by_another_user(
    #[case] payload: Value,
    #[case] message: &str,
) {
    let app = app().await;
    let id = create(&app, "ada", "ada@example.com").await;
    create(&app, "bob", "bob@example.com").await;
    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .set_json(payload);
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], message);
}

#[actix_web::test]
async fn update_accepts_own_current_values() {
    let app = app().await;
    let id = create(&app, "ada", "ada@example.com").await;
    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{id}"))
        .set_json(json!({"username": "ada", "email": "ada@example.com"}));
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn delete_removes_user_with_empty_body() {
    let app = app().await;
    let id = create(&app, "ada", "ada@example.com").await;
    let uri = format!("/api/v1/users/{id}");

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete().uri(&uri).to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(actix_test::read_body(response).await.is_empty());

    let (status, _) = send(&app, actix_test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, actix_test::TestRequest::delete().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn legacy_paths_share_handlers() {
    let app = app().await;
    let request = actix_test::TestRequest::post()
        .uri("/user")
        .set_json(json!({"username": "ada", "email": "ada@example.com", "password": "secret1"}));
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().expect("id").to_owned();

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri(&format!("/user/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ada");
}

#[actix_web::test]
async fn unsupported_method_is_rejected() {
    let app = app().await;
    let (status, body) = send(&app, actix_test::TestRequest::patch().uri("/api/v1/users")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["message"], "Method not allowed");
}

#[actix_web::test]
async fn repository_failures_are_redacted() {
    let mut repo = MockUserRepository::new();
    repo.expect_list()
        .returning(|| Err(UserRepositoryError::not_found("backing store")));
    let app = app_with(Arc::new(repo)).await;

    let (status, body) = send(&app, actix_test::TestRequest::get().uri("/api/v1/users")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"code": 500, "message": "Internal server error"}));
}

#[actix_web::test]
async fn create_maps_repository_conflict_after_precheck() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .returning(|_| Err(UserRepositoryError::not_found("ada")));
    repo.expect_find_by_email()
        .returning(|_| Err(UserRepositoryError::not_found("ada@example.com")));
    repo.expect_create()
        .times(1)
        .returning(|_| Err(UserRepositoryError::conflict(UniqueField::Email)));
    let app = app_with(Arc::new(repo)).await;

    let (status, body) = send(&app, create_request("ada", "ada@example.com", "secret1")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already in use");
}
