//! End-to-end tests through the full middleware chain and route table.

use std::time::Duration;

use actix_http::Request;
use actix_web::{
    App, HttpResponse,
    body::BoxBody,
    dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse},
    http::{Method, StatusCode, header},
    test::{self, TestRequest},
    web,
};
use futures_util::future::join_all;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use user_service::domain::REQUEST_ID_HEADER;
use user_service::inbound::http::routes::guarded;
use user_service::inbound::http::state::AppInfo;
use user_service::server::{AppDependencies, build_app};

const REQUEST_TIMEOUT: Duration = Duration::from_millis(200);

#[fixture]
fn deps() -> AppDependencies {
    let deps = AppDependencies::in_memory(AppInfo::new("user-service", "1.0.0"), REQUEST_TIMEOUT);
    deps.health_state.mark_ready();
    deps
}

async fn slow() -> HttpResponse {
    tokio::time::sleep(Duration::from_secs(2)).await;
    HttpResponse::Ok().finish()
}

async fn explode() -> HttpResponse {
    panic!("handler exploded");
}

fn app_with_test_routes(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    build_app(deps)
        .service(guarded(
            web::resource("/test/slow").route(web::get().to(slow)),
            REQUEST_TIMEOUT,
        ))
        .service(guarded(
            web::resource("/test/panic").route(web::get().to(explode)),
            REQUEST_TIMEOUT,
        ))
}

async fn init_app(
    deps: AppDependencies,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(app_with_test_routes(deps)).await
}

async fn send<S>(app: &S, request: TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

fn new_user(username: &str, email: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({ "username": username, "email": email, "password": "secret1" }))
}

#[rstest]
#[actix_web::test]
async fn user_lifecycle_through_versioned_routes(deps: AppDependencies) {
    let app = init_app(deps).await;

    let (status, body) = send(&app, new_user("ada", "ada@example.com")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"].get("password").is_none());
    let id = body["data"]["id"].as_str().expect("id").to_owned();
    let uri = format!("/api/v1/users/{id}");

    let (status, body) = send(&app, TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");

    let (status, body) = send(
        &app,
        TestRequest::put()
            .uri(&uri)
            .set_json(json!({"username": "lovelace"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "lovelace");
    assert_eq!(body["data"]["email"], "ada@example.com");

    let (status, body) = send(&app, TestRequest::delete().uri(&uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["id"], id.as_str());
}

#[rstest]
#[case(TestRequest::get().uri("/api/v1/users"), StatusCode::OK)]
#[case(TestRequest::get().uri("/api/v1/health"), StatusCode::OK)]
#[case(new_user("grace", "grace@example.com"), StatusCode::CREATED)]
#[case(TestRequest::get().uri("/api/v1/users/missing"), StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn routed_requests_reach_their_handlers(
    deps: AppDependencies,
    #[case] request: TestRequest,
    #[case] expected: StatusCode,
) {
    let app = test::init_service(build_app(deps)).await;
    let response = test::call_service(&app, request.to_request()).await;

    assert_eq!(response.status(), expected);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[rstest]
#[actix_web::test]
async fn unknown_routes_render_not_found_envelope(deps: AppDependencies) {
    let app = init_app(deps).await;
    let response =
        test::call_service(&app, TestRequest::get().uri("/nowhere").to_request()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({"code": 404, "message": "Resource not found"}));
}

#[rstest]
#[actix_web::test]
async fn unsupported_methods_on_known_paths_are_rejected(deps: AppDependencies) {
    let app = init_app(deps).await;
    let (status, body) = send(&app, TestRequest::delete().uri("/api/v1/users")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"code": 405, "message": "Method not allowed"}));
}

#[rstest]
#[case("/api/v1/users")]
#[case("/does/not/exist")]
#[actix_web::test]
async fn preflight_requests_short_circuit(deps: AppDependencies, #[case] path: &str) {
    let app = init_app(deps).await;
    let request = TestRequest::default().method(Method::OPTIONS).uri(path);
    let response = test::call_service(&app, request.to_request()).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    assert!(test::read_body(response).await.is_empty());
}

#[rstest]
#[actix_web::test]
async fn slow_handlers_time_out(deps: AppDependencies) {
    let app = init_app(deps).await;
    let response = test::call_service(&app, TestRequest::get().uri("/test/slow").to_request()).await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({"code": 408, "message": "Request timeout"}));
}

#[rstest]
#[actix_web::test]
async fn panics_are_recovered_and_service_keeps_running(deps: AppDependencies) {
    let app = init_app(deps).await;

    let (status, body) = send(&app, TestRequest::get().uri("/test/panic")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"code": 500, "message": "Internal server error"}));

    let (status, body) = send(&app, TestRequest::get().uri("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Service is healthy");
}

#[rstest]
#[actix_web::test]
async fn client_request_id_is_echoed(deps: AppDependencies) {
    let app = init_app(deps).await;
    let request = TestRequest::get()
        .uri("/ping")
        .insert_header((REQUEST_ID_HEADER, "trace-me-123"));
    let response = test::call_service(&app, request.to_request()).await;

    assert_eq!(
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some("trace-me-123")
    );
}

#[rstest]
#[case("/api/v1/health", "Service is healthy")]
#[case("/ping", "Service is healthy")]
#[case("/api/v1/status", "Application status")]
#[case("/status", "Application status")]
#[actix_web::test]
async fn health_routes_and_aliases(
    deps: AppDependencies,
    #[case] path: &str,
    #[case] message: &str,
) {
    let app = init_app(deps).await;
    let (status, body) = send(&app, TestRequest::get().uri(path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["message"], message);
}

#[rstest]
#[actix_web::test]
async fn draining_fails_health_checks(deps: AppDependencies) {
    let health_state = deps.health_state.clone();
    let app = init_app(deps).await;

    let response =
        test::call_service(&app, TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);

    health_state.mark_unhealthy();
    let (status, body) = send(&app, TestRequest::get().uri("/api/v1/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Service is shutting down");
    let response =
        test::call_service(&app, TestRequest::get().uri("/health/live").to_request()).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[rstest]
#[actix_web::test]
async fn legacy_user_aliases_share_state(deps: AppDependencies) {
    let app = init_app(deps).await;
    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/user")
            .set_json(json!({"username": "bob", "email": "bob@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().expect("id").to_owned();

    let (status, _) = send(&app, TestRequest::get().uri(&format!("/api/v1/users/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, TestRequest::delete().uri(&format!("/user/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, TestRequest::get().uri("/api/v1/users")).await;
    assert_eq!(body["data"], json!([]));
}

#[rstest]
#[actix_web::test]
async fn concurrent_creates_admit_one_username(deps: AppDependencies) {
    let app = init_app(deps).await;
    let requests = (0..16).map(|n| {
        test::call_service(
            &app,
            new_user("contended", &format!("user{n}@example.com")).to_request(),
        )
    });
    let statuses: Vec<StatusCode> = join_all(requests)
        .await
        .iter()
        .map(ServiceResponse::status)
        .collect();

    let created = statuses
        .iter()
        .filter(|status| **status == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1);
    assert!(
        statuses
            .iter()
            .all(|status| matches!(*status, StatusCode::CREATED | StatusCode::CONFLICT))
    );
}
