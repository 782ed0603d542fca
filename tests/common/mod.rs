#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::{self, MessageBody},
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    middleware::Logger,
    test, web, App,
};
use kanban_board::auth::{AuthMiddleware, TokenService};
use kanban_board::config::AdminSeed;
use kanban_board::routes;
use kanban_board::seed::ensure_admin;
use kanban_board::state::AppState;
use kanban_board::store::InMemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_BCRYPT_COST: u32 = 4;
pub const ADMIN_EMAIL: &str = "admin@gmail.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Holds auth details of a registered test user.
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// Application state over a fresh in-memory store with the admin already seeded.
pub async fn test_state_with(tokens: TokenService) -> web::Data<AppState> {
    let store = InMemoryStore::new();
    ensure_admin(&store, &AdminSeed::default(), TEST_BCRYPT_COST)
        .await
        .expect("Failed to seed admin");
    web::Data::new(AppState::new(Arc::new(store), tokens, TEST_BCRYPT_COST))
}

pub async fn test_state() -> web::Data<AppState> {
    test_state_with(TokenService::new(TEST_SECRET)).await
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(AuthMiddleware)
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

/// Sends a request and returns its status and body as text.
pub async fn send(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    req: test::TestRequest,
    token: Option<&str>,
) -> (StatusCode, String) {
    let req = match token {
        Some(token) => req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token))),
        None => req,
    };
    // Middleware rejections surface as service errors rather than responses.
    let (status, body) = match app.call(req.to_request()).await {
        Ok(resp) => (resp.status(), test::read_body(resp).await),
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = body::to_bytes(resp.into_body()).await.unwrap_or_default();
            (status, body)
        }
    };
    (status, String::from_utf8_lossy(&body).into_owned())
}

/// Like [`send`], but parses the body as JSON.
pub async fn send_json(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    req: test::TestRequest,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let (status, body) = send(app, req, token).await;
    let value = serde_json::from_str(&body)
        .unwrap_or_else(|e| panic!("Expected JSON body ({}), got {:?}", e, body));
    (status, value)
}

pub async fn register(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    full_name: &str,
    email: &str,
    password: &str,
) -> (StatusCode, String) {
    let req = test::TestRequest::post()
        .uri("/users/register")
        .set_json(json!({
            "full_name": full_name,
            "email": email,
            "password": password
        }));
    send(app, req, None).await
}

pub async fn login(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> (StatusCode, String) {
    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": email, "password": password }));
    send(app, req, None).await
}

pub fn token_from(body: &str) -> String {
    let value: Value = serde_json::from_str(body).expect("login body is JSON");
    value["token"]
        .as_str()
        .expect("login body carries a token")
        .to_string()
}

pub async fn register_and_login(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
) -> TestUser {
    let password = "secret1";
    let (status, body) = register(app, "Test User", email, password).await;
    assert_eq!(status, StatusCode::CREATED, "Registration failed. Body: {}", body);
    let registered: Value = serde_json::from_str(&body).unwrap();

    let (status, body) = login(app, email, password).await;
    assert_eq!(status, StatusCode::OK, "Login failed. Body: {}", body);

    TestUser {
        id: registered["id"].as_i64().unwrap(),
        email: email.to_string(),
        token: token_from(&body),
    }
}

pub async fn admin_token(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
) -> String {
    let (status, body) = login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "Admin login failed. Body: {}", body);
    token_from(&body)
}

pub async fn create_category(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    admin_token: &str,
    kind: &str,
) -> i64 {
    let req = test::TestRequest::post()
        .uri("/categories")
        .set_json(json!({ "type": kind }));
    let (status, body) = send_json(app, req, Some(admin_token)).await;
    assert_eq!(status, StatusCode::CREATED, "Category creation failed: {}", body);
    body["id"].as_i64().unwrap()
}

pub async fn create_task(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    token: &str,
    category_id: i64,
    title: &str,
) -> i64 {
    let req = test::TestRequest::post().uri("/tasks").set_json(json!({
        "title": title,
        "description": format!("{} description", title),
        "category_id": category_id
    }));
    let (status, body) = send_json(app, req, Some(token)).await;
    assert_eq!(status, StatusCode::CREATED, "Task creation failed: {}", body);
    body["id"].as_i64().unwrap()
}
