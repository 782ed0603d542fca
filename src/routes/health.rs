use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

const BANNER: &str = "Kanban Board API";

/// Plain-text banner on the root path.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(BANNER)
}

/// Liveness probe. Public, and touches neither the store nor the token service.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok", "timestamp": Utc::now() }))
}
