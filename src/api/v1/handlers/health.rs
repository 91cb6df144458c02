/*
 * Responsibility
 * - GET / and GET /health (liveness, no authorization)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn index() -> &'static str {
    "Hello World"
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
