/*
 * Responsibility
 * - GET /health (疎通用), GET / (挨拶)
 * - どちらも認証なし
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

pub async fn root() -> &'static str {
    "Hello World!"
}
