/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body `{ "message": ... }`)
 * - RepoError / GateError / PaymentError を統一的に変換
 */
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::gate::GateError;
use crate::services::payments::PaymentError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    // No bearer token on a gated route.
    #[error("Unauthorized Access")]
    Unauthenticated,
    // Token present but signature/format/expiry check failed.
    #[error("Forbidden Access")]
    InvalidToken,
    // Claimed identity differs from the verified one.
    #[error("Forbidden Access")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
    #[error("Service Unavailable")]
    Unavailable,
    #[error("Internal Server Error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            message: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        tracing::error!(error = ?e, "document store failure");
        AppError::Internal
    }
}

impl From<GateError> for AppError {
    fn from(e: GateError) -> Self {
        tracing::warn!(reason = %e, "identity gate rejected request");
        AppError::Forbidden
    }
}

impl From<PaymentError> for AppError {
    fn from(e: PaymentError) -> Self {
        tracing::error!(error = %e, "payment processor failure");
        AppError::Internal
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use super::*;

    async fn error_to_response(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthenticated_is_401() {
        let (status, body) = error_to_response(AppError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Unauthorized Access"}));
    }

    #[tokio::test]
    async fn invalid_token_and_forbidden_share_403_body() {
        for err in [AppError::InvalidToken, AppError::Forbidden] {
            let (status, body) = error_to_response(err).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body, json!({"message": "Forbidden Access"}));
        }
    }

    #[tokio::test]
    async fn store_failure_is_sanitized_500() {
        let err = AppError::from(RepoError::Corrupt);
        let (status, body) = error_to_response(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Internal Server Error"}));
    }

    #[tokio::test]
    async fn gate_errors_become_forbidden() {
        let err = AppError::from(GateError::Mismatch);
        assert!(matches!(err, AppError::Forbidden));
        let (status, _) = error_to_response(err).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn bad_request_keeps_message() {
        let (status, body) = error_to_response(AppError::bad_request("invalid id")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "invalid id"}));
    }
}
