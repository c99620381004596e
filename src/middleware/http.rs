//! Transport-level middleware applied to every route.
//!
//! - `x-request-id`: generated when missing, echoed on the response
//! - access log via `TraceLayer`
//! - 1 MiB request body limit
//! - global timeout from `REQUEST_TIMEOUT_SECONDS` (408 with the usual JSON body)

use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, header::HeaderName};
use axum::response::IntoResponse;
use serde_json::json;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

async fn handle_layer_error(err: BoxError) -> impl IntoResponse {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request timed out");
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "message": "Request Timeout" })),
        )
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Internal Server Error" })),
        )
    }
}

pub fn apply(router: Router, config: &Config) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let timeout = Duration::from_secs(config.request_timeout_seconds.max(1));

    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        // TimeoutLayer fails the service; turn that back into a response.
        .layer(HandleErrorLayer::new(handle_layer_error))
        .layer(TimeoutLayer::new(timeout));

    router.layer(layers)
}
