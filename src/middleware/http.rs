//! Router-wide transport middleware.
//!
//! - `x-request-id`: generated when absent, echoed on the response, recorded on the span
//! - access log through `TraceLayer`
//! - 1 MiB request body limit
//! - 30 s request timeout answered with `408` in the API error envelope

use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::http::{Request, StatusCode, header::HeaderName};
use axum::response::{IntoResponse, Response};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::error::ErrorResponse;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const BODY_LIMIT_BYTES: usize = 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

async fn handle_layer_error(err: BoxError) -> Response {
    let (status, code, message) = if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request_timeout", "request timeout")
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "internal server error",
        )
    };

    let body = ErrorResponse {
        success: false,
        error: status.as_u16(),
        code,
        message: message.to_string(),
    };
    (status, Json(body)).into_response()
}

fn make_span(req: &Request<Body>) -> tracing::Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        request_id = %request_id,
    )
}

pub fn apply(router: Router) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_layer_error))
        // Set before tracing so the span can record it.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT));

    router.layer(layers)
}
