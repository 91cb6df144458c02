/*
 * Responsibility
 * - API-wide AppError definition
 * - IntoResponse: HTTP status + the shared JSON error envelope
 *   {"success": false, "error": <status>, "code": <code>, "message": <text>}
 * - Conversions from RepoError / AuthError
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request")]
    BadRequest,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("unprocessable: {reason}")]
    Unprocessable { reason: String },
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn unprocessable(reason: impl Into<String>) -> Self {
        Self::Unprocessable {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            // The gate's status is final; never rewritten here.
            AppError::Auth(err) => err.status(),
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (code, message) = match &self {
            AppError::BadRequest => ("bad_request", "bad request".to_string()),
            AppError::NotFound { resource } => {
                tracing::debug!(resource, "resource not found");
                ("not_found", "resource not found".to_string())
            }
            AppError::Unprocessable { reason } => {
                tracing::debug!(reason = %reason, "unprocessable request");
                ("unprocessable", "unprocessable".to_string())
            }
            AppError::Auth(err) => (err.code(), err.description().to_string()),
            AppError::Internal => ("internal_error", "internal server error".to_string()),
        };

        let body = ErrorResponse {
            success: false,
            error: status.as_u16(),
            code,
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        tracing::error!(error = %e, "repository failure");
        match e {
            RepoError::Db(_) | RepoError::Migrate(_) => AppError::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::services::auth::HeaderProblem;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn auth_errors_keep_status_code_and_description() {
        let (status, body) = render(AppError::from(AuthError::MalformedAuthorizationHeader(
            HeaderProblem::NotASingleToken,
        )))
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 401);
        assert_eq!(body["code"], "invalid_header");
        assert_eq!(body["message"], "Authorization header must be a bearer token.");
    }

    #[tokio::test]
    async fn forbidden_is_not_downgraded() {
        let (status, body) = render(AuthError::InsufficientPermission.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], 403);
        assert_eq!(body["code"], "unauthorized");
    }

    #[tokio::test]
    async fn resource_errors_use_the_same_envelope() {
        let (status, body) = render(AppError::unprocessable("title is required")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "unprocessable");

        let (status, body) = render(AppError::not_found("movie")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "resource not found");

        let (status, body) = render(AppError::BadRequest).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "bad request");
    }
}
