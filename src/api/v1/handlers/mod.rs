pub mod actors;
pub mod health;
pub mod movies;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;

use crate::error::AppError;

/// Body of a successful delete: `{"success": true, "delete": <id>}`.
#[derive(Debug, Serialize)]
pub struct DeleteEnvelope {
    pub success: bool,
    pub delete: i32,
}

/// Unwrap a JSON body, answering 422 for a missing or unparsable one.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::unprocessable(rejection.body_text()))
}
