use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Claims;

/// Claims of the caller, for handlers behind `middleware::auth::access::require`.
///
/// The layer inserts the claims into request extensions on Allow. Missing claims
/// mean the route was registered without the layer, which is a server bug.
#[derive(Debug, Clone)]
pub struct Authorized(pub Claims);

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Authorized)
            .ok_or_else(|| {
                tracing::error!(
                    uri = %parts.uri,
                    "handler expects claims but no permission layer ran"
                );
                AppError::Internal
            })
    }
}
