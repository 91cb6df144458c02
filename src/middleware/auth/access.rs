//! Bearer-token gate as a per-route layer.
//!
//! The required permission is passed when the route is registered:
//!
//! ```ignore
//! let movies = access::require(get(list_movies), gate.clone(), "get:movies");
//! router.route("/movies", movies)
//! ```
//!
//! On Allow the verified `Claims` go into request extensions (read them with the
//! `Authorized` extractor). On Deny the `AuthError` is rendered as is.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::error::AppError;
use crate::services::auth::{AuthDecision, AuthGate};

#[derive(Clone)]
struct PermissionGuard {
    gate: Arc<AuthGate>,
    permission: &'static str,
}

/// Wrap `route` so every method on it requires `permission`.
pub fn require<S>(
    route: MethodRouter<S>,
    gate: Arc<AuthGate>,
    permission: &'static str,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    // `route_layer` so unmatched methods still answer 405 without a token.
    route.route_layer(middleware::from_fn_with_state(
        PermissionGuard { gate, permission },
        access_middleware,
    ))
}

async fn access_middleware(
    State(guard): State<PermissionGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    match guard.gate.authorize(req.headers(), guard.permission).await {
        AuthDecision::Allow(claims) => {
            // middleware → extractor
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        AuthDecision::Deny(err) => Err(err.into()),
    }
}
