/*
 * Responsibility
 * - URL layout of the casting API
 * - Which permission each method needs; the gate is attached per method router,
 *   so a method on the same path can require a different permission
 */
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::{
    api::v1::handlers::{
        actors::{create_actor, delete_actor, list_actors, update_actor},
        health::{health, index},
        movies::{create_movie, delete_movie, list_movies, update_movie},
    },
    middleware::auth::access::require,
    services::auth::AuthGate,
    state::AppState,
};

pub fn routes(gate: Arc<AuthGate>) -> Router<AppState> {
    let g = || gate.clone();

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(
            "/movies",
            require(get(list_movies), g(), "get:movies")
                .merge(require(post(create_movie), g(), "post:movies")),
        )
        .route(
            "/movies/{id}",
            require(patch(update_movie), g(), "patch:movies")
                .merge(require(delete(delete_movie), g(), "delete:movies")),
        )
        .route(
            "/actors",
            require(get(list_actors), g(), "get:actors")
                .merge(require(post(create_actor), g(), "post:actors")),
        )
        .route(
            "/actors/{id}",
            require(patch(update_actor), g(), "patch:actors")
                .merge(require(delete(delete_actor), g(), "delete:actors")),
        )
}
