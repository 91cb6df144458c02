/*
 * Responsibility
 * - /movies CRUD handlers
 * - Every route here sits behind a permission layer; mutations log the acting subject
 */
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use crate::{
    api::v1::{
        dto::movies::{
            CreateMovieRequest, MovieEnvelope, MovieListEnvelope, MovieResponse,
            UpdateMovieRequest,
        },
        extractors::Authorized,
        handlers::{DeleteEnvelope, json_body},
    },
    error::AppError,
    repos::movie_repo,
    state::AppState,
};

pub async fn list_movies(
    State(state): State<AppState>,
) -> Result<Json<MovieListEnvelope>, AppError> {
    let rows = movie_repo::list(&state.db).await?;
    if rows.is_empty() {
        return Err(AppError::BadRequest);
    }

    Ok(Json(MovieListEnvelope {
        success: true,
        movies: rows.into_iter().map(MovieResponse::from).collect(),
    }))
}

pub async fn create_movie(
    State(state): State<AppState>,
    Authorized(claims): Authorized,
    body: Result<Json<CreateMovieRequest>, JsonRejection>,
) -> Result<Json<MovieEnvelope>, AppError> {
    let req = json_body(body)?;
    let (title, release_date) = req.validate().map_err(AppError::unprocessable)?;

    let row = movie_repo::create(&state.db, title, release_date).await?;
    tracing::info!(sub = ?claims.subject, movie_id = row.id, "movie created");

    Ok(Json(MovieEnvelope {
        success: true,
        movie: row.into(),
    }))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Authorized(claims): Authorized,
    Path(id): Path<i32>,
    body: Result<Json<UpdateMovieRequest>, JsonRejection>,
) -> Result<Json<MovieEnvelope>, AppError> {
    let req = json_body(body)?;
    let (title, release_date) = req.validate().map_err(AppError::unprocessable)?;

    let row = movie_repo::update(&state.db, id, title, release_date)
        .await?
        .ok_or(AppError::not_found("movie"))?;
    tracing::info!(sub = ?claims.subject, movie_id = id, "movie updated");

    Ok(Json(MovieEnvelope {
        success: true,
        movie: row.into(),
    }))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    Authorized(claims): Authorized,
    Path(id): Path<i32>,
) -> Result<Json<DeleteEnvelope>, AppError> {
    if !movie_repo::delete(&state.db, id).await? {
        return Err(AppError::not_found("movie"));
    }
    tracing::info!(sub = ?claims.subject, movie_id = id, "movie deleted");

    Ok(Json(DeleteEnvelope {
        success: true,
        delete: id,
    }))
}
