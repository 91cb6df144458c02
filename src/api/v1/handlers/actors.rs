/*
 * Responsibility
 * - /actors CRUD handlers
 */
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use crate::{
    api::v1::{
        dto::actors::{
            ActorEnvelope, ActorListEnvelope, ActorResponse, CreateActorRequest,
            UpdateActorRequest,
        },
        extractors::Authorized,
        handlers::{DeleteEnvelope, json_body},
    },
    error::AppError,
    repos::actor_repo,
    state::AppState,
};

pub async fn list_actors(
    State(state): State<AppState>,
) -> Result<Json<ActorListEnvelope>, AppError> {
    let rows = actor_repo::list(&state.db).await?;
    if rows.is_empty() {
        return Err(AppError::BadRequest);
    }

    Ok(Json(ActorListEnvelope {
        success: true,
        actors: rows.into_iter().map(ActorResponse::from).collect(),
    }))
}

pub async fn create_actor(
    State(state): State<AppState>,
    Authorized(claims): Authorized,
    body: Result<Json<CreateActorRequest>, JsonRejection>,
) -> Result<Json<ActorEnvelope>, AppError> {
    let req = json_body(body)?;
    let (name, age, gender) = req.validate().map_err(AppError::unprocessable)?;

    let row = actor_repo::create(&state.db, name, age, gender).await?;
    tracing::info!(sub = ?claims.subject, actor_id = row.id, "actor created");

    Ok(Json(ActorEnvelope {
        success: true,
        actor: row.into(),
    }))
}

pub async fn update_actor(
    State(state): State<AppState>,
    Authorized(claims): Authorized,
    Path(id): Path<i32>,
    body: Result<Json<UpdateActorRequest>, JsonRejection>,
) -> Result<Json<ActorEnvelope>, AppError> {
    let req = json_body(body)?;
    req.validate().map_err(AppError::unprocessable)?;

    let row = actor_repo::update(
        &state.db,
        id,
        req.name.as_deref(),
        req.age,
        req.gender.as_deref(),
    )
    .await?
    .ok_or(AppError::not_found("actor"))?;
    tracing::info!(sub = ?claims.subject, actor_id = id, "actor updated");

    Ok(Json(ActorEnvelope {
        success: true,
        actor: row.into(),
    }))
}

pub async fn delete_actor(
    State(state): State<AppState>,
    Authorized(claims): Authorized,
    Path(id): Path<i32>,
) -> Result<Json<DeleteEnvelope>, AppError> {
    if !actor_repo::delete(&state.db, id).await? {
        return Err(AppError::not_found("actor"));
    }
    tracing::info!(sub = ?claims.subject, actor_id = id, "actor deleted");

    Ok(Json(DeleteEnvelope {
        success: true,
        delete: id,
    }))
}
