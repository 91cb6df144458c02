/*
 * Responsibility
 * - SQLx access per table (movies, actors)
 * - Schema migrations embedded from ./migrations
 */
pub mod actor_repo;
pub mod error;
pub mod movie_repo;

use sqlx::PgPool;

use crate::repos::error::RepoError;

pub async fn migrate(db: &PgPool) -> Result<(), RepoError> {
    sqlx::migrate!("./migrations").run(db).await?;
    Ok(())
}
