/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - db: PgPool, auth: the authorization gate
 * - Cheap to clone (PgPool and Arc inside)
 */
use std::sync::Arc;

use sqlx::PgPool;

use crate::services::auth::AuthGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Arc<AuthGate>,
}

impl AppState {
    pub fn new(db: PgPool, auth: Arc<AuthGate>) -> Self {
        Self { db, auth }
    }
}
