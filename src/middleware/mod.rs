/*
 * Responsibility
 * - Middleware entry points
 *   - auth::access::require(...): per-route permission gate
 *   - http::apply(...), cors::apply(...): router-wide layers
 */
pub mod auth;
pub mod cors;
pub mod http;
