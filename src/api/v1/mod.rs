/*
 * Responsibility
 * - Public surface of the HTTP API (routes() plus the pieces tests reuse)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
