//! Casting agency API: movies and actors behind a bearer-token authorization gate.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
