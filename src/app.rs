/*
 * Responsibility
 * - Load Config → build dependencies → assemble the Router
 * - Tracing and panic hook setup
 * - Key directory warm-up and background refresh
 * - axum::serve() with graceful shutdown
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    error::AppError,
    middleware,
    repos,
    services::auth::{AuthGate, KeyDirectory, build_auth_gate, build_key_directory},
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins, e.g. RUST_LOG=info,casting_agency=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development fails fast; production keeps serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting casting agency API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connecting to DATABASE_URL")?;
    repos::migrate(&db).await.context("running migrations")?;

    let keys = build_key_directory(&config).context("building key directory")?;
    warm_up(&keys).await;
    let _refresher = keys.spawn_refresh_task(config.jwks_refresh_interval);

    let gate = build_auth_gate(&config, keys);
    let app = build_router(AppState::new(db, gate), &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// First fetch of the key set. A failure only delays it to the first request.
async fn warm_up(keys: &Arc<KeyDirectory>) {
    match keys.refresh().await {
        Ok(()) => {
            let loaded = keys.snapshot().map(|set| set.len()).unwrap_or(0);
            tracing::info!(keys = loaded, "signing keys loaded");
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                "signing keys unavailable at startup; will retry on demand"
            );
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}

async fn route_not_found() -> AppError {
    AppError::not_found("route")
}

/// The full application router: resource routes, transport middleware and CORS.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let gate: Arc<AuthGate> = state.auth.clone();

    let router = Router::new()
        .merge(api::v1::routes(gate))
        .fallback(route_not_found)
        .with_state(state);

    let router = middleware::http::apply(router);
    middleware::cors::apply(router, config)
}
