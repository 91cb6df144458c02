//! CORS policy for browser clients.
//!
//! - Development: any origin, no credentials.
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`. An empty list
//!   emits no CORS headers at all.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::middleware::http::REQUEST_ID_HEADER;

fn layer(config: &Config) -> CorsLayer {
    let origins = if config.app_env.is_production() {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();
        AllowOrigin::list(allowed)
    } else {
        AllowOrigin::from(Any)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(600))
}

pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(config))
}
