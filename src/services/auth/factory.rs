/// Factory: build the key directory and `AuthGate` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{
    AuthGate, ClaimsPolicy, HttpKeySetSource, KeyDirectory, KeyFetchError, RefreshPolicy,
    TokenVerifier,
};

pub fn build_key_directory(config: &Config) -> Result<Arc<KeyDirectory>, KeyFetchError> {
    let source = HttpKeySetSource::new(config.auth_jwks_url.clone(), config.jwks_fetch_timeout)?;

    let policy = RefreshPolicy {
        fetch_timeout: config.jwks_fetch_timeout,
        min_refresh_interval: config.jwks_min_refresh_interval,
    };

    Ok(Arc::new(KeyDirectory::new(Arc::new(source), policy)))
}

pub fn build_auth_gate(config: &Config, keys: Arc<KeyDirectory>) -> Arc<AuthGate> {
    let verifier = TokenVerifier::new(
        keys,
        ClaimsPolicy {
            issuer: config.auth_issuer.clone(),
            audience: config.auth_audience.clone(),
            leeway_seconds: config.access_token_leeway_seconds,
        },
    );

    Arc::new(AuthGate::new(verifier))
}
