/*
 * Responsibility
 * - Environment (and .env) loading: listen port, DATABASE_URL, CORS, identity provider
 * - Validation of the values (missing or invalid values abort startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // Identity provider
    pub auth_issuer: String,
    pub auth_audience: String,
    pub auth_jwks_url: Url,
    pub access_token_leeway_seconds: u64,

    // Key set refresh policy
    pub jwks_fetch_timeout: Duration,
    pub jwks_refresh_interval: Duration,
    pub jwks_min_refresh_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match non_empty("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = non_empty("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_env = non_empty("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        // AUTH_DOMAIN is a shortcut for the tenant; explicit values win.
        let auth_domain = non_empty("AUTH_DOMAIN").map(|d| d.trim_end_matches('/').to_string());

        let auth_issuer = non_empty("AUTH_ISSUER")
            .or_else(|| auth_domain.as_ref().map(|d| format!("https://{}/", d)))
            .ok_or(ConfigError::Missing("AUTH_ISSUER"))?;

        let auth_audience =
            non_empty("AUTH_AUDIENCE").ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let auth_jwks_url = non_empty("AUTH_JWKS_URL")
            .or_else(|| {
                auth_domain
                    .as_ref()
                    .map(|d| format!("https://{}/.well-known/jwks.json", d))
            })
            .ok_or(ConfigError::Missing("AUTH_JWKS_URL"))?;
        let auth_jwks_url =
            Url::parse(&auth_jwks_url).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;
        if !matches!(auth_jwks_url.scheme(), "https" | "http") {
            return Err(ConfigError::Invalid("AUTH_JWKS_URL"));
        }

        let seconds = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match non_empty(key) {
                Some(v) => v.trim().parse::<u64>().map_err(|_| ConfigError::Invalid(key)),
                None => Ok(default),
            }
        };

        let access_token_leeway_seconds = seconds("ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;

        let jwks_fetch_timeout = Duration::from_secs(seconds("JWKS_FETCH_TIMEOUT_SECONDS", 5)?);
        if jwks_fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid("JWKS_FETCH_TIMEOUT_SECONDS"));
        }

        let jwks_refresh_interval =
            Duration::from_secs(seconds("JWKS_REFRESH_INTERVAL_SECONDS", 3600)?);
        if jwks_refresh_interval.is_zero() {
            return Err(ConfigError::Invalid("JWKS_REFRESH_INTERVAL_SECONDS"));
        }

        let jwks_min_refresh_interval =
            Duration::from_secs(seconds("JWKS_MIN_REFRESH_INTERVAL_SECONDS", 30)?);

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            auth_issuer,
            auth_audience,
            auth_jwks_url,
            access_token_leeway_seconds,
            jwks_fetch_timeout,
            jwks_refresh_interval,
            jwks_min_refresh_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const BASE: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/casting_agency"),
        ("AUTH_DOMAIN", "casting.example.auth0.com"),
        ("AUTH_AUDIENCE", "casting-agency"),
    ];

    #[test]
    fn domain_derives_issuer_and_jwks_url() {
        let config = load(&BASE).unwrap();

        assert_eq!(config.auth_issuer, "https://casting.example.auth0.com/");
        assert_eq!(
            config.auth_jwks_url.as_str(),
            "https://casting.example.auth0.com/.well-known/jwks.json"
        );
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.access_token_leeway_seconds, 0);
        assert_eq!(config.jwks_fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.jwks_refresh_interval, Duration::from_secs(3600));
    }

    #[test]
    fn explicit_values_override_domain() {
        let mut vars = BASE.to_vec();
        vars.extend([
            ("AUTH_ISSUER", "https://issuer.example.com/"),
            ("AUTH_JWKS_URL", "http://127.0.0.1:9000/jwks.json"),
            ("PORT", "3000"),
            ("APP_ENV", "PROD"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example.com, ,https://b.example.com"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.auth_issuer, "https://issuer.example.com/");
        assert_eq!(config.auth_jwks_url.port(), Some(9000));
        assert_eq!(config.addr.port(), 3000);
        assert!(config.app_env.is_production());
        assert_eq!(config.cors_allowed_origins.len(), 2);
    }

    #[test]
    fn required_values() {
        assert_eq!(
            load(&BASE[1..]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
        assert_eq!(
            load(&BASE[..2]).unwrap_err(),
            ConfigError::Missing("AUTH_AUDIENCE")
        );
        assert_eq!(
            load(&[BASE[0], BASE[2]]).unwrap_err(),
            ConfigError::Missing("AUTH_ISSUER")
        );
    }

    #[test]
    fn invalid_values() {
        for (key, value) in [
            ("PORT", "eighty"),
            ("AUTH_JWKS_URL", "not a url"),
            ("AUTH_JWKS_URL", "ftp://keys.example.com/jwks.json"),
            ("ACCESS_TOKEN_LEEWAY_SECONDS", "-1"),
            ("JWKS_FETCH_TIMEOUT_SECONDS", "0"),
        ] {
            let mut vars = BASE.to_vec();
            vars.push((key, value));
            assert_eq!(load(&vars).unwrap_err(), ConfigError::Invalid(key), "{key}");
        }
    }
}
