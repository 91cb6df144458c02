//! Signing-key directory backed by the identity provider's JWKS endpoint.
//!
//! # Refresh policy
//!
//! - `refresh()` is called eagerly at startup and periodically by
//!   [`KeyDirectory::spawn_refresh_task`].
//! - An unknown `kid` triggers a refresh, at most once per `min_refresh_interval`
//!   since the last attempt (failed ones included) while a set is loaded, and
//!   always when nothing is loaded yet.
//! - Every fetch is bounded by `fetch_timeout`.
//!
//! Readers load the current `Arc<KeySet>` without locking. Fetches are
//! single-flight: callers queued behind an in-flight fetch reuse its outcome,
//! failures included.
//! A failed refresh keeps the previous set.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};
use url::Url;

use super::{
    error::AuthError,
    jwks::{KeySet, SigningKey},
};

#[derive(Debug, Error)]
pub enum KeyFetchError {
    #[error("key set request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("key set endpoint returned {0}")]
    Status(StatusCode),
    #[error("key set body is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("key set fetch timed out after {0:?}")]
    Timeout(Duration),
    // Outcome of a fetch that another caller ran while this one waited.
    #[error("{0}")]
    Previous(String),
}

/// Where key sets come from. The HTTP implementation is the production one.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    // Returns the source name/location (for logging).
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<KeySet, KeyFetchError>;
}

/// Fetches the key set with a plain `GET` on the JWKS URL.
#[derive(Debug, Clone)]
pub struct HttpKeySetSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpKeySetSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, KeyFetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("casting-agency/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<KeySet, KeyFetchError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeyFetchError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(KeySet::from_json(&body)?)
    }
}

/// Refresh knobs. Kept separate from `Config` so the directory stays testable.
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    // Upper bound for a single fetch.
    pub fetch_timeout: Duration,
    // Minimum age of the loaded set before an unknown kid may trigger a refetch.
    pub min_refresh_interval: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            min_refresh_interval: Duration::from_secs(30),
        }
    }
}

pub struct KeyDirectory {
    source: Arc<dyn KeySetSource>,
    policy: RefreshPolicy,
    current: ArcSwapOption<KeySet>,
    // Completed fetch attempts, success or failure. Written under `refresh_state`.
    attempts: AtomicU64,
    refresh_state: Mutex<RefreshState>,
}

/// Bookkeeping of the last fetch attempt. Only touched while holding the lock,
/// which is also what makes fetches single-flight.
#[derive(Debug, Default)]
struct RefreshState {
    last_attempt: Option<Instant>,
    last_error: Option<String>,
}

impl RefreshState {
    fn outcome(&self) -> Result<(), KeyFetchError> {
        match &self.last_error {
            Some(err) => Err(KeyFetchError::Previous(err.clone())),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for KeyDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyDirectory")
            .field("source", &self.source.describe())
            .field("policy", &self.policy)
            .field("keys", &self.current.load().as_ref().map(|set| set.len()))
            .field("attempts", &self.attempts.load(Ordering::Relaxed))
            .finish()
    }
}

impl KeyDirectory {
    pub fn new(source: Arc<dyn KeySetSource>, policy: RefreshPolicy) -> Self {
        Self {
            source,
            policy,
            current: ArcSwapOption::empty(),
            attempts: AtomicU64::new(0),
            refresh_state: Mutex::new(RefreshState::default()),
        }
    }

    /// Current snapshot, if any set has been loaded.
    pub fn snapshot(&self) -> Option<Arc<KeySet>> {
        self.current.load_full()
    }

    /// Look up the key for `kid`, refreshing the set when it is unknown.
    pub async fn resolve(&self, kid: &str) -> Result<Arc<SigningKey>, AuthError> {
        // Read the attempt count before the set so a fetch in between is not missed.
        let observed = self.attempts.load(Ordering::Acquire);
        let snapshot = self.current.load_full();
        if let Some(key) = snapshot.as_ref().and_then(|set| set.get(kid)) {
            return Ok(Arc::clone(key));
        }

        let outcome = {
            let mut state = self.refresh_state.lock().await;

            if self.attempts.load(Ordering::Acquire) != observed {
                // Someone fetched while we were queued: share their result.
                state.outcome()
            } else if self.current.load().is_some()
                && state
                    .last_attempt
                    .is_some_and(|at| at.elapsed() < self.policy.min_refresh_interval)
            {
                tracing::debug!(kid, "unknown kid, refresh suppressed by min interval");
                Ok(())
            } else {
                self.fetch_locked(&mut state).await
            }
        };

        if let Err(err) = outcome {
            if self.current.load().is_none() {
                return Err(AuthError::KeyDirectoryUnavailable(err.to_string()));
            }
            // Stale keys beat no keys; the lookup below decides.
            tracing::warn!(error = %err, "key set refresh failed, keeping previous set");
        }

        self.current
            .load()
            .as_ref()
            .and_then(|set| set.get(kid).cloned())
            .ok_or(AuthError::UnknownSigningKey)
    }

    /// Fetch and publish a new key set.
    ///
    /// On failure nothing is published and the previous set stays in place.
    /// A caller that queued behind an in-flight fetch gets that fetch's outcome.
    pub async fn refresh(&self) -> Result<(), KeyFetchError> {
        let observed = self.attempts.load(Ordering::Acquire);
        let mut state = self.refresh_state.lock().await;

        if self.attempts.load(Ordering::Acquire) != observed {
            return state.outcome();
        }
        self.fetch_locked(&mut state).await
    }

    async fn fetch_locked(&self, state: &mut RefreshState) -> Result<(), KeyFetchError> {
        state.last_attempt = Some(Instant::now());

        let timeout = self.policy.fetch_timeout;
        let fetched = match tokio::time::timeout(timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(KeyFetchError::Timeout(timeout)),
        };

        let result = match fetched {
            Ok(set) => {
                if set.is_empty() {
                    tracing::warn!(
                        source = %self.source.describe(),
                        "key set contains no usable keys"
                    );
                }
                tracing::info!(keys = set.len(), "signing key set refreshed");
                self.current.store(Some(Arc::new(set)));
                state.last_error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %err,
                    "key set fetch failed"
                );
                state.last_error = Some(err.to_string());
                Err(err)
            }
        };

        self.attempts.fetch_add(1, Ordering::AcqRel);
        result
    }

    /// Refresh every `every` until the returned handle is aborted.
    pub fn spawn_refresh_task(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let directory = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick fires immediately; startup already fetched.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(err) = directory.refresh().await {
                    tracing::warn!(error = %err, "periodic key set refresh failed");
                }
            }
        })
    }
}
