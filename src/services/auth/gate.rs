//! The authorization gate: one decision per protected request.
//!
//! Stages run in a fixed order and stop at the first failure:
//! header extraction → signature/claims verification → permission check.

use axum::http::{HeaderMap, header};

use super::{
    claims::Claims, error::AuthError, extractor::extract_bearer, permissions::check_permission,
    verifier::TokenVerifier,
};

/// Outcome of a single authorization attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow(Claims),
    Deny(AuthError),
}

impl AuthDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    pub fn into_result(self) -> Result<Claims, AuthError> {
        match self {
            Self::Allow(claims) => Ok(claims),
            Self::Deny(err) => Err(err),
        }
    }
}

impl From<Result<Claims, AuthError>> for AuthDecision {
    fn from(result: Result<Claims, AuthError>) -> Self {
        match result {
            Ok(claims) => Self::Allow(claims),
            Err(err) => Self::Deny(err),
        }
    }
}

#[derive(Debug)]
pub struct AuthGate {
    verifier: TokenVerifier,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Decide whether the request carrying `headers` may use `required`.
    pub async fn authorize(&self, headers: &HeaderMap, required: &str) -> AuthDecision {
        let decision = AuthDecision::from(self.evaluate(headers, required).await);

        match &decision {
            AuthDecision::Allow(claims) => {
                tracing::debug!(sub = ?claims.subject, permission = required, "request authorized");
            }
            AuthDecision::Deny(err) if err.is_infrastructure() => {
                tracing::error!(error = %err, permission = required, "authorization unavailable");
            }
            AuthDecision::Deny(err) => {
                tracing::warn!(
                    code = err.code(),
                    status = err.status().as_u16(),
                    reason = %err,
                    permission = required,
                    "request denied"
                );
            }
        }

        decision
    }

    async fn evaluate(&self, headers: &HeaderMap, required: &str) -> Result<Claims, AuthError> {
        let token = extract_bearer(headers.get(header::AUTHORIZATION))?;
        let claims = self.verifier.verify(&token).await?;
        check_permission(&claims, required)?;
        Ok(claims)
    }
}
