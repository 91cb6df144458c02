//! Authorization failures produced by the bearer-token gate.
//!
//! Every variant carries a fixed HTTP status, a machine-readable `code` and a
//! human-readable description. Clients dispatch on `code`, so these strings are
//! part of the public contract and must not drift.

use axum::http::StatusCode;
use thiserror::Error;

/// Why an `Authorization` header was rejected before any token parsing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProblem {
    /// Value does not start with the literal `"Bearer "`.
    MissingBearerScheme,
    /// Scheme is present but the remainder is not exactly one token.
    NotASingleToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization header is missing")]
    MissingAuthorizationHeader,

    #[error("authorization header is malformed: {0:?}")]
    MalformedAuthorizationHeader(HeaderProblem),

    #[error("token could not be parsed")]
    MalformedToken,

    #[error("no signing key matches the token's kid")]
    UnknownSigningKey,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is expired")]
    ExpiredToken,

    #[error("token claims are invalid")]
    InvalidClaims,

    #[error("token has no permissions claim")]
    MissingPermissionsClaim,

    #[error("token lacks the required permission")]
    InsufficientPermission,

    // Infrastructure, not a client mistake. Kept apart so monitoring can tell
    // "bad token" from "key endpoint is down".
    #[error("signing keys are unavailable: {0}")]
    KeyDirectoryUnavailable(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedToken | Self::MissingPermissionsClaim => StatusCode::BAD_REQUEST,
            Self::InsufficientPermission => StatusCode::FORBIDDEN,
            Self::KeyDirectoryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::MissingAuthorizationHeader
            | Self::MalformedAuthorizationHeader(_)
            | Self::UnknownSigningKey
            | Self::InvalidSignature
            | Self::ExpiredToken
            | Self::InvalidClaims => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAuthorizationHeader => "authorization_header_missing",
            Self::MalformedAuthorizationHeader(_)
            | Self::MalformedToken
            | Self::UnknownSigningKey
            | Self::InvalidSignature => "invalid_header",
            Self::ExpiredToken => "token_expired",
            Self::InvalidClaims | Self::MissingPermissionsClaim => "invalid_claims",
            Self::InsufficientPermission => "unauthorized",
            Self::KeyDirectoryUnavailable(_) => "key_directory_unavailable",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingAuthorizationHeader => "Authorization header is expected.",
            Self::MalformedAuthorizationHeader(HeaderProblem::MissingBearerScheme) => {
                "Authorization header must start with 'Bearer'."
            }
            Self::MalformedAuthorizationHeader(HeaderProblem::NotASingleToken) => {
                "Authorization header must be a bearer token."
            }
            Self::MalformedToken => "Unable to parse authentication token.",
            Self::UnknownSigningKey => "Unable to find the appropriate key.",
            Self::InvalidSignature => "Invalid signature.",
            Self::ExpiredToken => "Token expired.",
            Self::InvalidClaims => "Incorrect claims. Please, check the audience and issuer.",
            Self::MissingPermissionsClaim => "Permissions not included in JWT.",
            Self::InsufficientPermission => "Permission not found.",
            Self::KeyDirectoryUnavailable(_) => "Unable to fetch signing keys.",
        }
    }

    /// True for failures caused by our own dependencies rather than the caller.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::KeyDirectoryUnavailable(_))
    }
}
