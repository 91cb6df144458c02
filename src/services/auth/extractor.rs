//! `Authorization: Bearer <token>` header parsing.

use std::fmt;

use axum::http::HeaderValue;

use super::error::{AuthError, HeaderProblem};

const BEARER_PREFIX: &str = "Bearer ";

/// Raw compact token exactly as the client sent it. Not verified.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print credentials
        f.debug_tuple("BearerToken").field(&"<redacted>").finish()
    }
}

/// Pull the bearer token out of the (possibly absent) header value.
///
/// The scheme match is case-sensitive. A value that is not visible ASCII cannot
/// start with the scheme, so it is reported the same way as a wrong scheme.
pub fn extract_bearer(header: Option<&HeaderValue>) -> Result<BearerToken, AuthError> {
    let header = header.ok_or(AuthError::MissingAuthorizationHeader)?;

    let rest = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthError::MalformedAuthorizationHeader(
            HeaderProblem::MissingBearerScheme,
        ))?;

    let mut segments = rest.split_whitespace();
    match (segments.next(), segments.next()) {
        (Some(token), None) => Ok(BearerToken(token.to_string())),
        _ => Err(AuthError::MalformedAuthorizationHeader(
            HeaderProblem::NotASingleToken,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(value: &str) -> Result<BearerToken, AuthError> {
        extract_bearer(Some(&HeaderValue::from_str(value).unwrap()))
    }

    #[test]
    fn missing_header() {
        assert_eq!(
            extract_bearer(None),
            Err(AuthError::MissingAuthorizationHeader)
        );
    }

    #[test]
    fn scheme_must_match_exactly() {
        for value in ["bearer abc", "Basic abc", "Bearerabc", "Token abc.def.ghi", ""] {
            assert_eq!(
                extract(value),
                Err(AuthError::MalformedAuthorizationHeader(
                    HeaderProblem::MissingBearerScheme
                )),
                "{value:?}"
            );
        }
    }

    #[test]
    fn exactly_one_token_after_scheme() {
        for value in ["Bearer ", "Bearer    ", "Bearer a b", "Bearer a.b.c extra"] {
            assert_eq!(
                extract(value),
                Err(AuthError::MalformedAuthorizationHeader(
                    HeaderProblem::NotASingleToken
                )),
                "{value:?}"
            );
        }
    }

    #[test]
    fn token_is_returned_unchanged() {
        let token = extract("Bearer aGVhZA.cGF5bG9hZA.c2ln-_").unwrap();
        assert_eq!(token.as_str(), "aGVhZA.cGF5bG9hZA.c2ln-_");
    }

    #[test]
    fn non_ascii_value_is_a_scheme_error() {
        let value = HeaderValue::from_bytes(b"Bearer \xffabc").unwrap();
        assert_eq!(
            extract_bearer(Some(&value)),
            Err(AuthError::MalformedAuthorizationHeader(
                HeaderProblem::MissingBearerScheme
            ))
        );
    }

    #[test]
    fn debug_output_hides_the_token() {
        let token = extract("Bearer secret.token.value").unwrap();
        assert!(!format!("{token:?}").contains("secret"));
    }
}
