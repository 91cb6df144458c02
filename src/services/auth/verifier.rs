//! RS256 token verification against keys from the [`KeyDirectory`].

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};

use super::{
    claims::{self, Claims, ClaimsPolicy},
    error::AuthError,
    extractor::BearerToken,
    jwks::SigningKey,
    key_directory::KeyDirectory,
};

/// Untrusted header fields, read before the signature is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHeader {
    pub algorithm: Algorithm,
    pub key_id: String,
}

/// Split the compact token and read its header without trusting anything.
///
/// Rejects anything that is not three base64url segments with an RS256 header
/// naming a `kid`. Symmetric and `none` algorithms never get past this point.
pub fn decode_header(token: &BearerToken) -> Result<DecodedHeader, AuthError> {
    let segments: Vec<&str> = token.as_str().split('.').collect();
    let [header, payload, signature] = segments.as_slice() else {
        return Err(AuthError::MalformedToken);
    };
    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    if URL_SAFE_NO_PAD.decode(payload).is_err() || URL_SAFE_NO_PAD.decode(signature).is_err() {
        return Err(AuthError::MalformedToken);
    }

    let header =
        jsonwebtoken::decode_header(token.as_str()).map_err(|_| AuthError::MalformedToken)?;

    if header.alg != Algorithm::RS256 {
        return Err(AuthError::MalformedToken);
    }

    let key_id = header
        .kid
        .filter(|kid| !kid.is_empty())
        .ok_or(AuthError::MalformedToken)?;

    Ok(DecodedHeader {
        algorithm: header.alg,
        key_id,
    })
}

pub struct TokenVerifier {
    keys: Arc<KeyDirectory>,
    policy: ClaimsPolicy,
    // Signature-only validation; claims are checked by `claims::validate`.
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("keys", &self.keys)
            .field("policy", &self.policy)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyDirectory>, policy: ClaimsPolicy) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            keys,
            policy,
            validation,
        }
    }

    pub fn policy(&self) -> &ClaimsPolicy {
        &self.policy
    }

    pub fn keys(&self) -> &Arc<KeyDirectory> {
        &self.keys
    }

    /// Verify `token` and return its claims.
    ///
    /// The clock is read after key resolution, which may have waited on a fetch.
    pub async fn verify(&self, token: &BearerToken) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        let key = self.keys.resolve(&header.key_id).await?;
        self.verify_with_key(token, &key, Utc::now())
    }

    /// Verify `token` with an already resolved key at instant `now`.
    pub fn verify_with_key(
        &self,
        token: &BearerToken,
        key: &SigningKey,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        if header.key_id != key.key_id() {
            return Err(AuthError::UnknownSigningKey);
        }

        let data = jsonwebtoken::decode::<serde_json::Value>(
            token.as_str(),
            key.decoding_key(),
            &self.validation,
        )
        .map_err(|err| match err.kind() {
            // Signature was fine; the payload is not a JSON object.
            ErrorKind::Json(_) | ErrorKind::Utf8(_) => AuthError::InvalidClaims,
            // Structure and header were checked above, so whatever is left is
            // the signature failing to verify.
            _ => AuthError::InvalidSignature,
        })?;

        claims::validate(data.claims, &self.policy, now)
    }
}
