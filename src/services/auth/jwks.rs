//! Published signing keys (JWKS) and the immutable key set built from them.
//!
//! Parsing is lenient per entry: a key that is incomplete or unusable is skipped
//! and logged, it never fails the whole document. Only a document without a
//! `keys` array is rejected.

use std::{collections::HashMap, fmt, sync::Arc};

use jsonwebtoken::DecodingKey;
use serde::Deserialize;

/// The only signature algorithm the gate accepts.
pub const SUPPORTED_ALGORITHM: &str = "RS256";

#[derive(Debug, Deserialize)]
pub struct JwksDocument {
    // Entries stay untyped so one odd key cannot poison the rest.
    pub keys: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawJwk {
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    kty: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
    #[serde(default)]
    alg: Option<String>,
    #[serde(default, rename = "use")]
    key_use: Option<String>,
}

/// One RSA public key from the provider's key set.
#[derive(Clone)]
pub struct SigningKey {
    key_id: String,
    key_type: String,
    modulus: String,
    exponent: String,
    algorithm: Option<String>,
    decoding_key: DecodingKey,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("key_type", &self.key_type)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Build an RSA key from base64url modulus and exponent.
    pub fn rsa(
        key_id: impl Into<String>,
        modulus: impl Into<String>,
        exponent: impl Into<String>,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let modulus = modulus.into();
        let exponent = exponent.into();
        let decoding_key = DecodingKey::from_rsa_components(&modulus, &exponent)?;

        Ok(Self {
            key_id: key_id.into(),
            key_type: "RSA".to_string(),
            modulus,
            exponent,
            algorithm: Some(SUPPORTED_ALGORITHM.to_string()),
            decoding_key,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn key_type(&self) -> &str {
        &self.key_type
    }

    pub fn modulus(&self) -> &str {
        &self.modulus
    }

    pub fn exponent(&self) -> &str {
        &self.exponent
    }

    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    fn from_raw(raw: RawJwk) -> Result<Self, &'static str> {
        let (Some(kid), Some(n), Some(e)) = (raw.kid, raw.n, raw.e) else {
            return Err("missing kid, n or e");
        };

        if raw.kty.as_deref().is_some_and(|kty| kty != "RSA") {
            return Err("not an RSA key");
        }
        if raw
            .alg
            .as_deref()
            .is_some_and(|alg| alg != SUPPORTED_ALGORITHM)
        {
            return Err("unsupported alg");
        }
        if raw.key_use.as_deref().is_some_and(|u| u != "sig") {
            return Err("not a signing key");
        }

        let mut key = Self::rsa(kid, n, e).map_err(|_| "invalid RSA components")?;
        key.algorithm = raw.alg;
        Ok(key)
    }
}

/// Snapshot of the provider's keys, indexed by `kid`.
///
/// Never mutated after construction; a refresh builds a new set and swaps it in.
#[derive(Debug)]
pub struct KeySet {
    keys: Vec<Arc<SigningKey>>,
    by_kid: HashMap<String, usize>,
}

impl KeySet {
    pub fn new(keys: impl IntoIterator<Item = SigningKey>) -> Self {
        let mut ordered = Vec::new();
        let mut by_kid = HashMap::new();

        for key in keys {
            // First occurrence of a kid wins.
            if by_kid.contains_key(key.key_id()) {
                tracing::debug!(kid = %key.key_id(), "duplicate kid in key set ignored");
                continue;
            }
            by_kid.insert(key.key_id().to_string(), ordered.len());
            ordered.push(Arc::new(key));
        }

        Self {
            keys: ordered,
            by_kid,
        }
    }

    pub fn from_document(doc: JwksDocument) -> Self {
        let keys = doc.keys.into_iter().filter_map(|value| {
            let raw = match serde_json::from_value::<RawJwk>(value) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable JWK entry");
                    return None;
                }
            };
            let kid = raw.kid.clone();
            match SigningKey::from_raw(raw) {
                Ok(key) => Some(key),
                Err(reason) => {
                    tracing::debug!(kid = ?kid, reason, "skipping unusable JWK entry");
                    None
                }
            }
        });

        Self::new(keys)
    }

    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let doc: JwksDocument = serde_json::from_slice(body)?;
        Ok(Self::from_document(doc))
    }

    pub fn get(&self, kid: &str) -> Option<&Arc<SigningKey>> {
        self.by_kid.get(kid).map(|&idx| &self.keys[idx])
    }

    pub fn keys(&self) -> &[Arc<SigningKey>] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
