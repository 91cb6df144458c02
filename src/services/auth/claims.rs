//! Verified token claims and the rules that turn a raw payload into them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::AuthError;

/// Claims of a token whose signature, expiry, audience and issuer all checked out.
///
/// `permissions` is `None` when the claim is absent and `Some(empty)` when the
/// token carries an empty list; the two are rejected differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub issuer: String,
    pub subject: Option<String>,
    pub audience: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
    pub permissions: Option<BTreeSet<String>>,
}

/// What a verifier expects from every token.
#[derive(Debug, Clone)]
pub struct ClaimsPolicy {
    pub issuer: String,
    pub audience: String,
    // Allowed clock skew for exp/nbf, seconds.
    pub leeway_seconds: u64,
}

// `aud` is either a single string or an array of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn into_vec(self) -> Vec<String> {
        match self {
            Audience::One(aud) => vec![aud],
            Audience::Many(auds) => auds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    aud: Option<Audience>,
    exp: i64,
    #[serde(default)]
    nbf: Option<i64>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    permissions: Option<BTreeSet<String>>,
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, AuthError> {
    DateTime::from_timestamp(secs, 0).ok_or(AuthError::InvalidClaims)
}

/// Validate a signature-checked payload at instant `now`.
///
/// Expiry is judged first so an expired token reports `token_expired` whatever
/// else is wrong with it.
pub(crate) fn validate(
    payload: serde_json::Value,
    policy: &ClaimsPolicy,
    now: DateTime<Utc>,
) -> Result<Claims, AuthError> {
    let leeway = i64::try_from(policy.leeway_seconds).unwrap_or(i64::MAX);
    let now = now.timestamp();

    let exp = payload
        .get("exp")
        .and_then(serde_json::Value::as_i64)
        .ok_or(AuthError::InvalidClaims)?;
    if exp.saturating_add(leeway) <= now {
        return Err(AuthError::ExpiredToken);
    }

    let raw: RawClaims = serde_json::from_value(payload).map_err(|_| AuthError::InvalidClaims)?;

    if raw.nbf.is_some_and(|nbf| nbf > now.saturating_add(leeway)) {
        return Err(AuthError::InvalidClaims);
    }

    let issuer = raw
        .iss
        .filter(|iss| *iss == policy.issuer)
        .ok_or(AuthError::InvalidClaims)?;

    let audience = raw.aud.map(Audience::into_vec).unwrap_or_default();
    if !audience.iter().any(|aud| *aud == policy.audience) {
        return Err(AuthError::InvalidClaims);
    }

    Ok(Claims {
        issuer,
        subject: raw.sub,
        audience,
        expires_at: timestamp(raw.exp)?,
        issued_at: raw.iat.map(timestamp).transpose()?,
        permissions: raw.permissions,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ISSUER: &str = "https://casting.example.auth0.com/";
    const AUDIENCE: &str = "casting-agency";

    fn policy(leeway_seconds: u64) -> ClaimsPolicy {
        ClaimsPolicy {
            issuer: ISSUER.into(),
            audience: AUDIENCE.into(),
            leeway_seconds,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn payload() -> serde_json::Value {
        json!({
            "iss": ISSUER,
            "sub": "auth0|producer",
            "aud": [AUDIENCE, "https://casting.example.auth0.com/userinfo"],
            "iat": 1_699_990_000,
            "exp": 1_700_003_600,
            "permissions": ["get:movies", "get:actors", "get:movies"]
        })
    }

    #[test]
    fn accepts_matching_claims() {
        let claims = validate(payload(), &policy(0), now()).unwrap();

        assert_eq!(claims.subject.as_deref(), Some("auth0|producer"));
        assert_eq!(claims.expires_at.timestamp(), 1_700_003_600);
        assert_eq!(claims.issued_at.unwrap().timestamp(), 1_699_990_000);
        let permissions = claims.permissions.unwrap();
        assert_eq!(permissions.len(), 2);
        assert!(permissions.contains("get:actors"));
    }

    #[test]
    fn single_string_audience() {
        let mut p = payload();
        p["aud"] = json!(AUDIENCE);
        assert_eq!(
            validate(p, &policy(0), now()).unwrap().audience,
            vec![AUDIENCE.to_string()]
        );
    }

    #[test]
    fn expiry_is_strict_and_reported_first() {
        let mut p = payload();
        p["exp"] = json!(now().timestamp());
        assert_eq!(
            validate(p.clone(), &policy(0), now()),
            Err(AuthError::ExpiredToken)
        );

        // Wrong issuer does not mask the expiry.
        p["iss"] = json!("https://evil.example.com/");
        assert_eq!(validate(p, &policy(0), now()), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn leeway_tolerates_small_skew() {
        let mut p = payload();
        p["exp"] = json!(now().timestamp() - 10);
        assert!(validate(p.clone(), &policy(30), now()).is_ok());
        assert_eq!(validate(p, &policy(5), now()), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn other_claim_failures_are_invalid_claims() {
        let cases = [
            ("iss", json!("https://other.example.com/")),
            ("iss", json!(null)),
            ("aud", json!("someone-else")),
            ("aud", json!(["a", "b"])),
            ("aud", json!(7)),
            ("iat", json!("yesterday")),
            ("nbf", json!(now().timestamp() + 600)),
            ("permissions", json!("get:movies")),
            ("exp", json!("tomorrow")),
        ];

        for (field, value) in cases {
            let mut p = payload();
            p[field] = value.clone();
            assert_eq!(
                validate(p, &policy(0), now()),
                Err(AuthError::InvalidClaims),
                "{field} = {value}"
            );
        }
    }

    #[test]
    fn missing_audience_or_exp_is_invalid() {
        for field in ["aud", "exp", "iss"] {
            let mut p = payload();
            p.as_object_mut().unwrap().remove(field);
            assert_eq!(
                validate(p, &policy(0), now()),
                Err(AuthError::InvalidClaims),
                "{field}"
            );
        }
    }

    #[test]
    fn absent_and_empty_permissions_differ() {
        let mut p = payload();
        p.as_object_mut().unwrap().remove("permissions");
        assert_eq!(validate(p, &policy(0), now()).unwrap().permissions, None);

        let mut p = payload();
        p["permissions"] = json!([]);
        assert_eq!(
            validate(p, &policy(0), now()).unwrap().permissions,
            Some(BTreeSet::new())
        );
    }
}
