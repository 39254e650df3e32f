//! Local, unverified inspection of provider access tokens.
//!
//! The provider remains the authority on validity. Reading `exp` locally only
//! lets the resolver skip an introspection round-trip that is bound to fail.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Seconds of clock skew tolerated before a token counts as expired locally.
pub const EXPIRY_LEEWAY_SECS: i64 = 30;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Read the `exp` claim without verifying the signature.
///
/// Returns `None` when the token is not a JWT or carries no `exp`.
pub fn peek_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims
        .exp
        .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0))
}

/// Whether the token is past its `exp` (minus leeway) at `now`.
///
/// Opaque tokens without a readable `exp` are not considered expired; the
/// provider decides.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match peek_expiry(token) {
        Some(exp) => exp + Duration::seconds(EXPIRY_LEEWAY_SECS) <= now,
        None => false,
    }
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}
