//! Access-token verification against the provider's published key set.
//!
//! The provider signs access tokens with a rotating key set exposed at
//! `/.well-known/jwks.json`. Verification decodes the token header without
//! trusting it, locates the matching key by `kid`, pins the algorithm to the
//! one the key declares (no algorithm confusion), and checks signature,
//! audience, and subject.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use pagevault_domain::{BridgeError, DecodedAccessToken, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AccessTokenClaims {
    sub: Option<String>,
    aud: serde_json::Value,
    exp: i64,
}

/// Verify `access_token` against `key_set` and return its decoded claims.
///
/// A token is accepted only if its signature verifies against the key whose
/// `kid` matches the token header, the signing algorithm equals the one that
/// key declares, the `aud` claim equals `expected_audience`, and a non-empty
/// `sub` claim is present.
///
/// # Errors
/// - `UnknownKey` when no key in the set matches the token's `kid`
/// - `InvalidSignature` for signature, expiry, or algorithm failures
/// - `AudienceMismatch` when `aud` differs from the configured audience
/// - `MissingSubject` when the `sub` claim is absent or empty
pub fn verify_access_token(
    access_token: &str,
    key_set: &JwkSet,
    expected_audience: &str,
) -> Result<DecodedAccessToken> {
    let header = decode_header(access_token)
        .map_err(|e| BridgeError::InvalidSignature(format!("malformed token header: {e}")))?;

    let header_alg = header.alg;
    let kid = header
        .kid
        .ok_or_else(|| BridgeError::UnknownKey("token header carries no kid".to_string()))?;

    let key = key_set.find(&kid).ok_or_else(|| BridgeError::UnknownKey(kid.clone()))?;

    let declared = key.common.key_algorithm.ok_or_else(|| {
        BridgeError::InvalidSignature(format!("key {kid} declares no algorithm"))
    })?;
    let algorithm = Algorithm::from_str(&declared.to_string()).map_err(|e| {
        BridgeError::InvalidSignature(format!("key {kid} declares unsupported algorithm: {e}"))
    })?;

    // The token must be verified with the algorithm the key declares, never
    // the one the (attacker-controlled) header claims.
    if header_alg != algorithm {
        return Err(BridgeError::InvalidSignature(format!(
            "token algorithm {header_alg:?} does not match key algorithm {algorithm:?}"
        )));
    }

    let decoding_key = DecodingKey::from_jwk(key)
        .map_err(|e| BridgeError::InvalidSignature(format!("unusable key {kid}: {e}")))?;

    let mut validation = Validation::new(algorithm);
    validation.set_audience(&[expected_audience]);
    validation.set_required_spec_claims(&["exp", "aud", "sub"]);

    let data = decode::<AccessTokenClaims>(access_token, &decoding_key, &validation)
        .map_err(|e| map_decode_error(&e))?;

    let subject = match data.claims.sub {
        Some(sub) if !sub.is_empty() => sub,
        _ => return Err(BridgeError::MissingSubject),
    };

    let expiry = DateTime::<Utc>::from_timestamp(data.claims.exp, 0)
        .ok_or_else(|| BridgeError::InvalidSignature("exp claim out of range".to_string()))?;

    Ok(DecodedAccessToken {
        subject,
        audience: audience_string(&data.claims.aud, expected_audience),
        key_id: kid,
        expiry,
    })
}

fn map_decode_error(err: &jsonwebtoken::errors::Error) -> BridgeError {
    match err.kind() {
        ErrorKind::InvalidAudience => BridgeError::AudienceMismatch,
        ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => BridgeError::MissingSubject,
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" => BridgeError::AudienceMismatch,
        _ => BridgeError::InvalidSignature(err.to_string()),
    }
}

/// The `aud` claim may be a single string or an array of strings.
fn audience_string(aud: &serde_json::Value, expected: &str) -> String {
    match aud {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(values) => values
            .iter()
            .filter_map(|v| v.as_str())
            .find(|s| *s == expected)
            .unwrap_or(expected)
            .to_string(),
        _ => expected.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    use super::*;
    use crate::auth::testutil::{generate_keypair, key_set_for, sign_token};

    const AUDIENCE: &str = "https://api.pagevault.dev";

    fn standard_claims() -> serde_json::Value {
        json!({
            "sub": "auth0|user123",
            "aud": AUDIENCE,
            "exp": Utc::now().timestamp() + 3600,
        })
    }

    #[test]
    fn test_accepts_correctly_signed_token() {
        let (pkcs8, public_b64) = generate_keypair();
        let keys = key_set_for(&public_b64, "k1", "EdDSA");
        let token = sign_token(&pkcs8, "k1", standard_claims());

        let decoded = verify_access_token(&token, &keys, AUDIENCE).expect("verifies");
        assert_eq!(decoded.subject, "auth0|user123");
        assert_eq!(decoded.audience, AUDIENCE);
        assert_eq!(decoded.key_id, "k1");
        assert!(decoded.expiry > Utc::now());
    }

    #[test]
    fn test_rejects_unknown_kid() {
        let (pkcs8, public_b64) = generate_keypair();
        let keys = key_set_for(&public_b64, "k1", "EdDSA");
        let token = sign_token(&pkcs8, "rotated-away", standard_claims());

        let err = verify_access_token(&token, &keys, AUDIENCE).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownKey(kid) if kid == "rotated-away"));
    }

    #[test]
    fn test_rejects_missing_kid() {
        let (pkcs8, public_b64) = generate_keypair();
        let keys = key_set_for(&public_b64, "k1", "EdDSA");
        let header = Header::new(Algorithm::EdDSA);
        let token = jsonwebtoken::encode(
            &header,
            &standard_claims(),
            &EncodingKey::from_ed_der(&pkcs8),
        )
        .expect("token encodes");

        assert!(matches!(
            verify_access_token(&token, &keys, AUDIENCE),
            Err(BridgeError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_rejects_audience_mismatch() {
        let (pkcs8, public_b64) = generate_keypair();
        let keys = key_set_for(&public_b64, "k1", "EdDSA");
        let claims = json!({
            "sub": "auth0|user123",
            "aud": "https://some-other-api.example",
            "exp": Utc::now().timestamp() + 3600,
        });
        let token = sign_token(&pkcs8, "k1", claims);

        assert!(matches!(
            verify_access_token(&token, &keys, AUDIENCE),
            Err(BridgeError::AudienceMismatch)
        ));
    }

    #[test]
    fn test_rejects_missing_subject() {
        let (pkcs8, public_b64) = generate_keypair();
        let keys = key_set_for(&public_b64, "k1", "EdDSA");
        let claims = json!({
            "aud": AUDIENCE,
            "exp": Utc::now().timestamp() + 3600,
        });
        let token = sign_token(&pkcs8, "k1", claims);

        assert!(matches!(
            verify_access_token(&token, &keys, AUDIENCE),
            Err(BridgeError::MissingSubject)
        ));
    }

    #[test]
    fn test_rejects_token_signed_with_different_key() {
        let (attacker_pkcs8, _) = generate_keypair();
        let (_, trusted_public) = generate_keypair();
        let keys = key_set_for(&trusted_public, "k1", "EdDSA");
        let token = sign_token(&attacker_pkcs8, "k1", standard_claims());

        assert!(matches!(
            verify_access_token(&token, &keys, AUDIENCE),
            Err(BridgeError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_rejects_algorithm_confusion() {
        let (pkcs8, public_b64) = generate_keypair();
        // Key declares RS256 but the token header says EdDSA.
        let keys = key_set_for(&public_b64, "k1", "RS256");
        let token = sign_token(&pkcs8, "k1", standard_claims());

        assert!(matches!(
            verify_access_token(&token, &keys, AUDIENCE),
            Err(BridgeError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_rejects_expired_token() {
        let (pkcs8, public_b64) = generate_keypair();
        let keys = key_set_for(&public_b64, "k1", "EdDSA");
        let claims = json!({
            "sub": "auth0|user123",
            "aud": AUDIENCE,
            "exp": Utc::now().timestamp() - 120,
        });
        let token = sign_token(&pkcs8, "k1", claims);

        assert!(matches!(
            verify_access_token(&token, &keys, AUDIENCE),
            Err(BridgeError::InvalidSignature(_))
        ));
    }
}
