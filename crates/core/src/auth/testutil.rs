//! Test helpers for minting signed access tokens and matching key sets.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::SigningKey;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rand_core::OsRng;
use serde_json::json;

/// Fresh Ed25519 key pair: (PKCS#8 DER private key, base64url public key).
pub(crate) fn generate_keypair() -> (Vec<u8>, String) {
    let signing_key = SigningKey::generate(&mut OsRng);
    let public_b64 = URL_SAFE_NO_PAD.encode(signing_key.verifying_key().to_bytes());

    // Minimal PKCS#8 v1 wrapper around the raw Ed25519 seed.
    let mut pkcs8 = vec![
        0x30, 0x2e, // SEQUENCE, 46 bytes
        0x02, 0x01, 0x00, // INTEGER version 0
        0x30, 0x05, // SEQUENCE, 5 bytes (algorithm identifier)
        0x06, 0x03, 0x2b, 0x65, 0x70, // OID 1.3.101.112 (Ed25519)
        0x04, 0x22, // OCTET STRING, 34 bytes
        0x04, 0x20, // OCTET STRING, 32 bytes (the seed)
    ];
    pkcs8.extend_from_slice(&signing_key.to_bytes());

    (pkcs8, public_b64)
}

/// A one-key JWK set holding the given Ed25519 public key.
pub(crate) fn key_set_for(public_b64: &str, kid: &str, alg: &str) -> JwkSet {
    serde_json::from_value(json!({
        "keys": [{
            "kty": "OKP",
            "crv": "Ed25519",
            "x": public_b64,
            "kid": kid,
            "alg": alg,
            "use": "sig",
        }]
    }))
    .expect("valid JWK set")
}

/// Sign an EdDSA token with the given `kid` header and claims.
pub(crate) fn sign_token(pkcs8: &[u8], kid: &str, claims: serde_json::Value) -> String {
    let mut header = Header::new(Algorithm::EdDSA);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_ed_der(pkcs8);
    jsonwebtoken::encode(&header, &claims, &key).expect("token encodes")
}
