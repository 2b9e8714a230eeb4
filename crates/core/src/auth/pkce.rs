//! PKCE (RFC 7636) verifier/challenge/state generation.
//!
//! Detached clients cannot hold a client secret, so the authorization code is
//! bound to a per-attempt verifier instead. Callers request a fresh
//! [`PkceChallenge`] for every authorization attempt; values are never reused.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use pagevault_domain::constants::PKCE_ENTROPY_BYTES;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// A verifier/challenge/state triple for one authorization attempt.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// High-entropy random string, kept secret until the token exchange.
    pub verifier: String,

    /// `base64url(SHA-256(verifier))`, sent in the authorization request.
    pub challenge: String,

    /// Independent random CSRF token echoed back by the provider.
    pub state: String,
}

impl PkceChallenge {
    /// Generate a fresh triple from the OS random source.
    ///
    /// The verifier and state are each 32 random bytes encoded as URL-safe
    /// base64 without padding (43 characters, within RFC 7636's 43-128
    /// bound).
    #[must_use]
    pub fn generate() -> Self {
        let verifier = random_urlsafe();
        let challenge = challenge_for(&verifier);
        let state = random_urlsafe();
        Self { verifier, challenge, state }
    }

    /// The challenge method sent to the provider. Always `S256`; the plain
    /// method defeats the point of PKCE.
    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

/// Compute the S256 challenge for a verifier.
#[must_use]
pub fn challenge_for(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

fn random_urlsafe() -> String {
    let mut bytes = [0u8; PKCE_ENTROPY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
