//! Short-lived, per-user store of in-flight authorization attempts.
//!
//! This is the only shared mutable state crossing requests. The original
//! design smuggled these values through a short-lived cookie; an explicit
//! keyed store makes the consume-once and overwrite-on-reattempt invariants
//! testable in isolation.

use chrono::Utc;
use dashmap::DashMap;
use pagevault_domain::{BridgeError, PendingAuthorization, Result};
use tracing::debug;

/// Keyed store of pending authorizations with TTL semantics.
///
/// `put` overwrites any existing record for the user (last put wins — a user
/// starting two attempts in quick succession only completes the most recent
/// one; accepted limitation, not a bug). `take` removes and returns the
/// record in one step so two concurrent callbacks can never consume the same
/// record twice.
#[derive(Debug, Default)]
pub struct PendingAuthorizations {
    records: DashMap<String, PendingAuthorization>,
}

impl PendingAuthorizations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record for `user_key`, overwriting any prior attempt and
    /// restarting the expiry clock.
    pub fn put(&self, user_key: &str, record: PendingAuthorization) {
        if self.records.insert(user_key.to_string(), record).is_some() {
            debug!(user = %user_key, "pending authorization overwritten by newer attempt");
        }
    }

    /// Atomically remove and return the record for `user_key`.
    ///
    /// # Errors
    /// `NoPendingAuthorization` when no record exists, when it was already
    /// consumed, or when it expired. Expired records are dropped on the way
    /// out, never returned.
    pub fn take(&self, user_key: &str) -> Result<PendingAuthorization> {
        let (_, record) = self.records.remove(user_key).ok_or_else(|| {
            BridgeError::NoPendingAuthorization(format!("no record for user {user_key:?}"))
        })?;

        if record.is_expired_at(Utc::now()) {
            return Err(BridgeError::NoPendingAuthorization(format!(
                "record for user {user_key:?} expired"
            )));
        }

        Ok(record)
    }

    /// Number of live (possibly expired but not yet reaped) records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
