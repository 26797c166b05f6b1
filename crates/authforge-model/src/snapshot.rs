//! The persisted-snapshot codec: what survives a reload, and nothing else.
//!
//! The session cache keeps four fields in memory but only two of them are
//! safe to persist: the account and session snapshots. The loading and
//! hydration flags describe an *in-flight process*, and persisting them
//! would let a stale "still loading" or "already hydrated" flag block a
//! fresh hydration pass after reload.
//!
//! Rather than serializing the cache state and filtering fields, this
//! module defines a dedicated [`AuthSnapshot`] type that whitelists exactly
//! what is persisted, with an explicit format version for forward
//! compatibility. The cache state shape can evolve freely without touching
//! blobs already on disk.

use serde::{Deserialize, Serialize};

use crate::{Account, Session, SnapshotError};

/// The current snapshot format version.
///
/// Bump this when the persisted shape changes; [`AuthSnapshot::decode`]
/// rejects versions it does not know, and the cache then starts cold.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The versioned blob persisted by the session cache.
///
/// Contains exactly `{ version, account, session }`. Both identity fields
/// are optional because an anonymous state is also worth persisting — it
/// lets a reload skip straight to "no session" without guessing.
///
/// ## Example
///
/// ```rust
/// use authforge_model::AuthSnapshot;
///
/// let snapshot = AuthSnapshot::capture(&None, &None);
/// let bytes = snapshot.encode().unwrap();
/// let restored = AuthSnapshot::decode(&bytes).unwrap();
/// assert_eq!(restored.account, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    /// Format version, always [`SNAPSHOT_VERSION`] for blobs this build
    /// writes.
    pub version: u32,
    /// The cached account, if any.
    pub account: Option<Account>,
    /// The cached session, if any. Contains the session secret, so the
    /// blob must be stored with the same care as a cookie jar.
    pub session: Option<Session>,
}

impl AuthSnapshot {
    /// Captures the persistable subset of the cache state.
    pub fn capture(
        account: &Option<Account>,
        session: &Option<Session>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            account: account.clone(),
            session: session.clone(),
        }
    }

    /// Serializes the snapshot to bytes.
    ///
    /// # Errors
    /// Returns [`SnapshotError::Encode`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        serde_json::to_vec(self).map_err(SnapshotError::Encode)
    }

    /// Deserializes a snapshot from bytes.
    ///
    /// # Errors
    /// - [`SnapshotError::Decode`] — the bytes are not a snapshot.
    /// - [`SnapshotError::UnsupportedVersion`] — a snapshot from a format
    ///   this build does not know.
    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_slice(bytes).map_err(SnapshotError::Decode)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountId, SessionId};
    use chrono::{TimeZone, Utc};

    fn sample_identity() -> (Account, Session) {
        let account = Account {
            id: AccountId::new("u_1"),
            email: "a@example.com".into(),
            name: "A".into(),
        };
        let session = Session {
            id: SessionId::new("s_1"),
            account_id: account.id.clone(),
            provider: "email".into(),
            secret: "sek".into(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            expires_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        };
        (account, session)
    }

    #[test]
    fn test_capture_encode_decode_round_trip() {
        let (account, session) = sample_identity();
        let snapshot =
            AuthSnapshot::capture(&Some(account), &Some(session));

        let bytes = snapshot.encode().unwrap();
        let decoded = AuthSnapshot::decode(&bytes).unwrap();

        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn test_capture_anonymous_state_round_trip() {
        let snapshot = AuthSnapshot::capture(&None, &None);
        let bytes = snapshot.encode().unwrap();
        let decoded = AuthSnapshot::decode(&bytes).unwrap();
        assert_eq!(decoded.account, None);
        assert_eq!(decoded.session, None);
    }

    #[test]
    fn test_blob_contains_exactly_the_whitelisted_fields() {
        // The whitelist is the point of this codec: no loading flags, no
        // future cache internals, nothing but the three known keys.
        let (account, session) = sample_identity();
        let bytes = AuthSnapshot::capture(&Some(account), &Some(session))
            .encode()
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&bytes).unwrap();
        let obj = value.as_object().unwrap();

        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["account", "session", "version"]);
    }

    #[test]
    fn test_decode_unknown_version_is_rejected() {
        let json = r#"{"version": 99, "account": null, "session": null}"#;
        let result = AuthSnapshot::decode(json.as_bytes());
        assert!(matches!(
            result,
            Err(SnapshotError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result = AuthSnapshot::decode(b"not a snapshot");
        assert!(matches!(result, Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_shape_returns_decode_error() {
        // Valid JSON, but missing the version field entirely.
        let result = AuthSnapshot::decode(br#"{"account": null}"#);
        assert!(matches!(result, Err(SnapshotError::Decode(_))));
    }
}
