//! Error types for the model layer.
//!
//! Each crate in Authforge defines its own error enum. A `SnapshotError`
//! always means the persisted identity blob could not be produced or
//! understood — never a provider or storage problem.

/// Errors that can occur encoding or decoding an [`AuthSnapshot`].
///
/// [`AuthSnapshot`]: crate::AuthSnapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Serialization failed (turning the snapshot into bytes).
    #[error("snapshot encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed — malformed JSON, missing fields, or a blob
    /// that was never a snapshot to begin with.
    #[error("snapshot decode failed: {0}")]
    Decode(serde_json::Error),

    /// The blob is a snapshot, but from a format version this build does
    /// not understand. The caller should discard it and start cold.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}
