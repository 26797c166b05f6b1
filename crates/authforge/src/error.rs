//! Unified error type for the Authforge facade.

use authforge_cache::StoreError;
use authforge_client::ClientError;
use authforge_model::SnapshotError;

/// Top-level error that wraps all crate-specific errors.
///
/// The service operations themselves never return this — the gateway,
/// saga, and cache fold their failures into decisions and outcomes by
/// contract. It exists for callers composing the re-exported clients and
/// stores directly, so one `?`-friendly type covers the whole workspace.
#[derive(Debug, thiserror::Error)]
pub enum AuthforgeError {
    /// A provider/store client error (network, timeout, rejection).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A snapshot codec error (encode, decode, version).
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// A snapshot storage error (read, write).
    #[error(transparent)]
    Store(#[from] StoreError),
}
