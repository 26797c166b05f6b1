//! Error taxonomy for calls to the external collaborators.

use std::time::Duration;

/// Errors that can occur calling the identity provider or profile store.
///
/// The variants deliberately mirror how callers react, not how the wire
/// failed: the gateway folds everything into "unauthenticated", the saga
/// distinguishes only the duplicate account, and the retry policy looks at
/// [`is_transient`](Self::is_transient) alone.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The collaborator could not be reached, or answered with a server
    /// fault. Retried once by the call policy.
    #[error("provider unreachable: {0}")]
    Network(String),

    /// The call exceeded its bounded timeout. Retried once by the call
    /// policy.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// Account creation was rejected because the email is taken. The only
    /// failure the registration saga reports specifically.
    #[error("an account with this email is already registered")]
    DuplicateAccount,

    /// The credentials or session were rejected — missing, expired,
    /// tampered with, or wrong. Callers never learn which.
    #[error("session missing, expired, or rejected")]
    SessionInvalid,

    /// The collaborator rejected a write (field bounds, unique index, or a
    /// malformed request).
    #[error("request rejected: {0}")]
    Validation(String),
}

impl ClientError {
    /// Returns `true` for failures worth one more attempt.
    ///
    /// A rejection is deterministic — retrying a duplicate email or an
    /// invalid session only repeats the answer — so only reachability
    /// failures qualify.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}
