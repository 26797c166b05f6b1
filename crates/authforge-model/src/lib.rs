//! Core data model for Authforge.
//!
//! This crate defines the vocabulary that every other Authforge crate speaks:
//!
//! - **Types** ([`Account`], [`Session`], [`Profile`], [`CookieSet`], etc.) —
//!   the identity data that flows between the gateway, the saga, and the
//!   session cache.
//! - **Snapshot codec** ([`AuthSnapshot`]) — the versioned blob format used
//!   to persist the client-side view of identity across reloads.
//! - **Errors** ([`SnapshotError`]) — what can go wrong encoding/decoding
//!   a snapshot.
//!
//! # Architecture
//!
//! The model layer sits below everything else. It doesn't know about HTTP,
//! routing, or persistence locations — it only knows the shapes of the data
//! and how the persisted subset of it is serialized.
//!
//! ```text
//! Clients (provider calls) → Model (Account/Session/Profile) → Components
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod error;
mod snapshot;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

// `pub use` flattens the public API so callers write
// `use authforge_model::Account` instead of reaching into submodules.

pub use error::SnapshotError;
pub use snapshot::{AuthSnapshot, SNAPSHOT_VERSION};
pub use types::{
    messages, Account, AccountId, AuthOutcome, CookieSet, NewAccount,
    NewProfile, Profile, Session, SessionId, ACTIVITY_COUNT_MAX,
    BIO_MAX_CHARS, REPUTATION_MAX, SESSION_COOKIE, SESSION_CURRENT,
};
