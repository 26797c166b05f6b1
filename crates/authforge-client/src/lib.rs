//! Client seams for Authforge's external collaborators.
//!
//! Authforge doesn't implement authentication or document storage itself —
//! that's the identity provider's and the profile store's job. This crate
//! defines the two traits the rest of the stack talks through, plus the
//! implementations that exist today:
//!
//! - [`IdentityProvider`] / [`ProfileStore`] — the trait seams.
//! - `http`-feature implementations — REST clients over `reqwest`, every
//!   call wrapped in a bounded timeout with a single transient retry
//!   ([`CallPolicy`]).
//! - [`memory`] implementations — in-process doubles for development and
//!   tests, with failure injection.
//!
//! # Why traits?
//!
//! The gateway, the saga, and the session cache all need to call the
//! provider, but none of them should care whether it's a REST service, a
//! local double, or a mock counting calls in a test. A trait seam gives
//! each consumer exactly the operations it uses and nothing else.
//!
//! # Feature Flags
//!
//! - `http` (default) — REST implementations via `reqwest`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "http")]
mod http;
pub mod memory;
mod policy;

pub use error::ClientError;
#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpIdentityProvider, HttpProfileStore};
pub use policy::{call_with_policy, CallPolicy};

use authforge_model::{
    Account, AccountId, CookieSet, NewAccount, NewProfile, Profile, Session,
};

/// The external identity provider: system of record for accounts and
/// sessions.
///
/// ## Trait bounds
///
/// - `Send + Sync` → one provider client is shared across async tasks.
/// - `'static` → it owns its data and lives as long as the application.
///
/// ## Contract for implementations
///
/// Every method is an outbound call to an external system and must be
/// bounded: implementations over a network apply a [`CallPolicy`] (timeout
/// plus a single retry on transient failures). Callers additionally treat
/// *any* error as "not authenticated" where the distinction would leak
/// information.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Creates a new account.
    ///
    /// # Errors
    /// - [`ClientError::DuplicateAccount`] — the email is already registered.
    /// - [`ClientError::Network`] / [`ClientError::Timeout`] — provider
    ///   unreachable.
    async fn create_account(
        &self,
        new_account: &NewAccount,
    ) -> Result<Account, ClientError>;

    /// Creates a session for the given credentials (logs the user in).
    ///
    /// # Errors
    /// Returns [`ClientError::SessionInvalid`] when the credentials are
    /// rejected. Callers must not surface which part was wrong.
    async fn create_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError>;

    /// Returns the account the given credentials authenticate as.
    ///
    /// This is the verification primitive: the provider checks that the
    /// session behind the credentials exists, hasn't expired, and wasn't
    /// tampered with. A success is the only acceptable proof of identity.
    async fn get_current_account(
        &self,
        credentials: &CookieSet,
    ) -> Result<Account, ClientError>;

    /// Fetches a session by id. [`SESSION_CURRENT`] selects the session
    /// carried by `credentials`.
    ///
    /// [`SESSION_CURRENT`]: authforge_model::SESSION_CURRENT
    async fn get_session(
        &self,
        credentials: &CookieSet,
        session_id: &str,
    ) -> Result<Session, ClientError>;

    /// Deletes (revokes) a session. [`SESSION_CURRENT`] selects the session
    /// carried by `credentials`.
    ///
    /// [`SESSION_CURRENT`]: authforge_model::SESSION_CURRENT
    async fn delete_session(
        &self,
        credentials: &CookieSet,
        session_id: &str,
    ) -> Result<(), ClientError>;
}

/// The external document store holding per-account profile data.
///
/// One profile per account. The store — not the caller — enforces that
/// invariant, through a unique index on the account id; concurrent creators
/// race and the loser receives [`ClientError::Validation`].
pub trait ProfileStore: Send + Sync + 'static {
    /// Returns all profile documents for the given account id.
    ///
    /// With the unique index in place this is zero or one document, but
    /// the operation reports what the store actually holds.
    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Profile>, ClientError>;

    /// Creates a profile document. The store assigns the document id.
    ///
    /// # Errors
    /// Returns [`ClientError::Validation`] when the document violates field
    /// bounds or the one-profile-per-account index.
    async fn create(
        &self,
        new_profile: NewProfile,
    ) -> Result<Profile, ClientError>;
}
