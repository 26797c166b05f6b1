//! Registration orchestration for Authforge.
//!
//! Creating a user spans two external systems that offer no shared
//! transaction: the identity provider (account, session) and the profile
//! store (profile document). This crate coordinates the three writes as a
//! saga — an explicit ordered step list where every completed step records
//! a compensating action, and the records run in reverse when a later step
//! fails.
//!
//! ```text
//! create_account ──→ create_session ──→ create_profile
//!       │                  │                  │ on failure:
//!       ▼                  ▼                  ▼
//! [RetainAccount]    [DeleteSession]     compensate in
//!  (deliberate        (revoke the        reverse order
//!   no-op, see         auto-login)
//!   below)
//! ```
//!
//! # The retained account
//!
//! When the profile step fails, the session is revoked but the account is
//! *not* rolled back — deleting accounts is the provider's business and a
//! failed delete would strand the user worse than an orphaned account
//! does. The policy is self-heal instead: the login path checks for a
//! missing profile and lazily creates it, and the profile store's unique
//! index arbitrates when two logins race on that creation.

mod saga;

pub use saga::RegistrationSaga;
