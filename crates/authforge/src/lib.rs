//! # Authforge
//!
//! The identity core of a Q&A platform: who is logged in, and how the
//! three views of that question are kept consistent — the per-request
//! **gateway**, the **registration saga** spanning the identity provider
//! and the profile store, and the client-side **session cache**.
//!
//! The external collaborators (identity provider, profile store) sit
//! behind the trait seams in `authforge-client`; everything here
//! orchestrates on top of them, fails closed, and never trusts a cookie
//! it hasn't verified.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use authforge::prelude::*;
//!
//! # async fn run() {
//! let provider = Arc::new(MemoryIdentityProvider::new());
//! let profiles = Arc::new(MemoryProfileStore::new());
//!
//! let mut service = AuthServiceBuilder::new()
//!     .build(provider, profiles, MemorySnapshotStore::new())
//!     .await;
//!
//! // Per-request decisions:
//! let decision = service
//!     .evaluate("/questions/42", &CookieSet::new())
//!     .await;
//! assert!(matches!(decision, Decision::RedirectTo(_)));
//!
//! // New-user flow:
//! let outcome = service
//!     .register(&NewAccount {
//!         email: "ada@example.com".into(),
//!         password: "correct horse".into(),
//!         name: "Ada".into(),
//!     })
//!     .await;
//! assert!(outcome.success);
//! # }
//! ```

mod error;
mod service;

pub use error::AuthforgeError;
pub use service::{AuthService, AuthServiceBuilder};

/// The common vocabulary, re-exported in one place.
pub mod prelude {
    pub use crate::{AuthService, AuthServiceBuilder, AuthforgeError};

    pub use authforge_cache::{
        CachePhase, CacheState, FileSnapshotStore, MemorySnapshotStore,
        SessionCache, SnapshotStore, StoreError,
    };
    pub use authforge_client::memory::{
        MemoryIdentityProvider, MemoryProfileStore,
    };
    #[cfg(feature = "http")]
    pub use authforge_client::{
        HttpConfig, HttpIdentityProvider, HttpProfileStore,
    };
    pub use authforge_client::{
        CallPolicy, ClientError, IdentityProvider, ProfileStore,
    };
    pub use authforge_gateway::{
        Decision, Gateway, GatewayConfig, RouteClass, RoutePattern,
        RouteTable,
    };
    pub use authforge_model::{
        messages, Account, AccountId, AuthOutcome, AuthSnapshot, CookieSet,
        NewAccount, NewProfile, Profile, Session, SessionId,
    };
    pub use authforge_saga::RegistrationSaga;
}
