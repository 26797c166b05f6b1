//! The cache's observable state and its phase machine.

use authforge_model::{Account, Session};

// ---------------------------------------------------------------------------
// CacheState
// ---------------------------------------------------------------------------

/// What the cache currently believes, plus the two process flags.
///
/// Only `account` and `session` ever reach the persisted snapshot. The
/// flags describe an in-flight process and are reset on every load — a
/// persisted "still loading" or "already hydrated" would block a fresh
/// hydration pass after reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheState {
    /// The cached account snapshot, if any.
    pub account: Option<Account>,
    /// The cached session snapshot, if any.
    pub session: Option<Session>,
    /// An operation is currently in flight.
    pub is_loading: bool,
    /// Hydration has completed (successfully or not) at least once.
    pub is_hydrated: bool,
}

impl CacheState {
    /// The initial state: nothing cached, nothing in flight.
    pub fn cold() -> Self {
        Self::default()
    }

    /// Returns `true` when both an account and a session are cached.
    ///
    /// A cached pair is a *belief*, not proof — revalidate before
    /// trusting it for anything sensitive.
    pub fn is_authenticated(&self) -> bool {
        self.account.is_some() && self.session.is_some()
    }

    /// The current phase of the state machine.
    pub fn phase(&self) -> CachePhase {
        if self.is_loading && !self.is_hydrated {
            return CachePhase::Hydrating;
        }
        if !self.is_hydrated {
            return CachePhase::Cold;
        }
        if self.is_authenticated() {
            CachePhase::Authenticated
        } else {
            CachePhase::Anonymous
        }
    }
}

// ---------------------------------------------------------------------------
// CachePhase
// ---------------------------------------------------------------------------

/// The lifecycle phases of the cache.
///
/// ```text
///   Cold ──(hydrate)──→ Hydrating ──→ Authenticated
///                            │              │
///                            └──────→ Anonymous ←── (logout, from anywhere)
/// ```
///
/// A failed `verify_session` moves *any* phase straight to `Anonymous`
/// without passing through `Hydrating` — invalidation is immediate, not a
/// reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePhase {
    /// Never hydrated; the cache knows nothing yet.
    Cold,

    /// The initial hydration fetch is in flight.
    Hydrating,

    /// Hydrated, with a cached account and session.
    Authenticated,

    /// Hydrated, with no identity (or identity cleared).
    Anonymous,
}

impl std::fmt::Display for CachePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cold => write!(f, "cold"),
            Self::Hydrating => write!(f, "hydrating"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authforge_model::{AccountId, SessionId};
    use chrono::{TimeZone, Utc};

    fn identity() -> (Account, Session) {
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
    fn test_cold_state_phase() {
        assert_eq!(CacheState::cold().phase(), CachePhase::Cold);
    }

    #[test]
    fn test_loading_before_hydration_is_hydrating() {
        let state = CacheState {
            is_loading: true,
            ..CacheState::cold()
        };
        assert_eq!(state.phase(), CachePhase::Hydrating);
    }

    #[test]
    fn test_hydrated_without_identity_is_anonymous() {
        let state = CacheState {
            is_hydrated: true,
            ..CacheState::cold()
        };
        assert_eq!(state.phase(), CachePhase::Anonymous);
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_hydrated_with_identity_is_authenticated() {
        let (account, session) = identity();
        let state = CacheState {
            account: Some(account),
            session: Some(session),
            is_hydrated: true,
            is_loading: false,
        };
        assert_eq!(state.phase(), CachePhase::Authenticated);
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_session_without_account_is_not_authenticated() {
        let (_, session) = identity();
        let state = CacheState {
            session: Some(session),
            is_hydrated: true,
            ..CacheState::cold()
        };
        assert!(!state.is_authenticated());
        assert_eq!(state.phase(), CachePhase::Anonymous);
    }
}
