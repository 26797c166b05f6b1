//! Core identity types shared across the Authforge stack.
//!
//! Everything in this module either comes from the identity provider
//! (accounts, sessions), lives in the profile store (profiles), or travels
//! with a request (cookie sets). The provider is the system of record for
//! all of it — values held here are snapshots, never proof of validity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for an identity account.
///
/// Newtype over the provider's opaque id string. Wrapping it keeps an
/// `AccountId` from being confused with a `SessionId` (or any other string)
/// in a signature, even though both are strings underneath.
///
/// `#[serde(transparent)]` serializes this as the bare string, so an
/// `AccountId("u_1")` is just `"u_1"` on the wire and in snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    /// Creates an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a `&str` for building requests and log fields.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a provider-issued session.
///
/// Same newtype pattern as [`AccountId`]. The provider also accepts the
/// [`SESSION_CURRENT`] alias in place of a concrete id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Creates an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alias the identity provider accepts in place of a concrete session id,
/// meaning "the session carried by the credentials on this request".
pub const SESSION_CURRENT: &str = "current";

/// Name of the cookie that carries a session secret.
pub const SESSION_COOKIE: &str = "af_session";

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// An identity account, as reported by the identity provider.
///
/// Owned and mutated exclusively by the provider. Authforge creates one at
/// registration and otherwise only reads it; deletion is out of scope here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The provider-assigned opaque id.
    pub id: AccountId,
    /// The email the account was registered with.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// The request payload for creating a new account.
///
/// The password only ever flows *toward* the provider — it is never stored,
/// logged, or echoed back by any Authforge component.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A provider-issued proof of authentication, time-bounded and revocable.
///
/// A `Session` held here is a *snapshot*. Whether it is still valid is
/// authoritative only at the identity provider — the session cache must
/// revalidate before treating one as proof for anything security-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The provider-assigned session id.
    pub id: SessionId,
    /// The account this session belongs to.
    pub account_id: AccountId,
    /// Which login mechanism issued the session (e.g. `"email"`).
    pub provider: String,
    /// Bearer value placed in the [`SESSION_COOKIE`] cookie.
    ///
    /// The provider returns this once, at session creation. Anyone holding
    /// it can act as the session, so it never appears in logs.
    pub secret: String,
    /// When the provider issued the session.
    pub created_at: DateTime<Utc>,
    /// When the provider will stop honoring the session.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns `true` if the session's expiry has passed at `now`.
    ///
    /// Only a hint for display purposes — the provider may have revoked a
    /// session long before its expiry, so this must never gate access.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Maximum length of a profile bio, in characters.
pub const BIO_MAX_CHARS: usize = 500;

/// Maximum reputation value the store accepts.
pub const REPUTATION_MAX: u32 = 1_000_000;

/// Maximum value for the per-profile activity counters.
pub const ACTIVITY_COUNT_MAX: u32 = 100_000;

/// Application-specific profile data, keyed by account id.
///
/// Lives in the profile store, not at the identity provider. Exactly one
/// profile should exist per account; that uniqueness is enforced by a
/// store-level unique index on `account_id`, not by any orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The store-assigned document id.
    pub id: String,
    /// The owning identity account.
    pub account_id: AccountId,
    /// Reputation score, non-negative, starts at 0.
    pub reputation: u32,
    /// Optional bio, at most [`BIO_MAX_CHARS`] characters.
    pub bio: Option<String>,
    /// Optional reference to an avatar in the (out-of-scope) media store.
    pub avatar_id: Option<String>,
    /// How many questions this account has asked.
    pub questions_asked: u32,
    /// How many answers this account has given.
    pub answers_given: u32,
}

/// The fields for creating a profile document (the store assigns the id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    pub account_id: AccountId,
    pub reputation: u32,
    pub bio: Option<String>,
    pub avatar_id: Option<String>,
    pub questions_asked: u32,
    pub answers_given: u32,
}

impl NewProfile {
    /// The default profile written during registration or lazily on login:
    /// zero reputation, zero activity, no bio, no avatar.
    pub fn for_account(account_id: AccountId) -> Self {
        Self {
            account_id,
            reputation: 0,
            bio: None,
            avatar_id: None,
            questions_asked: 0,
            answers_given: 0,
        }
    }

    /// Checks the store-level field bounds.
    ///
    /// Store implementations call this before writing so that a rejected
    /// document fails the same way everywhere.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(bio) = &self.bio {
            if bio.chars().count() > BIO_MAX_CHARS {
                return Err(format!("bio exceeds {BIO_MAX_CHARS} characters"));
            }
        }
        if self.reputation > REPUTATION_MAX {
            return Err(format!("reputation exceeds {REPUTATION_MAX}"));
        }
        if self.questions_asked > ACTIVITY_COUNT_MAX
            || self.answers_given > ACTIVITY_COUNT_MAX
        {
            return Err(format!(
                "activity counter exceeds {ACTIVITY_COUNT_MAX}"
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CookieSet
// ---------------------------------------------------------------------------

/// The cookies accompanying a request, in arrival order.
///
/// This is untrusted client input: a cookie set can be forged, stale, or
/// empty, and nothing in it proves authentication. Components forward it to
/// the identity provider, which is the only party that can judge it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSet {
    cookies: Vec<(String, String)>,
}

impl CookieSet {
    /// An empty cookie set (an unauthenticated request).
    pub fn new() -> Self {
        Self::default()
    }

    /// A cookie set carrying a single session secret under
    /// [`SESSION_COOKIE`] — the shape the session cache sends.
    pub fn for_session(secret: &str) -> Self {
        let mut set = Self::new();
        set.push(SESSION_COOKIE, secret);
        set
    }

    /// Appends a cookie.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.push((name.into(), value.into()));
    }

    /// Returns the value of the first cookie with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if no cookies are present.
    ///
    /// An empty set can never represent a valid session, so callers use
    /// this to skip the provider round-trip entirely.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Renders the `Cookie` request-header value (`name=value; name=value`),
    /// or `None` when the set is empty.
    pub fn header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(n, v)| format!("{n}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for CookieSet {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Self {
            cookies: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthOutcome
// ---------------------------------------------------------------------------

/// The structured result of a registration/login/logout operation.
///
/// Operations that face the user never let an error escape — they fold every
/// failure into one of these, with a message that is deliberately generic
/// for any cause that could reveal whether an account exists or which
/// internal stage failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    /// Whether the operation succeeded.
    pub success: bool,
    /// User-facing message (see [`messages`]).
    pub message: String,
    /// The account produced by the operation, when one exists.
    pub account: Option<Account>,
    /// The session produced by the operation, when one exists.
    pub session: Option<Session>,
}

impl AuthOutcome {
    /// A successful outcome with no attached identity.
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            account: None,
            session: None,
        }
    }

    /// A failed outcome. Never carries identity data.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            account: None,
            session: None,
        }
    }

    /// Attaches the account and session established by the operation.
    pub fn with_identity(mut self, account: Account, session: Session) -> Self {
        self.account = Some(account);
        self.session = Some(session);
        self
    }
}

/// User-facing messages for auth operations.
///
/// The failure messages are intentionally vague: one message for all login
/// failures (no account-existence oracle) and one for all registration
/// failures except the duplicate email, which the provider already confirms
/// to the owner of that address by rejecting the signup.
pub mod messages {
    pub const REGISTRATION_OK: &str = "Registration successful.";
    pub const REGISTRATION_FAILED: &str =
        "Registration failed. Please try again.";
    pub const DUPLICATE_EMAIL: &str =
        "An account with this email already exists.";
    pub const PROFILE_CREATE_FAILED: &str =
        "Failed to create profile, please contact support.";
    pub const LOGIN_OK: &str = "Login successful.";
    pub const LOGIN_FAILED: &str =
        "Invalid email or password. Please try again.";
    pub const LOGOUT_OK: &str = "Logout successful.";
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Tests for the core types and their serialized shapes.
    //!
    //! Snapshots written by one build must be readable by the next, so the
    //! JSON shapes here are contract tests, not implementation details.

    use super::*;
    use chrono::TimeZone;

    fn sample_session() -> Session {
        Session {
            id: SessionId::new("s_1"),
            account_id: AccountId::new("u_1"),
            provider: "email".into(),
            secret: "top-secret".into(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            expires_at: Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap(),
        }
    }

    // =====================================================================
    // Identity ids
    // =====================================================================

    #[test]
    fn test_account_id_serializes_as_plain_string() {
        // `#[serde(transparent)]` means AccountId("u_1") → `"u_1"`,
        // not `{"0":"u_1"}`.
        let json = serde_json::to_string(&AccountId::new("u_1")).unwrap();
        assert_eq!(json, "\"u_1\"");
    }

    #[test]
    fn test_account_id_deserializes_from_plain_string() {
        let id: AccountId = serde_json::from_str("\"u_9\"").unwrap();
        assert_eq!(id, AccountId::new("u_9"));
    }

    #[test]
    fn test_session_id_display_prints_inner_value() {
        assert_eq!(SessionId::new("s_42").to_string(), "s_42");
    }

    // =====================================================================
    // Session
    // =====================================================================

    #[test]
    fn test_session_round_trip() {
        let session = sample_session();
        let bytes = serde_json::to_vec(&session).unwrap();
        let decoded: Session = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(session, decoded);
    }

    #[test]
    fn test_session_is_expired_at_boundary() {
        let session = sample_session();
        let before = Utc.with_ymd_and_hms(2024, 5, 31, 11, 59, 59).unwrap();
        let at = session.expires_at;
        assert!(!session.is_expired_at(before));
        assert!(session.is_expired_at(at), "expiry instant counts as expired");
    }

    // =====================================================================
    // NewProfile
    // =====================================================================

    #[test]
    fn test_new_profile_for_account_has_zeroed_defaults() {
        let p = NewProfile::for_account(AccountId::new("u_1"));
        assert_eq!(p.reputation, 0);
        assert_eq!(p.questions_asked, 0);
        assert_eq!(p.answers_given, 0);
        assert!(p.bio.is_none());
        assert!(p.avatar_id.is_none());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_new_profile_validate_rejects_oversized_bio() {
        let mut p = NewProfile::for_account(AccountId::new("u_1"));
        p.bio = Some("x".repeat(BIO_MAX_CHARS + 1));
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_new_profile_validate_accepts_bio_at_limit() {
        let mut p = NewProfile::for_account(AccountId::new("u_1"));
        p.bio = Some("x".repeat(BIO_MAX_CHARS));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_new_profile_validate_rejects_excess_reputation() {
        let mut p = NewProfile::for_account(AccountId::new("u_1"));
        p.reputation = REPUTATION_MAX + 1;
        assert!(p.validate().is_err());
    }

    // =====================================================================
    // CookieSet
    // =====================================================================

    #[test]
    fn test_cookie_set_empty_has_no_header() {
        let set = CookieSet::new();
        assert!(set.is_empty());
        assert_eq!(set.header(), None);
    }

    #[test]
    fn test_cookie_set_header_joins_in_order() {
        let set: CookieSet =
            [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        assert_eq!(set.header().unwrap(), "a=1; b=2; c=3");
    }

    #[test]
    fn test_cookie_set_for_session_uses_session_cookie_name() {
        let set = CookieSet::for_session("sek");
        assert_eq!(set.get(SESSION_COOKIE), Some("sek"));
        assert_eq!(set.header().unwrap(), format!("{SESSION_COOKIE}=sek"));
    }

    #[test]
    fn test_cookie_set_get_returns_first_match() {
        let set: CookieSet =
            [("dup", "first"), ("dup", "second")].into_iter().collect();
        assert_eq!(set.get("dup"), Some("first"));
    }

    // =====================================================================
    // AuthOutcome
    // =====================================================================

    #[test]
    fn test_auth_outcome_failed_carries_no_identity() {
        let outcome = AuthOutcome::failed(messages::LOGIN_FAILED);
        assert!(!outcome.success);
        assert_eq!(outcome.message, messages::LOGIN_FAILED);
        assert!(outcome.account.is_none());
        assert!(outcome.session.is_none());
    }

    #[test]
    fn test_auth_outcome_with_identity_attaches_both() {
        let session = sample_session();
        let account = Account {
            id: session.account_id.clone(),
            email: "a@example.com".into(),
            name: "A".into(),
        };
        let outcome = AuthOutcome::succeeded(messages::LOGIN_OK)
            .with_identity(account.clone(), session.clone());
        assert!(outcome.success);
        assert_eq!(outcome.account, Some(account));
        assert_eq!(outcome.session, Some(session));
    }
}
