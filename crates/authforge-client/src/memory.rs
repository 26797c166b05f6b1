//! In-process doubles for the identity provider and profile store.
//!
//! These back the demo binary and the test suites of every crate that
//! consumes the client traits. They honor the same contracts as the real
//! services — duplicate-email rejection, session verification, the
//! one-profile-per-account unique index — and add two things a real
//! service can't offer a test:
//!
//! - **failure injection** — flip [`set_offline`](MemoryIdentityProvider::set_offline)
//!   or [`reject_writes`](MemoryProfileStore::reject_writes) to make a
//!   specific saga step fail;
//! - **call counting** — assert that an operation made exactly the number
//!   of outbound calls it promised (or none at all).
//!
//! Never use these in production: passwords are held in plain text.

use std::collections::HashMap;

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use tokio::sync::Mutex;

use authforge_model::{
    Account, AccountId, CookieSet, NewAccount, NewProfile, Profile, Session,
    SessionId, SESSION_COOKIE, SESSION_CURRENT,
};

use crate::{ClientError, IdentityProvider, ProfileStore};

/// How long a memory-issued session lives.
const SESSION_TTL_DAYS: i64 = 30;

/// Generates a random 32-character hex id (128 bits of entropy).
fn generate_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn bump(calls: &mut HashMap<String, u64>, operation: &str) {
    *calls.entry(operation.to_string()).or_insert(0) += 1;
}

// ---------------------------------------------------------------------------
// MemoryIdentityProvider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ProviderState {
    /// Registered accounts, keyed by email. The tuple holds the password
    /// (plain text — this is a test double) and the account.
    accounts: HashMap<String, (String, Account)>,
    /// Active sessions, keyed by their secret (the cookie bearer value).
    sessions: HashMap<String, Session>,
    /// When set, every operation fails with a network error.
    offline: bool,
    /// When set, session creation fails even for valid credentials.
    reject_session_creation: bool,
    /// Operation name → number of invocations.
    calls: HashMap<String, u64>,
}

/// An [`IdentityProvider`] living entirely in process memory.
pub struct MemoryIdentityProvider {
    state: Mutex<ProviderState>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProviderState::default()),
        }
    }

    /// Makes every subsequent operation fail as unreachable.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Makes `create_session` fail even for valid credentials, leaving the
    /// other operations working. Used to fail a specific saga step.
    pub async fn reject_session_creation(&self, reject: bool) {
        self.state.lock().await.reject_session_creation = reject;
    }

    /// How many times the named operation was invoked.
    pub async fn call_count(&self, operation: &str) -> u64 {
        self.state
            .lock()
            .await
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Number of sessions the provider currently considers valid.
    pub async fn active_sessions(&self) -> usize {
        self.state.lock().await.sessions.len()
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderState {
    /// Resolves the session carried by the credentials, checking existence
    /// and expiry — the same judgment the real provider makes.
    fn resolve(&self, credentials: &CookieSet) -> Result<&Session, ClientError> {
        let secret = credentials
            .get(SESSION_COOKIE)
            .ok_or(ClientError::SessionInvalid)?;
        let session = self
            .sessions
            .get(secret)
            .ok_or(ClientError::SessionInvalid)?;
        if session.is_expired_at(Utc::now()) {
            return Err(ClientError::SessionInvalid);
        }
        Ok(session)
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(
        &self,
        new_account: &NewAccount,
    ) -> Result<Account, ClientError> {
        let mut state = self.state.lock().await;
        bump(&mut state.calls, "create_account");
        if state.offline {
            return Err(ClientError::Network("provider offline".into()));
        }
        if state.accounts.contains_key(&new_account.email) {
            return Err(ClientError::DuplicateAccount);
        }

        let account = Account {
            id: AccountId::new(generate_id()),
            email: new_account.email.clone(),
            name: new_account.name.clone(),
        };
        state.accounts.insert(
            new_account.email.clone(),
            (new_account.password.clone(), account.clone()),
        );
        tracing::debug!(account_id = %account.id, "memory account created");
        Ok(account)
    }

    async fn create_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let mut state = self.state.lock().await;
        bump(&mut state.calls, "create_session");
        if state.offline {
            return Err(ClientError::Network("provider offline".into()));
        }
        if state.reject_session_creation {
            return Err(ClientError::Network(
                "session service unavailable".into(),
            ));
        }

        let account_id = match state.accounts.get(email) {
            Some((stored, account)) if stored == password => {
                account.id.clone()
            }
            _ => return Err(ClientError::SessionInvalid),
        };

        let now = Utc::now();
        let session = Session {
            id: SessionId::new(generate_id()),
            account_id,
            provider: "email".into(),
            secret: generate_id(),
            created_at: now,
            expires_at: now + ChronoDuration::days(SESSION_TTL_DAYS),
        };
        state
            .sessions
            .insert(session.secret.clone(), session.clone());
        tracing::debug!(session_id = %session.id, "memory session created");
        Ok(session)
    }

    async fn get_current_account(
        &self,
        credentials: &CookieSet,
    ) -> Result<Account, ClientError> {
        let mut state = self.state.lock().await;
        bump(&mut state.calls, "get_current_account");
        if state.offline {
            return Err(ClientError::Network("provider offline".into()));
        }

        let account_id = state.resolve(credentials)?.account_id.clone();
        state
            .accounts
            .values()
            .find(|(_, account)| account.id == account_id)
            .map(|(_, account)| account.clone())
            .ok_or(ClientError::SessionInvalid)
    }

    async fn get_session(
        &self,
        credentials: &CookieSet,
        session_id: &str,
    ) -> Result<Session, ClientError> {
        let mut state = self.state.lock().await;
        bump(&mut state.calls, "get_session");
        if state.offline {
            return Err(ClientError::Network("provider offline".into()));
        }

        let session = state.resolve(credentials)?;
        if session_id == SESSION_CURRENT
            || session_id == session.id.as_str()
        {
            Ok(session.clone())
        } else {
            Err(ClientError::SessionInvalid)
        }
    }

    async fn delete_session(
        &self,
        credentials: &CookieSet,
        session_id: &str,
    ) -> Result<(), ClientError> {
        let mut state = self.state.lock().await;
        bump(&mut state.calls, "delete_session");
        if state.offline {
            return Err(ClientError::Network("provider offline".into()));
        }

        let session = state.resolve(credentials)?;
        if session_id != SESSION_CURRENT
            && session_id != session.id.as_str()
        {
            return Err(ClientError::SessionInvalid);
        }
        let secret = session.secret.clone();
        state.sessions.remove(&secret);
        tracing::debug!("memory session deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryProfileStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    profiles: Vec<Profile>,
    offline: bool,
    reject_writes: bool,
    calls: HashMap<String, u64>,
}

/// A [`ProfileStore`] living entirely in process memory.
///
/// Enforces the account-id unique index the way the real store does: the
/// second `create` for the same account is rejected as a validation
/// failure, whatever the caller believed about existing documents.
pub struct MemoryProfileStore {
    state: Mutex<StoreState>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Makes every subsequent operation fail as unreachable.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Makes `create` reject every document. Used to fail the profile step
    /// of the registration saga.
    pub async fn reject_writes(&self, reject: bool) {
        self.state.lock().await.reject_writes = reject;
    }

    /// How many times the named operation was invoked.
    pub async fn call_count(&self, operation: &str) -> u64 {
        self.state
            .lock()
            .await
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Profile>, ClientError> {
        let mut state = self.state.lock().await;
        bump(&mut state.calls, "find_by_account");
        if state.offline {
            return Err(ClientError::Network("store offline".into()));
        }

        Ok(state
            .profiles
            .iter()
            .filter(|profile| &profile.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        new_profile: NewProfile,
    ) -> Result<Profile, ClientError> {
        let mut state = self.state.lock().await;
        bump(&mut state.calls, "create");
        if state.offline {
            return Err(ClientError::Network("store offline".into()));
        }
        if state.reject_writes {
            return Err(ClientError::Validation(
                "document write rejected".into(),
            ));
        }
        new_profile.validate().map_err(ClientError::Validation)?;

        // The unique index: one profile per account, enforced here and
        // nowhere else.
        if state
            .profiles
            .iter()
            .any(|profile| profile.account_id == new_profile.account_id)
        {
            return Err(ClientError::Validation(
                "a profile already exists for this account".into(),
            ));
        }

        let profile = Profile {
            id: generate_id(),
            account_id: new_profile.account_id,
            reputation: new_profile.reputation,
            bio: new_profile.bio,
            avatar_id: new_profile.avatar_id,
            questions_asked: new_profile.questions_asked,
            answers_given: new_profile.answers_given,
        };
        state.profiles.push(profile.clone());
        tracing::debug!(account_id = %profile.account_id, "memory profile created");
        Ok(profile)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.into(),
            password: "hunter2".into(),
            name: "Tester".into(),
        }
    }

    // =====================================================================
    // MemoryIdentityProvider
    // =====================================================================

    #[tokio::test]
    async fn test_create_account_duplicate_email_is_rejected() {
        let provider = MemoryIdentityProvider::new();
        provider
            .create_account(&new_account("a@example.com"))
            .await
            .unwrap();

        let result = provider
            .create_account(&new_account("a@example.com"))
            .await;

        assert!(matches!(result, Err(ClientError::DuplicateAccount)));
    }

    #[tokio::test]
    async fn test_create_session_wrong_password_is_rejected() {
        let provider = MemoryIdentityProvider::new();
        provider
            .create_account(&new_account("a@example.com"))
            .await
            .unwrap();

        let result = provider
            .create_session("a@example.com", "wrong")
            .await;

        assert!(matches!(result, Err(ClientError::SessionInvalid)));
    }

    #[tokio::test]
    async fn test_session_secret_authenticates_current_account() {
        let provider = MemoryIdentityProvider::new();
        let account = provider
            .create_account(&new_account("a@example.com"))
            .await
            .unwrap();
        let session = provider
            .create_session("a@example.com", "hunter2")
            .await
            .unwrap();

        let credentials = CookieSet::for_session(&session.secret);
        let current =
            provider.get_current_account(&credentials).await.unwrap();

        assert_eq!(current, account);
    }

    #[tokio::test]
    async fn test_get_session_current_alias_returns_own_session() {
        let provider = MemoryIdentityProvider::new();
        provider
            .create_account(&new_account("a@example.com"))
            .await
            .unwrap();
        let session = provider
            .create_session("a@example.com", "hunter2")
            .await
            .unwrap();

        let credentials = CookieSet::for_session(&session.secret);
        let fetched = provider
            .get_session(&credentials, SESSION_CURRENT)
            .await
            .unwrap();

        assert_eq!(fetched, session);
    }

    #[tokio::test]
    async fn test_delete_session_revokes_the_secret() {
        let provider = MemoryIdentityProvider::new();
        provider
            .create_account(&new_account("a@example.com"))
            .await
            .unwrap();
        let session = provider
            .create_session("a@example.com", "hunter2")
            .await
            .unwrap();
        let credentials = CookieSet::for_session(&session.secret);

        provider
            .delete_session(&credentials, SESSION_CURRENT)
            .await
            .unwrap();

        let result = provider.get_current_account(&credentials).await;
        assert!(matches!(result, Err(ClientError::SessionInvalid)));
        assert_eq!(provider.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_forged_cookie_is_rejected() {
        let provider = MemoryIdentityProvider::new();
        let credentials = CookieSet::for_session("made-up-secret");

        let result = provider.get_current_account(&credentials).await;

        assert!(matches!(result, Err(ClientError::SessionInvalid)));
    }

    #[tokio::test]
    async fn test_offline_provider_fails_with_network_error() {
        let provider = MemoryIdentityProvider::new();
        provider.set_offline(true).await;

        let result = provider
            .create_account(&new_account("a@example.com"))
            .await;

        assert!(matches!(result, Err(ClientError::Network(_))));
    }

    #[tokio::test]
    async fn test_call_count_tracks_operations() {
        let provider = MemoryIdentityProvider::new();
        assert_eq!(provider.call_count("get_current_account").await, 0);

        let _ = provider
            .get_current_account(&CookieSet::for_session("x"))
            .await;

        assert_eq!(provider.call_count("get_current_account").await, 1);
    }

    // =====================================================================
    // MemoryProfileStore
    // =====================================================================

    #[tokio::test]
    async fn test_create_profile_then_find_by_account() {
        let store = MemoryProfileStore::new();
        let account_id = AccountId::new("u_1");

        let created = store
            .create(NewProfile::for_account(account_id.clone()))
            .await
            .unwrap();
        let found = store.find_by_account(&account_id).await.unwrap();

        assert_eq!(found, vec![created]);
    }

    #[tokio::test]
    async fn test_unique_index_rejects_second_profile() {
        let store = MemoryProfileStore::new();
        let account_id = AccountId::new("u_1");
        store
            .create(NewProfile::for_account(account_id.clone()))
            .await
            .unwrap();

        let result =
            store.create(NewProfile::for_account(account_id)).await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_field_bound_violations() {
        let store = MemoryProfileStore::new();
        let mut profile = NewProfile::for_account(AccountId::new("u_1"));
        profile.bio =
            Some("x".repeat(authforge_model::BIO_MAX_CHARS + 1));

        let result = store.create(profile).await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[tokio::test]
    async fn test_find_by_account_empty_for_unknown_account() {
        let store = MemoryProfileStore::new();
        let found = store
            .find_by_account(&AccountId::new("nobody"))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_reject_writes_fails_creation_only() {
        let store = MemoryProfileStore::new();
        store.reject_writes(true).await;

        let result = store
            .create(NewProfile::for_account(AccountId::new("u_1")))
            .await;
        assert!(matches!(result, Err(ClientError::Validation(_))));

        // Reads keep working.
        assert!(store
            .find_by_account(&AccountId::new("u_1"))
            .await
            .unwrap()
            .is_empty());
    }
}
