//! The session cache: operations and persistence.

use std::sync::Arc;

use authforge_client::IdentityProvider;
use authforge_model::{
    messages, Account, AuthOutcome, AuthSnapshot, CookieSet, Session,
    SESSION_CURRENT,
};

use crate::{CacheState, SnapshotStore};

/// Name of the persisted blob.
pub const SNAPSHOT_NAME: &str = "auth-storage";

/// The application's local view of who is logged in.
///
/// Owns an identity-provider client, a snapshot store, and the *ambient*
/// cookie set — whatever credentials the hosting environment carries when
/// no session is cached yet (a browser's cookie jar, an empty set on a
/// fresh device). When a session is cached, its secret takes precedence
/// over the ambient set.
///
/// ## Lifecycle
///
/// ```text
/// open() ──→ hydrate() ──→ verify_session() / login() / logout()
///    │            │                    │
///    ▼            ▼                    ▼
/// snapshot     provider            provider +
/// restored     consulted           snapshot persisted
/// ```
pub struct SessionCache<I, S> {
    provider: Arc<I>,
    store: S,
    ambient: CookieSet,
    state: CacheState,
}

impl<I: IdentityProvider, S: SnapshotStore> SessionCache<I, S> {
    /// Opens the cache, restoring the persisted account/session snapshot
    /// if one exists. The loading and hydration flags always start at
    /// their initial values, whatever the previous process was doing when
    /// it died.
    pub async fn open(
        provider: Arc<I>,
        store: S,
        ambient: CookieSet,
    ) -> Self {
        let mut state = CacheState::cold();

        match store.load(SNAPSHOT_NAME).await {
            Ok(Some(bytes)) => match AuthSnapshot::decode(&bytes) {
                Ok(snapshot) => {
                    state.account = snapshot.account;
                    state.session = snapshot.session;
                    tracing::debug!(
                        restored = state.session.is_some(),
                        "auth snapshot restored"
                    );
                }
                Err(error) => {
                    // Unreadable or from a future version: start cold.
                    tracing::warn!(
                        error = %error,
                        "discarding unreadable auth snapshot"
                    );
                }
            },
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(error = %error, "could not read auth snapshot");
            }
        }

        Self {
            provider,
            store,
            ambient,
            state,
        }
    }

    /// The current state, for rendering and assertions.
    pub fn state(&self) -> &CacheState {
        &self.state
    }

    /// The cached account, if any.
    pub fn account(&self) -> Option<&Account> {
        self.state.account.as_ref()
    }

    /// The cached session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    /// The credentials to present to the provider right now: the cached
    /// session's secret when there is one, the ambient cookies otherwise.
    fn credentials(&self) -> CookieSet {
        match &self.state.session {
            Some(session) => CookieSet::for_session(&session.secret),
            None => self.ambient.clone(),
        }
    }

    /// Populates the cache from the provider at startup.
    ///
    /// A no-op when hydration already ran or a session was restored from
    /// the snapshot — the guard lives here, not at the caller. Both
    /// outcomes mark the cache hydrated; a failure clears the identity
    /// and is not retried.
    pub async fn hydrate(&mut self) {
        if self.state.is_hydrated || self.state.session.is_some() {
            tracing::debug!("hydration skipped, state already present");
            return;
        }

        self.state.is_loading = true;
        let credentials = self.credentials();

        match self.fetch_identity(&credentials).await {
            Ok((account, session)) => {
                tracing::info!(account_id = %account.id, "hydrated from provider");
                self.state.account = Some(account);
                self.state.session = Some(session);
            }
            Err(error) => {
                tracing::debug!(error = %error, "no valid session to hydrate from");
                self.state.account = None;
                self.state.session = None;
            }
        }

        self.state.is_loading = false;
        self.state.is_hydrated = true;
        self.persist().await;
    }

    /// Re-validates the cached identity against the provider.
    ///
    /// Unconditional: runs whatever the hydration state, because it is
    /// the gate in front of sensitive operations. Success refreshes the
    /// cached snapshot; failure clears it immediately — the cache never
    /// keeps vouching for a session the provider no longer honors.
    pub async fn verify_session(&mut self) -> bool {
        let credentials = self.credentials();

        match self.fetch_identity(&credentials).await {
            Ok((account, session)) => {
                self.state.account = Some(account);
                self.state.session = Some(session);
                self.state.is_hydrated = true;
                self.persist().await;
                true
            }
            Err(error) => {
                tracing::debug!(
                    error = %error,
                    "verification failed, clearing cached identity"
                );
                self.state.account = None;
                self.state.session = None;
                // Straight to hydrated-anonymous, no re-hydration pass.
                self.state.is_hydrated = true;
                self.persist().await;
                false
            }
        }
    }

    /// Logs in with email and password, caching the resulting identity.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> AuthOutcome {
        self.state.is_loading = true;

        let outcome = match self
            .provider
            .create_session(email, password)
            .await
        {
            Ok(session) => {
                let credentials = CookieSet::for_session(&session.secret);
                match self.provider.get_current_account(&credentials).await {
                    Ok(account) => {
                        tracing::info!(account_id = %account.id, "login cached");
                        self.state.account = Some(account.clone());
                        self.state.session = Some(session.clone());
                        self.state.is_hydrated = true;
                        AuthOutcome::succeeded(messages::LOGIN_OK)
                            .with_identity(account, session)
                    }
                    Err(error) => {
                        tracing::debug!(error = %error, "account fetch after login failed");
                        AuthOutcome::failed(messages::LOGIN_FAILED)
                    }
                }
            }
            Err(error) => {
                tracing::debug!(error = %error, "login rejected");
                AuthOutcome::failed(messages::LOGIN_FAILED)
            }
        };

        self.state.is_loading = false;
        self.persist().await;
        outcome
    }

    /// Installs an identity established outside the cache — the
    /// registration saga's auto-login, typically. Marks the cache
    /// hydrated and persists the new snapshot.
    pub async fn adopt_identity(
        &mut self,
        account: Account,
        session: Session,
    ) {
        tracing::debug!(account_id = %account.id, "identity adopted");
        self.state.account = Some(account);
        self.state.session = Some(session);
        self.state.is_hydrated = true;
        self.persist().await;
    }

    /// Logs out: asks the provider to revoke the session, then clears the
    /// local identity *regardless* of what the provider said. Local state
    /// is not held hostage to provider availability.
    pub async fn logout(&mut self) -> AuthOutcome {
        self.state.is_loading = true;
        let credentials = self.credentials();

        if let Err(error) = self
            .provider
            .delete_session(&credentials, SESSION_CURRENT)
            .await
        {
            tracing::warn!(
                error = %error,
                "provider logout failed, clearing local state anyway"
            );
        }

        self.state.account = None;
        self.state.session = None;
        self.state.is_loading = false;
        self.state.is_hydrated = true;
        self.persist().await;

        tracing::info!("logged out");
        AuthOutcome::succeeded(messages::LOGOUT_OK)
    }

    /// One round of "who am I": account first, then the session behind
    /// the same credentials.
    async fn fetch_identity(
        &self,
        credentials: &CookieSet,
    ) -> Result<(Account, Session), authforge_client::ClientError> {
        let account =
            self.provider.get_current_account(credentials).await?;
        let session = self
            .provider
            .get_session(credentials, SESSION_CURRENT)
            .await?;
        Ok((account, session))
    }

    /// Best-effort persistence of the whitelisted snapshot. A failed
    /// write is logged and otherwise ignored — the in-memory state is
    /// already correct, and the next mutation will try again.
    async fn persist(&self) {
        let snapshot =
            AuthSnapshot::capture(&self.state.account, &self.state.session);
        let bytes = match snapshot.encode() {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(error = %error, "could not encode auth snapshot");
                return;
            }
        };
        if let Err(error) = self.store.save(SNAPSHOT_NAME, &bytes).await {
            tracing::warn!(error = %error, "could not persist auth snapshot");
        }
    }
}
