//! The registration saga and the login path that heals its leftovers.

use std::sync::Arc;

use authforge_client::{ClientError, IdentityProvider, ProfileStore};
use authforge_model::{
    messages, AccountId, AuthOutcome, CookieSet, NewAccount, NewProfile,
    Session,
};

// ---------------------------------------------------------------------------
// Compensation
// ---------------------------------------------------------------------------

/// The undo action recorded after each completed saga step.
///
/// Every step gets an entry, even the one whose policy is to do nothing —
/// that keeps "we don't roll accounts back" a visible decision in the
/// step list instead of an omission.
enum Compensation {
    /// Account creation is never rolled back. The orphaned account is
    /// healed by the next login's lazy profile creation.
    RetainAccount(AccountId),

    /// Revoke the auto-login session created in step 2.
    DeleteSession(Session),
}

// ---------------------------------------------------------------------------
// RegistrationSaga
// ---------------------------------------------------------------------------

/// Orchestrates registration (and its recovery path, login) across the
/// identity provider and the profile store.
///
/// Strictly sequential within one invocation — each step needs the output
/// of the previous one. Concurrent invocations are safe: they share no
/// state here and race only on the external uniqueness constraints (the
/// email at the provider, the account id at the store).
///
/// No error escapes either operation. Callers always receive an
/// [`AuthOutcome`], and the failure messages never reveal which internal
/// stage failed — with one exception, the duplicate email, which the
/// provider has already confirmed to whoever owns that address.
pub struct RegistrationSaga<I, P> {
    provider: Arc<I>,
    profiles: Arc<P>,
}

impl<I: IdentityProvider, P: ProfileStore> RegistrationSaga<I, P> {
    pub fn new(provider: Arc<I>, profiles: Arc<P>) -> Self {
        Self { provider, profiles }
    }

    /// Registers a new user: account, auto-login session, default profile.
    pub async fn register(&self, new_account: &NewAccount) -> AuthOutcome {
        let mut completed: Vec<Compensation> = Vec::new();

        // Step 1: create the account. Nothing exists yet, so a failure
        // here ends the saga with no compensation to run.
        let account = match self.provider.create_account(new_account).await
        {
            Ok(account) => account,
            Err(ClientError::DuplicateAccount) => {
                tracing::info!("registration rejected: email taken");
                return AuthOutcome::failed(messages::DUPLICATE_EMAIL);
            }
            Err(error) => {
                tracing::warn!(error = %error, "account creation failed");
                return AuthOutcome::failed(messages::REGISTRATION_FAILED);
            }
        };
        completed.push(Compensation::RetainAccount(account.id.clone()));
        tracing::info!(account_id = %account.id, "account created");

        // Step 2: auto-login.
        let session = match self
            .provider
            .create_session(&new_account.email, &new_account.password)
            .await
        {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!(error = %error, "auto-login failed");
                self.compensate(&completed).await;
                return AuthOutcome::failed(messages::REGISTRATION_FAILED);
            }
        };
        completed.push(Compensation::DeleteSession(session.clone()));
        tracing::info!(session_id = %session.id, "session created");

        // Step 3: default profile, linked to the new account.
        match self
            .profiles
            .create(NewProfile::for_account(account.id.clone()))
            .await
        {
            Ok(profile) => {
                tracing::info!(
                    account_id = %account.id,
                    profile_id = %profile.id,
                    "registration complete"
                );
                AuthOutcome::succeeded(messages::REGISTRATION_OK)
                    .with_identity(account, session)
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    account_id = %account.id,
                    "profile creation failed, compensating"
                );
                self.compensate(&completed).await;
                // The account and session values die with this frame —
                // nothing identity-bearing leaves a failed saga.
                AuthOutcome::failed(messages::PROFILE_CREATE_FAILED)
            }
        }
    }

    /// Logs a user in, lazily creating their profile if registration
    /// never finished it.
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let session =
            match self.provider.create_session(email, password).await {
                Ok(session) => session,
                Err(error) => {
                    tracing::debug!(error = %error, "login rejected");
                    return AuthOutcome::failed(messages::LOGIN_FAILED);
                }
            };

        let credentials = CookieSet::for_session(&session.secret);
        let account =
            match self.provider.get_current_account(&credentials).await {
                Ok(account) => account,
                Err(error) => {
                    tracing::warn!(error = %error, "post-login account fetch failed");
                    return AuthOutcome::failed(messages::LOGIN_FAILED);
                }
            };

        // Best-effort: a missing profile is repaired here, but a store
        // outage must not fail an otherwise valid login.
        self.ensure_profile(&account.id).await;

        tracing::info!(account_id = %account.id, "login complete");
        AuthOutcome::succeeded(messages::LOGIN_OK)
            .with_identity(account, session)
    }

    /// Creates the default profile when none exists.
    ///
    /// Not atomic: two concurrent logins can both observe zero profiles
    /// and both attempt creation. The store's unique index decides the
    /// winner; the loser's rejection is expected and treated as success.
    async fn ensure_profile(&self, account_id: &AccountId) {
        match self.profiles.find_by_account(account_id).await {
            Ok(profiles) if profiles.is_empty() => {
                match self
                    .profiles
                    .create(NewProfile::for_account(account_id.clone()))
                    .await
                {
                    Ok(_) => {
                        tracing::info!(
                            %account_id,
                            "missing profile created on login"
                        );
                    }
                    Err(ClientError::Validation(_)) => {
                        // Lost the race: another login created it between
                        // our query and our write.
                        tracing::debug!(
                            %account_id,
                            "profile appeared concurrently"
                        );
                    }
                    Err(error) => {
                        tracing::warn!(
                            error = %error,
                            %account_id,
                            "could not create missing profile"
                        );
                    }
                }
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    %account_id,
                    "could not check for existing profile"
                );
            }
        }
    }

    /// Runs the recorded compensations, most recent first.
    async fn compensate(&self, completed: &[Compensation]) {
        for step in completed.iter().rev() {
            match step {
                Compensation::DeleteSession(session) => {
                    let credentials =
                        CookieSet::for_session(&session.secret);
                    match self
                        .provider
                        .delete_session(&credentials, session.id.as_str())
                        .await
                    {
                        Ok(()) => {
                            tracing::info!(
                                session_id = %session.id,
                                "compensation: session revoked"
                            );
                        }
                        Err(error) => {
                            // The session will still expire on its own;
                            // nothing more can be done from here.
                            tracing::error!(
                                error = %error,
                                session_id = %session.id,
                                "compensation could not revoke session"
                            );
                        }
                    }
                }
                Compensation::RetainAccount(account_id) => {
                    tracing::info!(
                        %account_id,
                        "account retained, profile will be created on next login"
                    );
                }
            }
        }
    }
}
