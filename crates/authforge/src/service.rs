//! `AuthService`: the one explicit service object wiring the stack.
//!
//! The reference for this layer is deliberate: no module-level globals.
//! The application constructs one `AuthService` at startup and passes it
//! (or pieces of it) by reference into whatever consumes it. Lifecycle
//! and test isolation stay visible — two services never share state
//! unless they share collaborators.

use std::sync::Arc;

use authforge_cache::{CacheState, SessionCache, SnapshotStore};
use authforge_client::{IdentityProvider, ProfileStore};
use authforge_gateway::{Decision, Gateway, GatewayConfig, RouteTable};
use authforge_model::{AuthOutcome, CookieSet, NewAccount};
use authforge_saga::RegistrationSaga;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring an [`AuthService`].
///
/// # Example
///
/// ```rust,ignore
/// let service = AuthServiceBuilder::new()
///     .routes(my_route_table)
///     .build(provider, profiles, snapshot_store)
///     .await;
/// ```
pub struct AuthServiceBuilder {
    routes: RouteTable,
    gateway_config: GatewayConfig,
    ambient: CookieSet,
}

impl AuthServiceBuilder {
    /// Creates a builder with the default route table, gateway timeout,
    /// and an empty ambient cookie set.
    pub fn new() -> Self {
        Self {
            routes: RouteTable::default(),
            gateway_config: GatewayConfig::default(),
            ambient: CookieSet::new(),
        }
    }

    /// Sets the route classification table.
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Sets the gateway configuration (verification timeout).
    pub fn gateway_config(mut self, config: GatewayConfig) -> Self {
        self.gateway_config = config;
        self
    }

    /// Sets the ambient credentials the session cache starts from (the
    /// environment's cookie jar, if it has one).
    pub fn ambient_cookies(mut self, ambient: CookieSet) -> Self {
        self.ambient = ambient;
        self
    }

    /// Builds the service over the given collaborators, restoring any
    /// persisted session snapshot.
    pub async fn build<I, P, S>(
        self,
        provider: Arc<I>,
        profiles: Arc<P>,
        store: S,
    ) -> AuthService<I, P, S>
    where
        I: IdentityProvider,
        P: ProfileStore,
        S: SnapshotStore,
    {
        let gateway = Gateway::new(
            Arc::clone(&provider),
            self.routes,
            self.gateway_config,
        );
        let saga =
            RegistrationSaga::new(Arc::clone(&provider), profiles);
        let cache =
            SessionCache::open(provider, store, self.ambient).await;

        tracing::info!("auth service ready");
        AuthService {
            gateway,
            saga,
            cache,
        }
    }
}

impl Default for AuthServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

/// The assembled identity core: gateway, saga, and session cache over
/// shared collaborator clients.
///
/// The gateway and the cache each talk to the identity provider but never
/// to each other; the saga is the only component that also touches the
/// profile store. This service is the single place where their results
/// are stitched together (a successful registration seeds the cache, a
/// login runs the saga's self-heal before the cache adopts the session).
pub struct AuthService<I, P, S> {
    gateway: Gateway<I>,
    saga: RegistrationSaga<I, P>,
    cache: SessionCache<I, S>,
}

impl<I, P, S> AuthService<I, P, S>
where
    I: IdentityProvider,
    P: ProfileStore,
    S: SnapshotStore,
{
    /// Creates a new builder.
    pub fn builder() -> AuthServiceBuilder {
        AuthServiceBuilder::new()
    }

    /// The per-request gateway, for embedding into a server's request
    /// path.
    pub fn gateway(&self) -> &Gateway<I> {
        &self.gateway
    }

    /// The cache's current state.
    pub fn state(&self) -> &CacheState {
        self.cache.state()
    }

    /// Decides allow/redirect for one request. See
    /// [`Gateway::evaluate`].
    pub async fn evaluate(
        &self,
        path: &str,
        cookies: &CookieSet,
    ) -> Decision {
        self.gateway.evaluate(path, cookies).await
    }

    /// Registers a new user via the saga. On success the cache adopts
    /// the auto-login session, so the user is immediately signed in
    /// locally too.
    pub async fn register(
        &mut self,
        new_account: &NewAccount,
    ) -> AuthOutcome {
        let outcome = self.saga.register(new_account).await;
        if let (Some(account), Some(session)) =
            (outcome.account.clone(), outcome.session.clone())
        {
            self.cache.adopt_identity(account, session).await;
        }
        outcome
    }

    /// Logs a user in via the saga's login path (which lazily repairs a
    /// missing profile), then caches the identity.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> AuthOutcome {
        let outcome = self.saga.login(email, password).await;
        if let (Some(account), Some(session)) =
            (outcome.account.clone(), outcome.session.clone())
        {
            self.cache.adopt_identity(account, session).await;
        }
        outcome
    }

    /// Logs out. Local state clears whatever the provider says.
    pub async fn logout(&mut self) -> AuthOutcome {
        self.cache.logout().await
    }

    /// Hydrates the cache at startup (at most once).
    pub async fn hydrate(&mut self) {
        self.cache.hydrate().await;
    }

    /// Re-validates the cached session against the provider. Run this
    /// before anything security-sensitive.
    pub async fn verify_session(&mut self) -> bool {
        self.cache.verify_session().await
    }
}
