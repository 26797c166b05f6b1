//! The gateway decision logic.
//!
//! Per request: classify the path, establish the auth state (with at most
//! one outbound verification call, bounded by a timeout), then apply the
//! decision table:
//!
//! ```text
//! auth state       | route class | outcome
//! -----------------+-------------+---------------------------------
//! authenticated    | auth page   | redirect to home
//! authenticated    | protected   | allow
//! unauthenticated  | auth page   | allow
//! unauthenticated  | protected   | redirect to login?redirect=<path>
//! ```
//!
//! Fail-closed: a provider rejection, a network failure, and a timeout all
//! read as "unauthenticated". The distinction is logged here and goes no
//! further — callers (and attackers probing with cookies) only ever see
//! the redirect decision.

use std::sync::Arc;
use std::time::Duration;

use authforge_client::IdentityProvider;
use authforge_model::CookieSet;

use crate::{RouteClass, RouteTable};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Gateway settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Upper bound on the verification call. Applied here, at the
    /// decision point, in addition to whatever policy the provider client
    /// carries — a stalled verification must never stall the request.
    pub verify_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            verify_timeout: Duration::from_secs(5),
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// The gateway's verdict for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the request through to application logic.
    Allow,

    /// Redirect to the given target instead.
    RedirectTo(String),
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// The per-request session verification gateway.
///
/// Stateless and reentrant: nothing is retained between requests, so one
/// instance (behind an `Arc`, typically) serves any number of concurrent
/// evaluations.
pub struct Gateway<I> {
    provider: Arc<I>,
    routes: RouteTable,
    config: GatewayConfig,
}

impl<I: IdentityProvider> Gateway<I> {
    pub fn new(
        provider: Arc<I>,
        routes: RouteTable,
        config: GatewayConfig,
    ) -> Self {
        Self {
            provider,
            routes,
            config,
        }
    }

    /// The route table this gateway classifies against.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decides what to do with a request for `path` carrying `cookies`.
    pub async fn evaluate(
        &self,
        path: &str,
        cookies: &CookieSet,
    ) -> Decision {
        let class = self.routes.classify(path);

        // Public content needs no proof of anything — skip the provider
        // round-trip entirely.
        if class == RouteClass::Public {
            return Decision::Allow;
        }

        let authenticated = self.verify(cookies).await;
        tracing::debug!(path, %class, authenticated, "gateway decision");

        match (authenticated, class) {
            (true, RouteClass::AuthPage) => {
                Decision::RedirectTo(self.routes.home_path().to_string())
            }
            (true, _) => Decision::Allow,
            (false, RouteClass::AuthPage) => Decision::Allow,
            (false, _) => Decision::RedirectTo(self.login_redirect(path)),
        }
    }

    /// Builds the login redirect, preserving the original destination in
    /// the `redirect` query parameter.
    fn login_redirect(&self, path: &str) -> String {
        format!(
            "{}?redirect={}",
            self.routes.login_path(),
            urlencoding::encode(path)
        )
    }

    /// Establishes the auth state for a cookie set. `true` only when the
    /// identity provider positively confirms the session.
    async fn verify(&self, cookies: &CookieSet) -> bool {
        // No cookies can never be a valid session — skip the network call.
        if cookies.is_empty() {
            return false;
        }

        let verification = self.provider.get_current_account(cookies);
        match tokio::time::timeout(self.config.verify_timeout, verification)
            .await
        {
            Ok(Ok(account)) => {
                tracing::debug!(account_id = %account.id, "session verified");
                true
            }
            Ok(Err(error)) => {
                // Rejected, expired, tampered, or unreachable — all the
                // same from out here.
                tracing::debug!(
                    error = %error,
                    "verification failed, treating as unauthenticated"
                );
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.config.verify_timeout,
                    "verification timed out, treating as unauthenticated"
                );
                false
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
