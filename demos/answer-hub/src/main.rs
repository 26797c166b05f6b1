//! Answer Hub demo: the Authforge identity core wired end to end over
//! the in-memory collaborators.
//!
//! Walks the three flows the stack exists for:
//!
//! 1. Gateway decisions for an anonymous visitor.
//! 2. The registration saga (including a forced profile failure and its
//!    compensation, then the self-healing login).
//! 3. The session cache: verify, reload persistence, logout.
//!
//! Run with `RUST_LOG=debug cargo run -p answer-hub-demo` to watch the
//! tracing output from every layer.

use std::sync::Arc;

use authforge::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let provider = Arc::new(MemoryIdentityProvider::new());
    let profiles = Arc::new(MemoryProfileStore::new());

    let mut service = AuthServiceBuilder::new()
        .build(
            Arc::clone(&provider),
            Arc::clone(&profiles),
            MemorySnapshotStore::new(),
        )
        .await;

    // --- 1. Anonymous visitor hits the site ------------------------------

    println!("== anonymous visitor ==");
    for path in ["/", "/questions/42", "/login", "/logo.svg"] {
        // A real server checks the exemption list before invoking the
        // gateway at all — assets never cost a verification round-trip.
        if service.gateway().routes().is_exempt(path) {
            println!("  {path:<16} -> exempt (static asset)");
            continue;
        }
        let decision = service.evaluate(path, &CookieSet::new()).await;
        println!("  {path:<16} -> {decision:?}");
    }

    // --- 2. Registration, with a forced profile failure first ------------

    println!("\n== registration with a failing profile store ==");
    profiles.reject_writes(true).await;
    let outcome = service
        .register(&NewAccount {
            email: "ada@example.com".into(),
            password: "correct horse".into(),
            name: "Ada Lovelace".into(),
        })
        .await;
    println!("  outcome: success={} message={:?}", outcome.success, outcome.message);
    println!(
        "  sessions left at provider after compensation: {}",
        provider.active_sessions().await
    );

    println!("\n== login self-heals the orphaned account ==");
    profiles.reject_writes(false).await;
    let outcome = service.login("ada@example.com", "correct horse").await;
    println!("  outcome: success={} message={:?}", outcome.success, outcome.message);
    let account = outcome.account.expect("login succeeded");
    let healed = profiles
        .find_by_account(&account.id)
        .await
        .expect("store reachable");
    println!("  profiles for {}: {}", account.email, healed.len());

    // --- 3. The cache and the gateway agree ------------------------------

    println!("\n== signed-in session ==");
    println!("  cache phase: {}", service.state().phase());
    let cookies = CookieSet::for_session(
        &service.state().session.as_ref().expect("session").secret,
    );
    for path in ["/questions/42", "/login"] {
        let decision = service.evaluate(path, &cookies).await;
        println!("  {path:<16} -> {decision:?}");
    }

    println!("\n== verify, then logout ==");
    println!("  verify_session: {}", service.verify_session().await);
    let outcome = service.logout().await;
    println!("  logout: success={} message={:?}", outcome.success, outcome.message);
    println!("  cache phase: {}", service.state().phase());
    let decision = service.evaluate("/questions/42", &cookies).await;
    println!("  /questions/42    -> {decision:?} (revoked cookie)");
}
