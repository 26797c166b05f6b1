//! Integration tests for the REST clients against a mock provider.
//!
//! These pin down the wire contract: which headers are sent, how status
//! codes map onto the error taxonomy, and that the retry policy actually
//! re-issues transient failures.

use std::time::Duration;

use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use authforge_client::{
    CallPolicy, ClientError, HttpConfig, HttpIdentityProvider,
    HttpProfileStore, IdentityProvider, ProfileStore,
};
use authforge_model::{AccountId, CookieSet, NewAccount, NewProfile};

fn config(endpoint: &str) -> HttpConfig {
    HttpConfig {
        endpoint: endpoint.to_string(),
        project_id: "proj-1".into(),
        api_key: None,
        database_id: "answer-hub".into(),
        profile_collection_id: "profiles".into(),
        policy: CallPolicy {
            timeout: Duration::from_millis(500),
            retries: 1,
        },
    }
}

fn account_json() -> serde_json::Value {
    serde_json::json!({
        "id": "u_1",
        "email": "a@example.com",
        "name": "A",
    })
}

fn session_json() -> serde_json::Value {
    serde_json::json!({
        "id": "s_1",
        "account_id": "u_1",
        "provider": "email",
        "secret": "sek",
        "created_at": "2024-05-01T00:00:00Z",
        "expires_at": "2024-06-01T00:00:00Z",
    })
}

// =========================================================================
// Header forwarding
// =========================================================================

#[tokio::test]
async fn test_get_current_account_forwards_cookies_and_project_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .and(header("X-Identity-Project", "proj-1"))
        .and(header("Cookie", "af_session=sek; theme=dark"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = HttpIdentityProvider::new(config(&server.uri()));
    let mut credentials = CookieSet::for_session("sek");
    credentials.push("theme", "dark");

    let account = provider.get_current_account(&credentials).await.unwrap();

    assert_eq!(account.id, AccountId::new("u_1"));
    assert_eq!(account.email, "a@example.com");
}

#[tokio::test]
async fn test_create_session_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/account/sessions/email"))
        .and(body_partial_json(serde_json::json!({
            "email": "a@example.com",
            "password": "hunter2",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(session_json()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = HttpIdentityProvider::new(config(&server.uri()));
    let session = provider
        .create_session("a@example.com", "hunter2")
        .await
        .unwrap();

    assert_eq!(session.secret, "sek");
    assert_eq!(session.provider, "email");
}

// =========================================================================
// Status-code mapping
// =========================================================================

#[tokio::test]
async fn test_create_account_conflict_maps_to_duplicate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let provider = HttpIdentityProvider::new(config(&server.uri()));
    let result = provider
        .create_account(&NewAccount {
            email: "a@example.com".into(),
            password: "hunter2".into(),
            name: "A".into(),
        })
        .await;

    assert!(matches!(result, Err(ClientError::DuplicateAccount)));
}

#[tokio::test]
async fn test_unauthorized_maps_to_session_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let provider = HttpIdentityProvider::new(config(&server.uri()));
    let result = provider
        .get_current_account(&CookieSet::for_session("stale"))
        .await;

    assert!(matches!(result, Err(ClientError::SessionInvalid)));
}

#[tokio::test]
async fn test_server_fault_is_retried_then_reported_as_network() {
    let server = MockServer::start().await;
    // expect(2): the initial attempt plus exactly one retry.
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let provider = HttpIdentityProvider::new(config(&server.uri()));
    let result = provider
        .get_current_account(&CookieSet::for_session("sek"))
        .await;

    assert!(matches!(result, Err(ClientError::Network(_))));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(account_json())
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let mut cfg = config(&server.uri());
    cfg.policy = CallPolicy {
        timeout: Duration::from_millis(50),
        retries: 0,
    };
    let provider = HttpIdentityProvider::new(cfg);

    let result = provider
        .get_current_account(&CookieSet::for_session("sek"))
        .await;

    assert!(matches!(result, Err(ClientError::Timeout(_))));
}

#[tokio::test]
async fn test_delete_session_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/account/sessions/current"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let provider = HttpIdentityProvider::new(config(&server.uri()));
    provider
        .delete_session(&CookieSet::for_session("sek"), "current")
        .await
        .unwrap();
}

// =========================================================================
// Profile store
// =========================================================================

#[tokio::test]
async fn test_find_by_account_queries_and_unwraps_documents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/databases/answer-hub/collections/profiles/documents"))
        .and(query_param("account_id", "u_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({
                "total": 1,
                "documents": [{
                    "id": "p_1",
                    "account_id": "u_1",
                    "reputation": 10,
                    "bio": null,
                    "avatar_id": null,
                    "questions_asked": 2,
                    "answers_given": 5,
                }],
            }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpProfileStore::new(config(&server.uri()));
    let profiles = store
        .find_by_account(&AccountId::new("u_1"))
        .await
        .unwrap();

    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].reputation, 10);
    assert_eq!(profiles[0].answers_given, 5);
}

#[tokio::test]
async fn test_create_profile_conflict_is_a_validation_failure() {
    // A profile-index conflict is a write rejection, NOT a duplicate
    // account — the saga must treat them differently.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/databases/answer-hub/collections/profiles/documents"))
        .respond_with(
            ResponseTemplate::new(409).set_body_string("index violation"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpProfileStore::new(config(&server.uri()));
    let result = store
        .create(NewProfile::for_account(AccountId::new("u_1")))
        .await;

    assert!(matches!(result, Err(ClientError::Validation(_))));
}
