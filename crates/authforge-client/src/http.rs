//! REST implementations of the client traits using `reqwest`.
//!
//! The identity provider exposes an `/account` surface (accounts and
//! sessions) and the profile store a `/databases/.../documents` surface.
//! Every request carries the project id header; requests made on behalf of
//! a user forward their cookies verbatim, so the provider — not this
//! client — judges the session behind them.
//!
//! Every operation runs under the configured [`CallPolicy`]: bounded
//! timeout per attempt, one retry on transient failures.

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use authforge_model::{
    Account, AccountId, CookieSet, NewAccount, NewProfile, Profile, Session,
};

use crate::{call_with_policy, CallPolicy, ClientError, IdentityProvider, ProfileStore};

/// Header naming the project the request belongs to.
pub const PROJECT_HEADER: &str = "X-Identity-Project";

/// Header carrying the server-side API key, when one is configured.
pub const API_KEY_HEADER: &str = "X-Identity-Key";

/// Connection settings shared by the REST clients.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the provider, e.g. `https://id.example.com/v1`.
    pub endpoint: String,
    /// Project id sent with every request.
    pub project_id: String,
    /// Server-side API key for trusted calls (the profile store). `None`
    /// for clients acting purely on user credentials.
    pub api_key: Option<String>,
    /// Database holding the profile collection.
    pub database_id: String,
    /// Collection holding the profile documents.
    pub profile_collection_id: String,
    /// Timeout and retry settings applied to every call.
    pub policy: CallPolicy,
}

fn into_network(error: reqwest::Error) -> ClientError {
    ClientError::Network(error.to_string())
}

/// Maps a non-success response to the error taxonomy.
///
/// 401/403 collapse to [`ClientError::SessionInvalid`] without detail; the
/// caller must not be able to tell *why* a credential failed.
async fn reject(status: StatusCode, response: Response) -> ClientError {
    let detail = response.text().await.unwrap_or_default();
    match status.as_u16() {
        401 | 403 => ClientError::SessionInvalid,
        code if code >= 500 => {
            ClientError::Network(format!("provider returned status {code}"))
        }
        code => {
            if detail.is_empty() {
                ClientError::Validation(format!(
                    "provider returned status {code}"
                ))
            } else {
                ClientError::Validation(detail)
            }
        }
    }
}

async fn decode<T: DeserializeOwned>(
    response: Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(reject(status, response).await);
    }
    response.json::<T>().await.map_err(|error| {
        ClientError::Validation(format!(
            "malformed provider response: {error}"
        ))
    })
}

// ---------------------------------------------------------------------------
// HttpIdentityProvider
// ---------------------------------------------------------------------------

/// An [`IdentityProvider`] speaking REST to the real provider.
pub struct HttpIdentityProvider {
    config: HttpConfig,
    http: reqwest::Client,
}

impl HttpIdentityProvider {
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Starts a request with the project header, the API key when
    /// configured, and the user's cookies forwarded verbatim.
    fn request(
        &self,
        method: Method,
        url: &str,
        credentials: &CookieSet,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header(PROJECT_HEADER, &self.config.project_id);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }
        if let Some(cookie_header) = credentials.header() {
            builder = builder.header(reqwest::header::COOKIE, cookie_header);
        }
        builder
    }
}

impl IdentityProvider for HttpIdentityProvider {
    async fn create_account(
        &self,
        new_account: &NewAccount,
    ) -> Result<Account, ClientError> {
        let url = format!("{}/account", self.config.endpoint);
        let body = serde_json::json!({
            "email": new_account.email,
            "password": new_account.password,
            "name": new_account.name,
        });

        call_with_policy(&self.config.policy, || {
            let request = self
                .request(Method::POST, &url, &CookieSet::new())
                .json(&body);
            async move {
                let response = request.send().await.map_err(into_network)?;
                // The one status the saga reports specifically.
                if response.status() == StatusCode::CONFLICT {
                    return Err(ClientError::DuplicateAccount);
                }
                decode(response).await
            }
        })
        .await
    }

    async fn create_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let url = format!("{}/account/sessions/email", self.config.endpoint);
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        call_with_policy(&self.config.policy, || {
            let request = self
                .request(Method::POST, &url, &CookieSet::new())
                .json(&body);
            async move {
                let response = request.send().await.map_err(into_network)?;
                decode(response).await
            }
        })
        .await
    }

    async fn get_current_account(
        &self,
        credentials: &CookieSet,
    ) -> Result<Account, ClientError> {
        let url = format!("{}/account", self.config.endpoint);

        call_with_policy(&self.config.policy, || {
            let request = self.request(Method::GET, &url, credentials);
            async move {
                let response = request.send().await.map_err(into_network)?;
                decode(response).await
            }
        })
        .await
    }

    async fn get_session(
        &self,
        credentials: &CookieSet,
        session_id: &str,
    ) -> Result<Session, ClientError> {
        let url = format!(
            "{}/account/sessions/{session_id}",
            self.config.endpoint
        );

        call_with_policy(&self.config.policy, || {
            let request = self.request(Method::GET, &url, credentials);
            async move {
                let response = request.send().await.map_err(into_network)?;
                decode(response).await
            }
        })
        .await
    }

    async fn delete_session(
        &self,
        credentials: &CookieSet,
        session_id: &str,
    ) -> Result<(), ClientError> {
        let url = format!(
            "{}/account/sessions/{session_id}",
            self.config.endpoint
        );

        call_with_policy(&self.config.policy, || {
            let request = self.request(Method::DELETE, &url, credentials);
            async move {
                let response = request.send().await.map_err(into_network)?;
                let status = response.status();
                if status.is_success() {
                    Ok(())
                } else {
                    Err(reject(status, response).await)
                }
            }
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// HttpProfileStore
// ---------------------------------------------------------------------------

/// The document-list envelope the store wraps query results in.
#[derive(Debug, Deserialize)]
struct DocumentList {
    documents: Vec<Profile>,
}

/// A [`ProfileStore`] speaking REST to the document store.
pub struct HttpProfileStore {
    config: HttpConfig,
    http: reqwest::Client,
}

impl HttpProfileStore {
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint,
            self.config.database_id,
            self.config.profile_collection_id
        )
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header(PROJECT_HEADER, &self.config.project_id);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }
        builder
    }
}

impl ProfileStore for HttpProfileStore {
    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Profile>, ClientError> {
        let url = self.documents_url();

        let list: DocumentList =
            call_with_policy(&self.config.policy, || {
                let request = self
                    .request(Method::GET, &url)
                    .query(&[("account_id", account_id.as_str())]);
                async move {
                    let response =
                        request.send().await.map_err(into_network)?;
                    decode(response).await
                }
            })
            .await?;
        Ok(list.documents)
    }

    async fn create(
        &self,
        new_profile: NewProfile,
    ) -> Result<Profile, ClientError> {
        let url = self.documents_url();

        call_with_policy(&self.config.policy, || {
            let request =
                self.request(Method::POST, &url).json(&new_profile);
            async move {
                let response = request.send().await.map_err(into_network)?;
                decode(response).await
            }
        })
        .await
    }
}
