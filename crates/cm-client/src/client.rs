//! High-level admin API client

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::{AuthApi, ModulesApi, RoleModulesApi, RolesApi, UsersApi};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::SessionStore;

/// Clinic admin API client
///
/// Every call is a single request: no retries, no caching. Authenticated
/// calls carry the stored bearer token; a 401 on one of them signs the
/// admin out.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<Config>,
    http_client: reqwest::Client,
    session: Arc<dyn SessionStore>,
}

impl Client {
    pub fn new(config: Config, session: Arc<dyn SessionStore>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.session.load(), Ok(Some(_)))
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn roles(&self) -> RolesApi<'_> {
        RolesApi::new(self)
    }

    pub fn modules(&self) -> ModulesApi<'_> {
        ModulesApi::new(self)
    }

    pub fn role_modules(&self) -> RoleModulesApi<'_> {
        RoleModulesApi::new(self)
    }

    /// Request builder for an endpoint that takes no session.
    pub(crate) fn public_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, self.config.url(path))
            .header(reqwest::header::ACCEPT, "*/*")
    }

    /// Request builder carrying the stored bearer token.
    pub(crate) fn authed_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let session = self.session.load()?.ok_or(Error::NotSignedIn)?;
        Ok(self.public_request(method, path).bearer_auth(session.token))
    }

    /// Send and deserialize a JSON body.
    pub(crate) async fn execute_json<T>(&self, request: RequestBuilder, authenticated: bool) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request, authenticated).await?;
        Ok(response.json().await?)
    }

    /// Send and deserialize a JSON array; any other payload reads as empty.
    pub(crate) async fn execute_list<T>(&self, request: RequestBuilder) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request, true).await?;
        let body: serde_json::Value = response.json().await?;
        match body {
            serde_json::Value::Array(_) => Ok(serde_json::from_value(body)?),
            other => {
                debug!(kind = json_kind(&other), "Expected a JSON array, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Send, discarding whatever body comes back.
    pub(crate) async fn execute_unit(&self, request: RequestBuilder, authenticated: bool) -> Result<()> {
        self.send(request, authenticated).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder, authenticated: bool) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if authenticated && status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected the session token, signing out");
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "Failed to clear expired session");
            }
            return Err(Error::SessionExpired);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Request rejected");
        Err(Error::from_status(status, &body))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
