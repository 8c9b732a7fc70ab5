use std::fmt;

use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use super::registry::ProviderKind;
use crate::error::ConnectError;

/// HTTP client for one provider's API.
///
/// Built without a token it can only make public calls; built from a stored
/// connection it sends the decrypted access token as a bearer credential.
/// Only bearer authentication is supported; OAuth 1.0a request signing is not.
pub struct ProviderClient {
    kind: ProviderKind,
    base_url: String,
    access_token: Option<String>,
    http: reqwest::Client,
}

impl ProviderClient {
    pub fn unauthenticated(kind: ProviderKind) -> Self {
        Self {
            kind,
            base_url: kind.spec().api_base_url.to_string(),
            access_token: None,
            http: reqwest::Client::new(),
        }
    }

    pub(crate) fn authorized(kind: ProviderKind, access_token: String) -> Self {
        Self {
            access_token: Some(access_token),
            ..Self::unauthenticated(kind)
        }
    }

    /// Point the client at another API root (a proxy or a local stand-in).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn is_authorized(&self) -> bool {
        self.access_token.is_some()
    }

    /// Resolve an API path against the client's base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConnectError> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&url)
            .map_err(|e| ConnectError::Provider(format!("Invalid API path {path}: {e}")))
    }

    /// Start a request, adding the bearer token when authorized.
    pub fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, ConnectError> {
        let builder = self.http.request(method, self.endpoint(path)?);
        Ok(match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConnectError> {
        let resp = self.request(Method::GET, path)?.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ConnectError::Provider(format!(
                "{} request {path} failed ({status}): {body}",
                self.kind.display_name()
            )));
        }

        resp.json()
            .await
            .map_err(|e| ConnectError::Provider(format!("Failed to parse response: {e}")))
    }
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
