//! Authenticated JSON transport to the admin backend.
//!
//! # Security Note - Logging
//!
//! The bearer token is read from the credential store on every call and sent
//! in a header marked sensitive, so reqwest and hyper print it as `Sensitive`
//! in their own debug output. Nothing in this module logs it.

use std::fmt;
use std::time::Duration;

use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{BackofficeError, Result};
use crate::session::CredentialStore;

use super::envelope::is_soft_failure;
use super::error::{is_auth_rejection, request_failed, transport_failure};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A JSON response that passed status and envelope checks.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    credentials: CredentialStore,
    timeout: Duration,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `base_url` with the given request timeout.
    pub fn new(base_url: &str, credentials: CredentialStore, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            BackofficeError::Config(format!("invalid api_base_url '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BackofficeError::Config(format!(
                "api_base_url '{base_url}' cannot be used as a base URL"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| BackofficeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Resolve path segments (and query pairs) against the base URL.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                BackofficeError::Config(format!("invalid api_base_url '{}'", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send a request and return the checked JSON body.
    ///
    /// A 401 or 403 invalidates the session before failing with
    /// `Unauthorized`. Any other non-2xx status, or a 2xx body carrying
    /// `"status": false`, fails with `RequestFailed`.
    pub async fn send(&self, request: ApiRequest<'_>) -> Result<ApiResponse> {
        let url = self.url(request.path, request.query)?;
        let method = request.method;

        let mut builder = self
            .client
            .request(method.clone(), url)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));
        if request.authenticated
            && let Some(token) = self.credentials.token()?
        {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| {
                    BackofficeError::Other("stored token is not a valid header value".to_string())
                })?;
            value.set_sensitive(true);
            builder = builder.header(header::AUTHORIZATION, value);
        }
        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        let timeout_secs = self.timeout.as_secs();
        let response = builder.send().await.map_err(|e| {
            warn!(%method, path = request.path, "request failed: {e}");
            transport_failure(&e, timeout_secs)
        })?;

        let status = response.status();
        debug!(%method, path = request.path, status = status.as_u16(), "response received");

        if request.authenticated && is_auth_rejection(status) {
            self.credentials.invalidate()?;
            return Err(BackofficeError::Unauthorized);
        }

        let text = response
            .text()
            .await
            .map_err(|e| transport_failure(&e, timeout_secs))?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(Value::Null);
            return Err(request_failed(status, &body, request.failure_message));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                BackofficeError::InvalidResponse(format!(
                    "{method} {} returned a non-JSON body: {e}",
                    request.path
                ))
            })?
        };

        if is_soft_failure(&body) {
            return Err(request_failed(status, &body, request.failure_message));
        }

        Ok(ApiResponse { status, body })
    }
}

/// One backend call: method, path relative to the base URL, optional query
/// pairs and JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    pub method: Method,
    pub path: &'a str,
    pub query: &'a [(&'a str, &'a str)],
    pub body: Option<&'a Value>,
    /// Attach the bearer token and treat 401/403 as session expiry.
    pub authenticated: bool,
    /// Message for failures whose body carries none.
    pub failure_message: Option<&'a str>,
}

impl<'a> ApiRequest<'a> {
    pub fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            query: &[],
            body: None,
            authenticated: true,
            failure_message: None,
        }
    }

    pub fn get(path: &'a str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &'a str, body: &'a Value) -> Self {
        Self::new(Method::POST, path).json(body)
    }

    pub fn put(path: &'a str, body: &'a Value) -> Self {
        Self::new(Method::PUT, path).json(body)
    }

    pub fn delete(path: &'a str) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: &'a Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, query: &'a [(&'a str, &'a str)]) -> Self {
        self.query = query;
        self
    }

    pub fn failure_message(mut self, message: &'a str) -> Self {
        self.failure_message = Some(message);
        self
    }

    /// Send without credentials; used by sign-in.
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}
