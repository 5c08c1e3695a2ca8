//! HTTP client for SData service communication.
//!
//! This module provides the [`HttpClient`] type, the only component of the
//! crate that touches the network.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use parking_lot::RwLock;

use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{Credentials, SDataConfig};
use crate::error::ConfigError;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Authentication defaults applied to every request issued by a client.
///
/// A value of this type is never mutated; reconfiguring a client swaps in a
/// fresh `AuthDefaults` so that requests already in flight keep the snapshot
/// they started with.
#[derive(Clone, Debug, Default)]
pub struct AuthDefaults {
    credentials: Option<Credentials>,
    authorization: Option<String>,
}

impl AuthDefaults {
    /// Builds the defaults for the given credentials.
    #[must_use]
    pub fn new(credentials: Option<Credentials>) -> Self {
        let authorization = credentials.as_ref().map(|c| {
            let pair = format!("{}:{}", c.username.as_ref(), c.password.as_ref());
            format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode(pair)
            )
        });
        Self {
            credentials,
            authorization,
        }
    }

    /// Returns the configured credentials, if any.
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Returns the `Authorization` header value, if credentials are set.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}

/// HTTP client for making requests to an SData service.
///
/// The client handles:
/// - Default headers including User-Agent and Accept
/// - Basic authentication from the current [`AuthDefaults`]
/// - JSON encoding of request bodies and decoding of response bodies
///
/// Cloning is cheap and clones share the same authentication defaults, so a
/// reconfiguration through any clone affects requests issued afterwards by
/// all of them.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
#[derive(Clone, Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// Current authentication defaults; replaced wholesale on reconfiguration.
    auth: Arc<RwLock<Arc<AuthDefaults>>>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the underlying reqwest client
    /// cannot be created (e.g., TLS initialization failure).
    pub fn new(config: &SDataConfig) -> Result<Self, ConfigError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}SData Rust Client v{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ConfigError::HttpClient {
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            default_headers,
            auth: Arc::new(RwLock::new(Arc::new(AuthDefaults::new(
                config.credentials().cloned(),
            )))),
        })
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns a snapshot of the current authentication defaults.
    #[must_use]
    pub fn auth_defaults(&self) -> Arc<AuthDefaults> {
        Arc::clone(&self.auth.read())
    }

    /// Replaces the authentication defaults for all subsequent requests.
    pub fn set_credentials(&self, credentials: Option<Credentials>) {
        let defaults = Arc::new(AuthDefaults::new(credentials));
        *self.auth.write() = defaults;
    }

    /// Sends an HTTP request.
    ///
    /// Any status code yields `Ok`; only requests that never got a response
    /// fail.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - No response could be obtained (`Network`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let auth = self.auth_defaults();

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(authorization) = auth.authorization() {
            req_builder = req_builder.header("Authorization", authorization);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        tracing::debug!(method = %request.http_method, url = %request.url, "Sending SData request");

        let network_error = |source| HttpError::Network {
            url: request.url.clone(),
            source,
        };
        let res = req_builder.send().await.map_err(network_error)?;

        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await.map_err(network_error)?;

        tracing::trace!(url = %request.url, status = code, "Received SData response");

        Ok(HttpResponse::new(
            code,
            headers,
            HttpResponse::decode_body(&body_text),
        ))
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
