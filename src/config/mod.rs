//! Configuration types for the SData client.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`SDataConfig`]: The configuration struct holding all client settings
//! - [`SDataConfigBuilder`]: A builder for constructing [`SDataConfig`] instances
//! - [`BaseUri`]: A validated service base URI
//! - [`Credentials`], [`Username`], [`Password`]: Basic authentication values
//!
//! # Example
//!
//! ```rust
//! use sdata::{SDataConfig, BaseUri, Credentials};
//! use std::time::Duration;
//!
//! let config = SDataConfig::builder()
//!     .base_uri(BaseUri::new("http://localhost:3012/sdata/slx/dynamic/-/").unwrap())
//!     .credentials(Credentials::new("admin", "").unwrap())
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;

pub use newtypes::{BaseUri, Credentials, Password, Username};

use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for an SData service instance.
///
/// # Thread Safety
///
/// `SDataConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct SDataConfig {
    base_uri: BaseUri,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl SDataConfig {
    /// Creates a new builder for constructing an `SDataConfig`.
    #[must_use]
    pub fn builder() -> SDataConfigBuilder {
        SDataConfigBuilder::new()
    }

    /// Returns the service base URI.
    #[must_use]
    pub const fn base_uri(&self) -> &BaseUri {
        &self.base_uri
    }

    /// Returns the initial credentials, if configured.
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Returns the request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify SDataConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SDataConfig>();
};

/// Builder for constructing [`SDataConfig`] instances.
///
/// `base_uri` is required. Everything else is optional:
///
/// - `credentials`: `None` (requests are sent without an `Authorization` header)
/// - `timeout`: `None` (reqwest's default, no overall timeout)
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct SDataConfigBuilder {
    base_uri: Option<BaseUri>,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl SDataConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service base URI (required).
    #[must_use]
    pub fn base_uri(mut self, base_uri: BaseUri) -> Self {
        self.base_uri = Some(base_uri);
        self
    }

    /// Sets the initial Basic authentication credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets an overall per-request timeout.
    ///
    /// A request that times out is reported as a connection failure.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`SDataConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_uri` is not set.
    pub fn build(self) -> Result<SDataConfig, ConfigError> {
        let base_uri = self
            .base_uri
            .ok_or(ConfigError::MissingRequiredField { field: "base_uri" })?;

        Ok(SDataConfig {
            base_uri,
            credentials: self.credentials,
            timeout: self.timeout,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
