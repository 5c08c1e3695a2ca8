//! Error types for SDK configuration.
//!
//! This module contains the errors raised while building an
//! [`SDataConfig`](crate::SDataConfig) or one of its validated newtypes.
//! Request-time failures live in [`crate::service::SDataError`].
//!
//! # Example
//!
//! ```rust
//! use sdata::{BaseUri, ConfigError};
//!
//! let result = BaseUri::new("");
//! assert!(matches!(result, Err(ConfigError::InvalidBaseUri { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The SData base URI is invalid.
    #[error("Invalid SData base URI '{uri}'. Expected an absolute URL such as 'http://host:3000/sdata/slx/dynamic/-/'.")]
    InvalidBaseUri {
        /// The invalid URI that was provided.
        uri: String,
    },

    /// Username cannot be empty.
    #[error("Username cannot be empty. Omit credentials entirely to send unauthenticated requests.")]
    EmptyUsername,

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The underlying HTTP client could not be created.
    #[error("Unable to create HTTP client: {reason}")]
    HttpClient {
        /// Why the client could not be built.
        reason: String,
    },
}
