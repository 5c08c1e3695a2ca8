//! HTTP-specific error types for the SData client.
//!
//! The request executor only fails when no response could be obtained, or
//! when a request is rejected before it is sent. Any status code, including
//! 4xx and 5xx, is a successful exchange at this layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use sdata::clients::{HttpClient, HttpError};
//!
//! match client.request(request).await {
//!     Ok(response) => println!("{}: {}", response.code, response.body),
//!     Err(HttpError::Network { url, source }) => println!("{url} unreachable: {source}"),
//!     Err(HttpError::InvalidRequest(e)) => println!("Invalid request: {e}"),
//! }
//! ```

use thiserror::Error;

/// Error returned when an HTTP request fails validation.
///
/// # Example
///
/// ```rust
/// use sdata::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::MissingBody {
///     method: "POST".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Cannot use POST without specifying data.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// The request URL is empty.
    #[error("Cannot send a request without a URL.")]
    MissingUrl,
}

/// Unified error type for the request executor.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// No response was obtained (DNS failure, refused connection, timeout).
    #[error("Network error for {url}: {source}")]
    Network {
        /// The URL that was being requested.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },
}
