//! HTTP client types for SData service communication.
//!
//! This module is the request executor: it issues exactly one HTTP call per
//! [`HttpRequest`] with the configured authentication and JSON handling, and
//! returns the status code and decoded body for any response.
//!
//! # Overview
//!
//! - [`HttpClient`]: The async HTTP client
//! - [`HttpRequest`]: A request to be sent
//! - [`HttpResponse`]: A decoded response
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`AuthDefaults`]: The swappable authentication snapshot
//!
//! # Example
//!
//! ```rust,ignore
//! use sdata::clients::{HttpClient, HttpRequest, HttpMethod};
//!
//! let client = HttpClient::new(&config)?;
//! let request = HttpRequest::builder(HttpMethod::Get, "http://host/sdata/accounts?format=json")
//!     .build()?;
//!
//! let response = client.request(request).await?;
//! println!("{}: {}", response.code, response.body);
//! ```
//!
//! # Retry Behavior
//!
//! Requests are never retried. Retry policy is left to the caller.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, InvalidHttpRequestError};
pub use http_client::{AuthDefaults, HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
