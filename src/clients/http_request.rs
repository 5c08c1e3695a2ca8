//! HTTP request types for the SData client.
//!
//! This module provides the [`HttpRequest`] type and its builder. Requests
//! carry a fully-formed URL: SData continuation links (`$next`) are absolute,
//! so the executor never rewrites paths.

use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used by the SData protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for reading feeds and entries.
    Get,
    /// HTTP POST method for creating entries and invoking business rules.
    Post,
    /// HTTP PUT method for updating entries.
    Put,
    /// HTTP DELETE method for removing entries.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// An HTTP request to be sent to an SData service.
///
/// # Example
///
/// ```rust
/// use sdata::clients::{HttpRequest, HttpMethod};
/// use serde_json::json;
///
/// let get_request = HttpRequest::builder(HttpMethod::Get, "http://host/sdata/accounts?format=json")
///     .build()
///     .unwrap();
///
/// let post_request = HttpRequest::builder(HttpMethod::Post, "http://host/sdata/accounts?format=json")
///     .body(json!({"AccountName": "Abbott Ltd."}))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The absolute URL for this request.
    pub url: String,
    /// The JSON request body, if any.
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, url)
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - the URL is empty
    /// - `http_method` is `Post` or `Put` but `body` is `None`
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.url.is_empty() {
            return Err(InvalidHttpRequestError::MissingUrl);
        }

        if matches!(self.http_method, HttpMethod::Post | HttpMethod::Put) && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    url: String,
    body: Option<serde_json::Value>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            http_method: method,
            url: url.into(),
            body: None,
        }
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            url: self.url,
            body: self.body,
        };
        request.verify()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "http://host/sdata/accounts?format=json";

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_builder_creates_valid_get_request() {
        let request = HttpRequest::builder(HttpMethod::Get, URL).build().unwrap();

        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(request.url, URL);
        assert!(request.body.is_none());
    }

    #[test]
    fn test_builder_creates_valid_post_request() {
        let request = HttpRequest::builder(HttpMethod::Post, URL)
            .body(json!({"AccountName": "Test"}))
            .build()
            .unwrap();

        assert_eq!(request.http_method, HttpMethod::Post);
        assert_eq!(request.body, Some(json!({"AccountName": "Test"})));
    }

    #[test]
    fn test_verify_requires_body_for_post_and_put() {
        let result = HttpRequest::builder(HttpMethod::Post, URL).build();
        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::MissingBody { method }) if method == "POST"
        ));

        let result = HttpRequest::builder(HttpMethod::Put, URL).build();
        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::MissingBody { method }) if method == "PUT"
        ));
    }

    #[test]
    fn test_delete_does_not_require_body() {
        assert!(HttpRequest::builder(HttpMethod::Delete, URL).build().is_ok());
    }

    #[test]
    fn test_verify_rejects_empty_url() {
        let result = HttpRequest::builder(HttpMethod::Get, "").build();
        assert!(matches!(result, Err(InvalidHttpRequestError::MissingUrl)));
    }
}
