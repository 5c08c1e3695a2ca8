//! HTTP response types for the SData client.

use std::collections::HashMap;

/// An HTTP response from an SData service.
///
/// Every status code produces an `HttpResponse`; deciding whether a status
/// is a failure belongs to the caller, which knows the status it expects.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, keyed by lowercase name (headers may repeat).
    pub headers: HashMap<String, Vec<String>>,
    /// The decoded response body.
    ///
    /// An empty body decodes to `null` and a body that is not JSON is kept
    /// as a JSON string holding the raw text.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Decodes raw response text into a JSON value.
    #[must_use]
    pub fn decode_body(text: &str) -> serde_json::Value {
        if text.trim().is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
    }
}
