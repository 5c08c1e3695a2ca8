//! SData error types and failure translation.
//!
//! Every failed SData call, whether it went through the CRUD operations on
//! [`SDataService`](crate::SDataService) or a paged [`FindStream`](crate::FindStream),
//! surfaces as one [`SDataError`]. [`translate_failure`] is the single place
//! where a raw failure (no response, or a response with an unexpected status)
//! becomes a typed error.
//!
//! # Example
//!
//! ```rust
//! use sdata::service::{translate_failure, Failure, SDataError};
//! use serde_json::json;
//!
//! let body = json!([{ "message": "AccountName is required", "severity": "Error" }]);
//! let error = translate_failure(&Failure::Response {
//!     url: "http://host/sdata/accounts?format=json",
//!     status: 400,
//!     body: &body,
//! });
//!
//! match error {
//!     SDataError::Protocol(e) => assert_eq!(e.message, "AccountName is required"),
//!     other => panic!("unexpected {other}"),
//! }
//! ```

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::clients::{HttpError, InvalidHttpRequestError};

/// Leading text of the catch-all message SData returns for unhandled server faults.
pub const GENERIC_SERVER_ERROR_PREFIX: &str = "We're sorry, you've encountered an error";

/// Suffix appended to [`GENERIC_SERVER_ERROR_PREFIX`] messages.
pub const GENERIC_SERVER_ERROR_HINT: &str = " (this is a generic SData error and may indicate corrupted memory.  Check server event log and restart application pool if applicable)";

/// Message used for authentication failures.
pub const AUTHENTICATION_FAILED_MESSAGE: &str = "Authentication failed";

/// Message used when a failure cannot be classified.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown SData error";

/// One entry of an SData error payload.
///
/// SData reports application errors as a JSON array of these objects.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnosis {
    /// Human-readable description.
    pub message: Option<String>,
    /// Severity, e.g. `Error` or `Warning`.
    pub severity: Option<String>,
    /// SData protocol error code, e.g. `BadWhereSyntax`.
    pub sdata_code: Option<String>,
    /// Application-specific error code.
    pub application_code: Option<String>,
    /// Path of the offending field within the payload.
    pub payload_path: Option<String>,
    /// Server-side stack trace, when the server exposes one.
    pub stack_trace: Option<String>,
}

impl Diagnosis {
    /// Reads a diagnosis out of a JSON value.
    ///
    /// Non-string scalars (numeric application codes are common) are
    /// formatted; anything else is treated as absent.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| match value.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        };
        Self {
            message: field("message"),
            severity: field("severity"),
            sdata_code: field("sdataCode"),
            application_code: field("applicationCode"),
            payload_path: field("payloadPath"),
            stack_trace: field("stackTrace"),
        }
    }
}

/// A structured application error returned by an SData server.
///
/// Built from the first diagnosis of the error payload; the full list is
/// kept in [`diagnoses`](Self::diagnoses).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolError {
    /// Error description, possibly followed by [`GENERIC_SERVER_ERROR_HINT`].
    pub message: String,
    /// Severity of the first diagnosis.
    pub severity: Option<String>,
    /// SData protocol error code.
    pub sdata_code: Option<String>,
    /// Application-specific error code.
    pub application_code: Option<String>,
    /// Path of the offending field.
    pub payload_path: Option<String>,
    /// Server-side stack trace.
    pub stack_trace: Option<String>,
    /// HTTP status of the response.
    pub status: u16,
    /// Every diagnosis the server returned.
    pub diagnoses: Vec<Diagnosis>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SData Error: {}", self.message)?;
        if let Some(code) = &self.sdata_code {
            write!(f, " ({code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

/// Unified error type for SData operations.
///
/// The first four variants are produced by [`translate_failure`]. The last
/// three are raised locally, before a request is sent or after a successful
/// response turned out to have the wrong shape.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SDataError {
    /// No response was obtained from the server.
    #[error("{message}")]
    Connection {
        /// The URL that was being requested.
        url: String,
        /// Description of the transport failure, including the URL.
        message: String,
    },

    /// The server rejected the credentials (HTTP 401).
    #[error("Authentication failed")]
    Authentication {
        /// The URL that was being requested.
        url: String,
    },

    /// The server returned a structured SData error payload.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The failure could not be classified.
    #[error("Unknown SData error")]
    Unknown {
        /// HTTP status of the response.
        status: u16,
        /// The URL that was being requested.
        url: String,
    },

    /// The request was rejected before being sent.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// A single-record operation was attempted on a record without `$key`.
    #[error("Record for '{resource_kind}' has no $key")]
    MissingKey {
        /// The resource kind of the operation.
        resource_kind: String,
    },

    /// A successful response did not have the expected shape.
    #[error("Unexpected SData response from {url}: {message}")]
    Deserialize {
        /// The URL that was requested.
        url: String,
        /// What was wrong with the body.
        message: String,
    },
}

impl SDataError {
    /// Returns the HTTP status code, if a response was received.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Protocol(e) => Some(e.status),
            Self::Unknown { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Converts an executor error into an `SDataError`.
    ///
    /// Transport failures go through [`translate_failure`].
    #[must_use]
    pub fn from_http_error(error: &HttpError) -> Self {
        match error {
            HttpError::InvalidRequest(e) => Self::InvalidRequest(e.clone()),
            HttpError::Network { url, source } => translate_failure(&Failure::NoResponse {
                url,
                reason: &error_chain(source),
            }),
        }
    }
}

/// A raw failure, as observed before classification.
#[derive(Clone, Copy, Debug)]
pub enum Failure<'a> {
    /// No response was received.
    NoResponse {
        /// The URL that was being requested.
        url: &'a str,
        /// Description of the transport failure.
        reason: &'a str,
    },
    /// A response arrived with a status other than the expected one.
    Response {
        /// The URL that was requested.
        url: &'a str,
        /// HTTP status code.
        status: u16,
        /// Decoded response body.
        body: &'a Value,
    },
}

/// Turns a raw failure into exactly one [`SDataError`].
///
/// Classification order:
/// 1. no response: [`SDataError::Connection`]
/// 2. status 401: [`SDataError::Authentication`]
/// 3. a non-empty JSON array body: [`SDataError::Protocol`] from the first element
/// 4. anything else: [`SDataError::Unknown`]
///
/// This function performs no I/O.
#[must_use]
pub fn translate_failure(failure: &Failure<'_>) -> SDataError {
    match *failure {
        Failure::NoResponse { url, reason } => SDataError::Connection {
            url: url.to_string(),
            message: format!("Unable to connect to {url}: {reason}"),
        },
        Failure::Response { url, status: 401, .. } => SDataError::Authentication {
            url: url.to_string(),
        },
        Failure::Response { url, status, body } => match body.as_array() {
            Some(items) if !items.is_empty() => {
                SDataError::Protocol(protocol_error(status, items))
            }
            _ => SDataError::Unknown {
                status,
                url: url.to_string(),
            },
        },
    }
}

fn protocol_error(status: u16, items: &[Value]) -> ProtocolError {
    let diagnoses: Vec<Diagnosis> = items.iter().map(Diagnosis::from_value).collect();
    let first = diagnoses[0].clone();

    let mut message = first
        .message
        .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
    if message.starts_with(GENERIC_SERVER_ERROR_PREFIX) {
        message.push_str(GENERIC_SERVER_ERROR_HINT);
    }

    ProtocolError {
        message,
        severity: first.severity,
        sdata_code: first.sdata_code,
        application_code: first.application_code,
        payload_path: first.payload_path,
        stack_trace: first.stack_trace,
        status,
        diagnoses,
    }
}

/// Flattens an error and its sources into one line.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "http://host/sdata/accounts?format=json";

    fn response(status: u16, body: &Value) -> SDataError {
        translate_failure(&Failure::Response {
            url: URL,
            status,
            body,
        })
    }

    #[test]
    fn test_no_response_is_connection_error() {
        let error = translate_failure(&Failure::NoResponse {
            url: URL,
            reason: "connection refused",
        });

        assert_eq!(
            error,
            SDataError::Connection {
                url: URL.to_string(),
                message: format!("Unable to connect to {URL}: connection refused"),
            }
        );
        assert!(error.to_string().contains("host"));
        assert_eq!(error.status_code(), None);
    }

    #[test]
    fn test_401_is_authentication_error_regardless_of_body() {
        for body in [json!(null), json!([{"message": "denied"}]), json!("Unauthorized")] {
            let error = response(401, &body);
            assert!(matches!(error, SDataError::Authentication { .. }));
            assert_eq!(error.to_string(), AUTHENTICATION_FAILED_MESSAGE);
            assert_eq!(error.status_code(), Some(401));
        }
    }

    #[test]
    fn test_array_body_is_protocol_error_from_first_element() {
        let body = json!([
            {
                "message": "Invalid where clause",
                "severity": "Error",
                "sdataCode": "BadWhereSyntax",
                "applicationCode": 1001,
                "payloadPath": "where"
            },
            { "message": "second", "severity": "Warning" }
        ]);

        let SDataError::Protocol(error) = response(400, &body) else {
            panic!("expected protocol error");
        };

        assert_eq!(error.message, "Invalid where clause");
        assert_eq!(error.severity.as_deref(), Some("Error"));
        assert_eq!(error.sdata_code.as_deref(), Some("BadWhereSyntax"));
        assert_eq!(error.application_code.as_deref(), Some("1001"));
        assert_eq!(error.payload_path.as_deref(), Some("where"));
        assert_eq!(error.status, 400);
        assert_eq!(error.diagnoses.len(), 2);
        assert_eq!(
            error.to_string(),
            "SData Error: Invalid where clause (BadWhereSyntax)"
        );
    }

    #[test]
    fn test_diagnosis_reads_scalars_and_skips_structures() {
        let diagnosis = Diagnosis::from_value(&json!({
            "message": "Bad value",
            "applicationCode": 42,
            "severity": true,
            "payloadPath": { "path": "Address/City" },
            "stackTrace": null
        }));

        assert_eq!(diagnosis.message.as_deref(), Some("Bad value"));
        assert_eq!(diagnosis.application_code.as_deref(), Some("42"));
        assert_eq!(diagnosis.severity.as_deref(), Some("true"));
        assert_eq!(diagnosis.payload_path, None);
        assert_eq!(diagnosis.stack_trace, None);
        assert_eq!(diagnosis.sdata_code, None);
    }

    #[test]
    fn test_generic_server_error_gets_hint() {
        let body = json!([{
            "message": "We're sorry, you've encountered an error. If applicable, please try again."
        }]);

        let SDataError::Protocol(error) = response(500, &body) else {
            panic!("expected protocol error");
        };

        assert!(error.message.starts_with(GENERIC_SERVER_ERROR_PREFIX));
        assert!(error.message.ends_with(GENERIC_SERVER_ERROR_HINT));
        assert!(error.message.contains("restart application pool"));
    }

    #[test]
    fn test_other_messages_do_not_get_hint() {
        let body = json!([{ "message": "Sorry, we're closed" }]);
        let SDataError::Protocol(error) = response(500, &body) else {
            panic!("expected protocol error");
        };
        assert_eq!(error.message, "Sorry, we're closed");
        assert_eq!(error.to_string(), "SData Error: Sorry, we're closed");
    }

    #[test]
    fn test_unclassified_bodies_are_unknown_errors() {
        for body in [json!(null), json!({}), json!([]), json!("<html/>"), json!({"message": "x"})] {
            let error = response(500, &body);
            assert_eq!(
                error,
                SDataError::Unknown {
                    status: 500,
                    url: URL.to_string()
                }
            );
            assert_eq!(error.to_string(), UNKNOWN_ERROR_MESSAGE);
        }
    }

    #[test]
    fn test_unexpected_success_status_is_unknown_error() {
        let error = response(204, &json!(null));
        assert_eq!(error.status_code(), Some(204));
    }

    #[test]
    fn test_from_http_error_keeps_invalid_request() {
        let error = SDataError::from_http_error(&HttpError::InvalidRequest(
            InvalidHttpRequestError::MissingUrl,
        ));
        assert_eq!(
            error,
            SDataError::InvalidRequest(InvalidHttpRequestError::MissingUrl)
        );
    }

    #[test]
    fn test_error_chain_joins_sources() {
        #[derive(Debug)]
        struct Outer(std::io::Error);
        impl fmt::Display for Outer {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("error sending request")
            }
        }
        impl std::error::Error for Outer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let error = Outer(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(
            error_chain(&error),
            "error sending request: connection refused"
        );
    }
}
