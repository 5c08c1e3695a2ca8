//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated SData service base URI.
///
/// Resource URLs are built by plain concatenation (`<base><resourceKind>`),
/// so the stored value always ends with `/`.
///
/// # Example
///
/// ```rust
/// use sdata::BaseUri;
///
/// let uri = BaseUri::new("http://localhost:3000/sdata/slx/dynamic/-").unwrap();
/// assert_eq!(uri.as_ref(), "http://localhost:3000/sdata/slx/dynamic/-/");
/// assert_eq!(uri.scheme(), "http");
/// assert_eq!(uri.host_name(), "localhost");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUri {
    uri: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
}

impl BaseUri {
    /// Creates a new validated base URI.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUri`] if the URI has no `http` or
    /// `https` scheme, or no host.
    pub fn new(uri: impl Into<String>) -> Result<Self, ConfigError> {
        let uri = uri.into();
        let mut uri = uri.trim().to_string();
        let invalid = |uri: &str| ConfigError::InvalidBaseUri {
            uri: uri.to_string(),
        };

        let scheme_end = uri.find("://").ok_or_else(|| invalid(&uri))?;
        let scheme = uri[..scheme_end].to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(invalid(&uri));
        }

        let host_start = scheme_end + 3;
        let remainder = &uri[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(uri.len(), |i| host_start + i);
        if host_end == host_start {
            return Err(invalid(&uri));
        }

        if uri.contains(['?', '#']) {
            return Err(invalid(&uri));
        }

        if !uri.ends_with('/') {
            uri.push('/');
        }

        Ok(Self {
            uri,
            scheme_end,
            host_start,
            host_end,
        })
    }

    /// Returns the URI scheme (`http` or `https`).
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.uri[..self.scheme_end]
    }

    /// Returns the host name portion of the URI.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.uri[self.host_start..self.host_end]
    }

    /// Joins a relative path onto the base URI.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.uri, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for BaseUri {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for BaseUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl Serialize for BaseUri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.uri)
    }
}

impl<'de> Deserialize<'de> for BaseUri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated SData username.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Creates a new validated username.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUsername`] if the username is empty.
    pub fn new(username: impl Into<String>) -> Result<Self, ConfigError> {
        let username = username.into();
        if username.is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An SData password.
///
/// Empty passwords are allowed; SData deployments commonly ship an `admin`
/// account without one.
///
/// # Security
///
/// The `Debug` implementation masks the value, displaying only
/// `Password(*****)`.
///
/// ```rust
/// use sdata::Password;
///
/// let password = Password::new("hunter2");
/// assert_eq!(format!("{:?}", password), "Password(*****)");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Creates a new password.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

impl AsRef<str> for Password {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(*****)")
    }
}

/// A username and password pair used for Basic authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    /// The account name.
    pub username: Username,
    /// The account password.
    pub password: Password,
}

impl Credentials {
    /// Creates credentials from raw strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUsername`] if `username` is empty.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_uri_appends_trailing_slash() {
        let uri = BaseUri::new("http://localhost:3012/sdata/slx/dynamic/-").unwrap();
        assert_eq!(uri.as_ref(), "http://localhost:3012/sdata/slx/dynamic/-/");

        let uri = BaseUri::new("http://localhost:3012/sdata/slx/dynamic/-/").unwrap();
        assert_eq!(uri.as_ref(), "http://localhost:3012/sdata/slx/dynamic/-/");
    }

    #[test]
    fn test_base_uri_parts() {
        let uri = BaseUri::new("https://crm.example.com:8443/sdata/").unwrap();
        assert_eq!(uri.scheme(), "https");
        assert_eq!(uri.host_name(), "crm.example.com");
    }

    #[test]
    fn test_base_uri_rejects_invalid() {
        assert!(BaseUri::new("").is_err());
        assert!(BaseUri::new("crm.example.com/sdata").is_err());
        assert!(BaseUri::new("ftp://crm.example.com/").is_err());
        assert!(BaseUri::new("http://").is_err());
        assert!(BaseUri::new("http:///sdata").is_err());
        assert!(BaseUri::new("http://host/sdata?format=json").is_err());
    }

    #[test]
    fn test_base_uri_join() {
        let uri = BaseUri::new("http://host/sdata").unwrap();
        assert_eq!(uri.join("accounts"), "http://host/sdata/accounts");
        assert_eq!(uri.join("/accounts"), "http://host/sdata/accounts");
    }

    #[test]
    fn test_base_uri_deserializes_and_normalizes() {
        let uri: BaseUri = serde_json::from_str(r#""http://host/sdata""#).unwrap();
        assert_eq!(uri.as_ref(), "http://host/sdata/");

        let result: Result<BaseUri, _> = serde_json::from_str(r#""nope""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_username_rejects_empty_string() {
        assert!(matches!(Username::new(""), Err(ConfigError::EmptyUsername)));
    }

    #[test]
    fn test_password_masks_value_in_debug() {
        let password = Password::new("super-secret");
        let debug_output = format!("{password:?}");
        assert_eq!(debug_output, "Password(*****)");

        let credentials = Credentials::new("admin", "super-secret").unwrap();
        assert!(!format!("{credentials:?}").contains("super-secret"));
    }

    #[test]
    fn test_credentials_allow_empty_password() {
        let credentials = Credentials::new("admin", "").unwrap();
        assert_eq!(credentials.username.as_ref(), "admin");
        assert_eq!(credentials.password.as_ref(), "");
    }
}
