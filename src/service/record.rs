//! SData payload types: records and listing pages.
//!
//! SData reserves `$`-prefixed JSON fields for protocol metadata. A
//! [`Record`] is an open mapping of field name to value whose only reserved
//! field is `$key`; a [`PageEnvelope`] is the body of one listing response.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved field holding a record's identifier.
pub const KEY_FIELD: &str = "$key";

/// A single SData record.
///
/// `Record` derefs to the underlying [`serde_json::Map`], so the usual map
/// methods (`get`, `insert`, `contains_key`, iteration) are available directly.
///
/// # Example
///
/// ```rust
/// use sdata::Record;
/// use serde_json::json;
///
/// let record = Record::new()
///     .with("AccountName", json!("Abbott Ltd."))
///     .with("$key", json!("AA2EK0013024"));
///
/// assert_eq!(record.key().as_deref(), Some("AA2EK0013024"));
/// assert_eq!(record["AccountName"], "Abbott Ltd.");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, returning the record for chaining.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns the record identifier as a string.
    ///
    /// String keys are returned as-is and numeric keys are formatted; any
    /// other shape yields `None`.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        match self.0.get(KEY_FIELD)? {
            Value::String(key) => Some(key.clone()),
            Value::Number(key) => Some(key.to_string()),
            _ => None,
        }
    }

    /// Returns `true` if `$key` is present and truthy.
    ///
    /// Truthiness follows JSON-client conventions: `null`, `false`, `0` and
    /// the empty string are falsy.
    #[must_use]
    pub fn has_key(&self) -> bool {
        self.0.get(KEY_FIELD).is_some_and(is_truthy)
    }

    /// Consumes the record and returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl Deref for Record {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Record {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Object(record.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The body of one SData listing response.
///
/// Absence of a continuation reference (`$next`) marks the final page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope {
    /// The records on this page, in server order.
    #[serde(rename = "$resources", default)]
    pub resources: Vec<Record>,

    /// Continuation reference to the next page, as sent by the server.
    #[serde(rename = "$next", default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Value>,

    /// Total number of records matching the query.
    #[serde(
        rename = "$totalResults",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_results: Option<u64>,

    /// One-based index of the first record on this page.
    #[serde(rename = "$startIndex", default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u64>,

    /// Page size used by the server.
    #[serde(
        rename = "$itemsPerPage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub items_per_page: Option<u64>,

    /// Any other top-level fields (`$url`, `$descriptor`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageEnvelope {
    /// Returns the URL of the next page, if any.
    ///
    /// The continuation may be a plain URL string or a link object carrying
    /// the URL under `$url`, `href` or `url`. Empty values count as absent.
    #[must_use]
    pub fn next_url(&self) -> Option<&str> {
        let url = match self.next.as_ref()? {
            Value::String(url) => url.as_str(),
            Value::Object(link) => ["$url", "href", "url"]
                .iter()
                .find_map(|field| link.get(*field).and_then(Value::as_str))?,
            _ => return None,
        };
        (!url.is_empty()).then_some(url)
    }

    /// Returns `true` if this is the last page of the result set.
    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.next_url().is_none()
    }
}
