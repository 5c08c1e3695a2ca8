//! Query options and SData URL construction.
//!
//! Every SData URL carries `format=json`. Filter expressions and option
//! values are percent-encoded per RFC 3986, so spaces become `%20`: SData
//! servers cannot parse `+` as a space.

use std::fmt;

use crate::config::BaseUri;

/// A recognised SData query option.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryOption {
    /// `select`: comma-separated list of properties to return.
    Select,
    /// `include`: related resources to embed.
    Include,
    /// `orderBy`: sort expression.
    OrderBy,
    /// `count`: page size.
    Count,
    /// `startIndex`: one-based index of the first record.
    StartIndex,
    /// `where`: filter expression. Takes precedence over a separately
    /// supplied filter.
    Where,
    /// Any other option, passed through verbatim.
    Custom(String),
}

impl QueryOption {
    /// Maps a query-string key onto a recognised option.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key {
            "select" => Self::Select,
            "include" => Self::Include,
            "orderBy" => Self::OrderBy,
            "count" => Self::Count,
            "startIndex" => Self::StartIndex,
            "where" => Self::Where,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns the query-string key for this option.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Select => "select",
            Self::Include => "include",
            Self::OrderBy => "orderBy",
            Self::Count => "count",
            Self::StartIndex => "startIndex",
            Self::Where => "where",
            Self::Custom(key) => key,
        }
    }
}

impl fmt::Display for QueryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of query options.
///
/// Options are emitted in the order they were first set; setting an option
/// again replaces its value in place.
///
/// # Example
///
/// ```rust
/// use sdata::QueryOptions;
///
/// let options = QueryOptions::new()
///     .select("AccountName,Address/City")
///     .count(10);
///
/// assert_eq!(options.to_query_string(), "&select=AccountName%2CAddress%2FCity&count=10");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOptions {
    entries: Vec<(QueryOption, String)>,
}

impl QueryOptions {
    /// Creates an empty set of options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option, replacing any previous value.
    #[must_use]
    pub fn set(mut self, option: QueryOption, value: impl Into<String>) -> Self {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(o, _)| *o == option) {
            entry.1 = value;
        } else {
            self.entries.push((option, value));
        }
        self
    }

    /// Sets an option by its query-string key.
    #[must_use]
    pub fn param(self, key: &str, value: impl Into<String>) -> Self {
        self.set(QueryOption::from_key(key), value)
    }

    /// Sets `select`.
    #[must_use]
    pub fn select(self, properties: impl Into<String>) -> Self {
        self.set(QueryOption::Select, properties)
    }

    /// Sets `include`.
    #[must_use]
    pub fn include(self, relations: impl Into<String>) -> Self {
        self.set(QueryOption::Include, relations)
    }

    /// Sets `orderBy`.
    #[must_use]
    pub fn order_by(self, expression: impl Into<String>) -> Self {
        self.set(QueryOption::OrderBy, expression)
    }

    /// Sets `count`, the page size.
    #[must_use]
    pub fn count(self, count: u32) -> Self {
        self.set(QueryOption::Count, count.to_string())
    }

    /// Sets `startIndex`.
    #[must_use]
    pub fn start_index(self, index: u32) -> Self {
        self.set(QueryOption::StartIndex, index.to_string())
    }

    /// Sets `where`. This overrides any filter passed to a read call.
    #[must_use]
    pub fn where_clause(self, expression: impl Into<String>) -> Self {
        self.set(QueryOption::Where, expression)
    }

    /// Returns the value of an option, if set.
    #[must_use]
    pub fn get(&self, option: &QueryOption) -> Option<&str> {
        self.entries
            .iter()
            .find(|(o, _)| o == option)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if a `where` option is set.
    #[must_use]
    pub fn has_where(&self) -> bool {
        self.get(&QueryOption::Where).is_some()
    }

    /// Returns `true` if no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the options in order.
    pub fn iter(&self) -> impl Iterator<Item = (&QueryOption, &str)> {
        self.entries.iter().map(|(o, v)| (o, v.as_str()))
    }

    /// Renders the options as `&key=value` pairs with encoded values.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(option, value)| format!("&{option}={}", urlencoding::encode(value)))
            .collect()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for QueryOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |options, (k, v)| options.param(k.as_ref(), v))
    }
}

/// Builds `<base><resourceKind>?format=json`.
#[must_use]
pub fn collection_url(base: &BaseUri, resource_kind: &str) -> String {
    format!("{}?format=json", base.join(resource_kind))
}

/// Builds the URL of a filtered read.
///
/// The `where` term is appended only when `filter` is non-empty and
/// `options` does not already carry a `where` option.
///
/// # Example
///
/// ```rust
/// use sdata::{BaseUri, QueryOptions};
/// use sdata::service::read_url;
///
/// let base = BaseUri::new("http://host/sdata/slx/dynamic/-/").unwrap();
/// let url = read_url(&base, "accounts", "AccountName like 'A%'", &QueryOptions::new());
/// assert_eq!(
///     url,
///     "http://host/sdata/slx/dynamic/-/accounts?format=json&where=AccountName%20like%20%27A%25%27"
/// );
/// ```
#[must_use]
pub fn read_url(base: &BaseUri, resource_kind: &str, filter: &str, options: &QueryOptions) -> String {
    let mut url = collection_url(base, resource_kind);
    if !filter.is_empty() && !options.has_where() {
        url.push_str("&where=");
        url.push_str(&urlencoding::encode(filter));
    }
    url.push_str(&options.to_query_string());
    url
}

/// Builds `<base><resourceKind>("<key>")?format=json`.
#[must_use]
pub fn entry_url(base: &BaseUri, resource_kind: &str, key: &str) -> String {
    format!("{}(\"{key}\")?format=json", base.join(resource_kind))
}

/// Builds `<base><resourceKind>/$service/<operation>?format=json`.
#[must_use]
pub fn business_rule_url(base: &BaseUri, resource_kind: &str, operation: &str) -> String {
    format!(
        "{}/$service/{operation}?format=json",
        base.join(resource_kind)
    )
}
