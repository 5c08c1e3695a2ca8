//! The SData service client.
//!
//! This module provides [`SDataService`], which builds SData resource URLs,
//! sends CRUD and business-rule requests through the
//! [`HttpClient`](crate::clients::HttpClient), and reports failures as
//! [`SDataError`].

use serde_json::{json, Map, Value};

use crate::clients::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::config::{BaseUri, Credentials, SDataConfig};
use crate::error::ConfigError;
use crate::service::errors::{translate_failure, Failure, SDataError};
use crate::service::find_stream::FindStream;
use crate::service::query::{business_rule_url, collection_url, entry_url, read_url, QueryOptions};
use crate::service::record::{PageEnvelope, Record};

/// Client for one SData service endpoint.
///
/// # Thread Safety
///
/// `SDataService` is `Clone`, `Send` and `Sync`. Clones share authentication
/// defaults: [`set_authentication_parameters`](Self::set_authentication_parameters)
/// on any clone applies to every request issued afterwards by all of them.
///
/// # Example
///
/// ```rust,ignore
/// use sdata::{QueryOptions, Record, SDataService};
///
/// let service = SDataService::new("http://host:3012/sdata/slx/dynamic/-/", Some("admin"), Some(""))?;
///
/// let page = service
///     .read("accounts", "AccountName like 'A%'", &QueryOptions::new().select("AccountName"))
///     .await?;
///
/// let created = service.create("accounts", &Record::new().with("AccountName", "Foo")).await?;
/// service.delete("accounts", &created.key().unwrap()).await?;
/// ```
#[derive(Clone, Debug)]
pub struct SDataService {
    base_uri: BaseUri,
    http_client: HttpClient,
}

// Verify SDataService is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SDataService>();
};

impl SDataService {
    /// Creates a service for `base_uri`.
    ///
    /// When a non-empty `username` is supplied, Basic authentication is
    /// configured immediately; a missing `password` is treated as empty. An
    /// empty `username` leaves the service unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the URI is invalid or the HTTP client
    /// cannot be created.
    pub fn new(
        base_uri: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut builder = SDataConfig::builder().base_uri(BaseUri::new(base_uri)?);
        if let Some(username) = username.filter(|u| !u.is_empty()) {
            builder = builder.credentials(Credentials::new(username, password.unwrap_or_default())?);
        }
        Self::from_config(&builder.build()?)
    }

    /// Creates a service from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be created.
    pub fn from_config(config: &SDataConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base_uri: config.base_uri().clone(),
            http_client: HttpClient::new(config)?,
        })
    }

    /// Returns the service base URI.
    #[must_use]
    pub const fn base_uri(&self) -> &BaseUri {
        &self.base_uri
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub const fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Replaces the Basic authentication credentials.
    ///
    /// Requests already in flight keep the credentials they were sent with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUsername`] if `username` is empty.
    pub fn set_authentication_parameters(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), ConfigError> {
        let credentials = Credentials::new(username, password)?;
        tracing::debug!(username, "Replacing SData authentication parameters");
        self.http_client.set_credentials(Some(credentials));
        Ok(())
    }

    /// Removes credentials; subsequent requests are sent unauthenticated.
    pub fn clear_authentication(&self) {
        self.http_client.set_credentials(None);
    }

    /// Reads one page of `resource_kind` matching `filter`.
    ///
    /// `filter` is ignored when `options` carries its own `where` option.
    /// Pass an empty `filter` to read without one.
    ///
    /// # Errors
    ///
    /// Returns [`SDataError`] if the request fails, the status is not 200,
    /// or the body is not a listing.
    pub async fn read(
        &self,
        resource_kind: &str,
        filter: &str,
        options: &QueryOptions,
    ) -> Result<PageEnvelope, SDataError> {
        let url = read_url(&self.base_uri, resource_kind, filter, options);
        let request = HttpRequest::builder(HttpMethod::Get, &url).build()?;
        let response = self.send(request, 200).await?;
        decode(&url, response.body)
    }

    /// Reads every page of `resource_kind` matching `filter`, lazily.
    ///
    /// The returned stream yields at most `limit` records; `0` means
    /// unbounded. Page size follows the `count` option, or the server default.
    #[must_use]
    pub fn read_paged(
        &self,
        resource_kind: &str,
        filter: &str,
        options: &QueryOptions,
        limit: usize,
    ) -> FindStream {
        let url = read_url(&self.base_uri, resource_kind, filter, options);
        FindStream::new(self.http_client.clone(), url, limit)
    }

    /// Creates a record; the server must answer 201.
    ///
    /// # Errors
    ///
    /// Returns [`SDataError`] if the request fails or the status is not 201.
    pub async fn create(&self, resource_kind: &str, record: &Record) -> Result<Record, SDataError> {
        let url = collection_url(&self.base_uri, resource_kind);
        let request = HttpRequest::builder(HttpMethod::Post, &url)
            .body(record.clone())
            .build()?;
        let response = self.send(request, 201).await?;
        decode(&url, response.body)
    }

    /// Updates the record identified by its `$key`; the server must answer 200.
    ///
    /// # Errors
    ///
    /// Returns [`SDataError::MissingKey`] if the record has no usable `$key`,
    /// otherwise [`SDataError`] if the request fails or the status is not 200.
    pub async fn update(&self, resource_kind: &str, record: &Record) -> Result<Record, SDataError> {
        let key = record.key().ok_or_else(|| SDataError::MissingKey {
            resource_kind: resource_kind.to_string(),
        })?;
        let url = entry_url(&self.base_uri, resource_kind, &key);
        let request = HttpRequest::builder(HttpMethod::Put, &url)
            .body(record.clone())
            .build()?;
        let response = self.send(request, 200).await?;
        decode(&url, response.body)
    }

    /// Deletes the record with `key`; the server must answer 200.
    ///
    /// # Errors
    ///
    /// Returns [`SDataError`] if the request fails or the status is not 200.
    pub async fn delete(&self, resource_kind: &str, key: &str) -> Result<(), SDataError> {
        let url = entry_url(&self.base_uri, resource_kind, key);
        let request = HttpRequest::builder(HttpMethod::Delete, url).build()?;
        self.send(request, 200).await?;
        Ok(())
    }

    /// Updates `record` if its `$key` is truthy, creates it otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error of the delegated [`update`](Self::update) or
    /// [`create`](Self::create).
    pub async fn upsert(&self, resource_kind: &str, record: &Record) -> Result<Record, SDataError> {
        if record.has_key() {
            self.update(resource_kind, record).await
        } else {
            self.create(resource_kind, record).await
        }
    }

    /// Invokes a business rule on one record; the server must answer 200.
    ///
    /// The request body is
    /// `{"$name": operation, "request": {"entity": {"$key": record_id}, ...parameters}}`.
    /// Returns the `response` field of the result when present, else the
    /// whole result.
    ///
    /// # Errors
    ///
    /// Returns [`SDataError`] if the request fails or the status is not 200.
    pub async fn call_business_rule(
        &self,
        resource_kind: &str,
        operation: &str,
        record_id: &str,
        parameters: Option<&Map<String, Value>>,
    ) -> Result<Value, SDataError> {
        let url = business_rule_url(&self.base_uri, resource_kind, operation);
        let request = HttpRequest::builder(HttpMethod::Post, url)
            .body(business_rule_payload(operation, record_id, parameters))
            .build()?;
        let response = self.send(request, 200).await?;

        Ok(match response.body {
            Value::Object(mut result) => match result.remove("response") {
                Some(inner) => inner,
                None => Value::Object(result),
            },
            other => other,
        })
    }

    /// Sends a request and checks the response status.
    async fn send(&self, request: HttpRequest, expected: u16) -> Result<HttpResponse, SDataError> {
        let url = request.url.clone();
        let method = request.http_method;

        let response = self.http_client.request(request).await.map_err(|e| {
            let error = SDataError::from_http_error(&e);
            tracing::debug!(%method, %url, %error, "Error from SData");
            error
        })?;

        if response.code == expected {
            return Ok(response);
        }

        let error = translate_failure(&Failure::Response {
            url: &url,
            status: response.code,
            body: &response.body,
        });
        tracing::debug!(%method, %url, status = response.code, %error, "Error from SData");
        Err(error)
    }
}

/// Builds the JSON body of a business-rule call.
fn business_rule_payload(
    operation: &str,
    record_id: &str,
    parameters: Option<&Map<String, Value>>,
) -> Value {
    let mut request = Map::new();
    request.insert("entity".to_string(), json!({ "$key": record_id }));
    if let Some(parameters) = parameters {
        for (name, value) in parameters {
            request.insert(name.clone(), value.clone());
        }
    }
    json!({ "$name": operation, "request": request })
}

fn decode<T: serde::de::DeserializeOwned>(url: &str, body: Value) -> Result<T, SDataError> {
    serde_json::from_value(body).map_err(|e| SDataError::Deserialize {
        url: url.to_string(),
        message: e.to_string(),
    })
}
