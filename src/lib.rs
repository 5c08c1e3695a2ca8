//! # SData Rust Client
//!
//! An async client for SData REST services, providing type-safe
//! configuration, Basic authentication, CRUD operations, business-rule
//! invocation and lazily paged reads.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`SDataConfig`] and [`SDataConfigBuilder`]
//! - Validated newtypes for the base URI and credentials
//! - A request executor that speaks JSON and never retries ([`clients`])
//! - [`SDataService`] for reading, creating, updating, deleting and
//!   upserting records, and for calling business rules
//! - [`FindStream`], a [`futures::Stream`] that fetches one listing page at a
//!   time and yields records in server order
//! - A single error type, [`SDataError`], for every failed request
//!
//! ## Quick Start
//!
//! ```rust
//! use sdata::{BaseUri, Credentials, SDataConfig, SDataService};
//!
//! let config = SDataConfig::builder()
//!     .base_uri(BaseUri::new("http://localhost:3012/sdata/slx/dynamic/-/").unwrap())
//!     .credentials(Credentials::new("admin", "").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let service = SDataService::from_config(&config).unwrap();
//! assert_eq!(service.base_uri().as_ref(), "http://localhost:3012/sdata/slx/dynamic/-/");
//! ```
//!
//! ## Reading Records
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use sdata::{QueryOptions, SDataService};
//!
//! let service = SDataService::new("http://localhost:3012/sdata/slx/dynamic/-/", Some("admin"), None)?;
//!
//! // One page
//! let page = service
//!     .read("accounts", "AccountName like 'A%'", &QueryOptions::new().count(10))
//!     .await?;
//! println!("{} of {:?}", page.resources.len(), page.total_results);
//!
//! // Every page, fetched on demand, at most 25 records
//! let accounts = service
//!     .read_paged("accounts", "AccountName like 'A%'", &QueryOptions::new().count(10), 25)
//!     .try_collect::<Vec<_>>()
//!     .await?;
//! ```
//!
//! ## Writing Records
//!
//! ```rust,ignore
//! use sdata::Record;
//!
//! let created = service
//!     .create("accounts", &Record::new().with("AccountName", "Abbott Ltd."))
//!     .await?;
//!
//! let renamed = created.clone().with("AccountName", "Abbott Limited");
//! service.upsert("accounts", &renamed).await?;
//!
//! service.delete("accounts", &created.key().unwrap()).await?;
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.
//! Requests are logged at `debug`; failed SData calls log
//! `"Error from SData"` at `debug` with the method, URL and status.
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All public types except [`FindStream`] are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **No retries**: Every operation issues exactly the requests it describes

pub mod clients;
pub mod config;
pub mod error;
pub mod service;

// Re-export public types at crate root for convenience
pub use config::{BaseUri, Credentials, Password, SDataConfig, SDataConfigBuilder, Username};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    InvalidHttpRequestError,
};

// Re-export SData service types
pub use service::{
    FindState, FindStream, PageEnvelope, ProtocolError, QueryOption, QueryOptions, Record,
    SDataError, SDataService,
};
