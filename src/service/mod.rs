//! SData resource operations.
//!
//! This module builds on the [`clients`](crate::clients) executor and adds
//! the SData protocol layer:
//!
//! - [`SDataService`]: CRUD, business rules and paged reads for one endpoint
//! - [`FindStream`]: lazily fetches listing pages and yields records one by one
//! - [`QueryOptions`]: ordered `select`/`count`/`where`/... query options
//! - [`Record`] and [`PageEnvelope`]: the JSON payloads
//! - [`SDataError`]: the uniform error, produced by [`translate_failure`]
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use sdata::{QueryOptions, SDataService};
//!
//! let service = SDataService::new("http://host:3012/sdata/slx/dynamic/-/", Some("admin"), Some(""))?;
//! let mut accounts = service.read_paged(
//!     "accounts",
//!     "AccountName like 'A%'",
//!     &QueryOptions::new().select("AccountName").count(10),
//!     0,
//! );
//!
//! while let Some(account) = accounts.try_next().await? {
//!     println!("{:?} {}", account.key(), account["AccountName"]);
//! }
//! ```

mod client;
mod completion;
mod errors;
mod find_stream;
mod query;
mod record;

pub use client::SDataService;
pub use completion::with_completion;
pub use errors::{
    translate_failure, Diagnosis, Failure, ProtocolError, SDataError,
    AUTHENTICATION_FAILED_MESSAGE, GENERIC_SERVER_ERROR_HINT, GENERIC_SERVER_ERROR_PREFIX,
    UNKNOWN_ERROR_MESSAGE,
};
pub use find_stream::{FindState, FindStream};
pub use query::{business_rule_url, collection_url, entry_url, read_url, QueryOption, QueryOptions};
pub use record::{PageEnvelope, Record, KEY_FIELD};
