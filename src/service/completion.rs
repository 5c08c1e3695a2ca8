//! Completion-callback adapter for SData operations.
//!
//! Every operation on [`SDataService`](crate::SDataService) returns a future.
//! Callers that prefer a completion handler can wrap any of them with
//! [`with_completion`]; the handler runs exactly once and the caller still
//! receives the same result from the returned future.
//!
//! # Example
//!
//! ```rust,ignore
//! use sdata::service::with_completion;
//!
//! let created = with_completion(service.create("accounts", &record), |result| match result {
//!     Ok(record) => tracing::info!(key = ?record.key(), "created"),
//!     Err(error) => tracing::error!(%error, "create failed"),
//! })
//! .await?;
//! ```

use std::future::Future;

use crate::service::errors::SDataError;

/// Awaits `future`, hands its result to `callback`, then returns the result.
///
/// # Errors
///
/// Returns the error produced by `future`, after `callback` has seen it.
pub async fn with_completion<T, Fut, F>(future: Fut, callback: F) -> Result<T, SDataError>
where
    Fut: Future<Output = Result<T, SDataError>>,
    F: FnOnce(Result<&T, &SDataError>),
{
    let result = future.await;
    callback(result.as_ref());
    result
}
