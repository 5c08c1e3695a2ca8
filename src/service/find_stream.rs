//! Lazy, page-following reads.
//!
//! [`FindStream`] presents every page of an SData listing as one
//! [`Stream`] of [`Record`]s. Pages are fetched on demand: nothing is
//! requested until the stream is first polled, and the next page is only
//! requested once the consumer has drained the current one and polls again.
//!
//! # Lifecycle
//!
//! ```text
//!  Idle ──poll──▶ Fetching ──page──▶ Draining ──page empty, $next──▶ Idle
//!                    │                  │
//!                    │ failure          │ no $next, or limit reached
//!                    ▼                  ▼
//!                 Errored             Ended
//! ```
//!
//! A failed page fetch yields exactly one `Err` item, after which the stream
//! is exhausted. Failed fetches are never retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use sdata::{QueryOptions, SDataService};
//!
//! let service = SDataService::new("http://host/sdata/slx/dynamic/-/", Some("admin"), Some(""))?;
//! let mut accounts = service.read_paged("accounts", "AccountName like 'A%'", &QueryOptions::new().count(100), 250);
//!
//! while let Some(account) = accounts.next().await {
//!     println!("{:?}", account?.key());
//! }
//! ```

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::{ready, FutureExt, Stream, TryStreamExt};

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse};
use crate::service::errors::{translate_failure, Failure, SDataError};
use crate::service::record::{PageEnvelope, Record};

/// Observable state of a [`FindStream`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FindState {
    /// No fetch in flight and no records buffered.
    Idle,
    /// One page request is in flight.
    Fetching,
    /// Records of the last fetched page are being handed out.
    Draining,
    /// All requested records were delivered.
    Ended,
    /// A page fetch failed and its error was delivered.
    Errored,
}

enum Inner {
    Idle,
    Fetching(BoxFuture<'static, Result<HttpResponse, HttpError>>),
    Draining(std::vec::IntoIter<Record>),
    Ended,
    Errored,
}

/// Position of a paged read.
#[derive(Debug)]
struct Cursor {
    /// URL of the page to fetch next; `None` once the last page was seen.
    next_url: Option<String>,
    /// URL of the most recent fetch.
    current_url: String,
    emitted: usize,
    limit: Option<usize>,
    pages_fetched: usize,
}

impl Cursor {
    const fn limit_reached(&self) -> bool {
        matches!(self.limit, Some(limit) if self.emitted >= limit)
    }
}

/// A lazy stream over every record of a multi-page SData read.
///
/// Created by [`SDataService::read_paged`](crate::SDataService::read_paged).
///
/// Invariants:
/// - at most one page request is in flight at any time
/// - no more than `limit` records are ever yielded
/// - once the stream has ended or failed it yields nothing further
///
/// Dropping the stream, or calling [`close`](Self::close), drops any
/// in-flight request so its result is never observed.
pub struct FindStream {
    client: HttpClient,
    cursor: Cursor,
    state: Inner,
}

impl FindStream {
    /// Creates a stream starting at `start_url`.
    ///
    /// A `limit` of `0` means unbounded.
    #[must_use]
    pub fn new(client: HttpClient, start_url: impl Into<String>, limit: usize) -> Self {
        let start_url = start_url.into();
        Self {
            client,
            cursor: Cursor {
                current_url: start_url.clone(),
                next_url: Some(start_url),
                emitted: 0,
                limit: (limit > 0).then_some(limit),
                pages_fetched: 0,
            },
            state: Inner::Idle,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> FindState {
        match self.state {
            Inner::Idle => FindState::Idle,
            Inner::Fetching(_) => FindState::Fetching,
            Inner::Draining(_) => FindState::Draining,
            Inner::Ended => FindState::Ended,
            Inner::Errored => FindState::Errored,
        }
    }

    /// Returns the number of records yielded so far.
    #[must_use]
    pub const fn records_emitted(&self) -> usize {
        self.cursor.emitted
    }

    /// Returns the number of page responses received so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.cursor.pages_fetched
    }

    /// Returns the record limit, or `None` when unbounded.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.cursor.limit
    }

    /// Returns `true` once the stream can yield nothing more.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self.state, Inner::Ended | Inner::Errored)
    }

    /// Stops the stream.
    ///
    /// An in-flight request is dropped and no further page is requested.
    pub fn close(&mut self) {
        if !self.is_terminated() {
            tracing::debug!(url = %self.cursor.current_url, "Paged read closed by consumer");
        }
        self.cursor.next_url = None;
        self.state = Inner::Ended;
    }

    /// Drains the stream into a vector, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the [`SDataError`] that terminated the stream.
    pub async fn try_collect_all(self) -> Result<Vec<Record>, SDataError> {
        self.try_collect().await
    }

    fn start_fetch(&self, url: String) -> BoxFuture<'static, Result<HttpResponse, HttpError>> {
        let client = self.client.clone();
        let request = HttpRequest::builder(HttpMethod::Get, url).build();
        Box::pin(async move { client.request(request?).await })
    }

    /// Turns a page response into its records, advancing the cursor.
    fn accept_page(
        &mut self,
        result: Result<HttpResponse, HttpError>,
    ) -> Result<Vec<Record>, SDataError> {
        let url = self.cursor.current_url.as_str();
        let response = result.map_err(|e| SDataError::from_http_error(&e))?;
        if response.code != 200 {
            return Err(translate_failure(&Failure::Response {
                url,
                status: response.code,
                body: &response.body,
            }));
        }

        let envelope: PageEnvelope =
            serde_json::from_value(response.body).map_err(|e| SDataError::Deserialize {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.cursor.next_url = envelope.next_url().map(str::to_string);
        Ok(envelope.resources)
    }
}

impl Stream for FindStream {
    type Item = Result<Record, SDataError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            match &mut this.state {
                Inner::Ended | Inner::Errored => return Poll::Ready(None),
                Inner::Idle => {
                    let Some(url) = this.cursor.next_url.take() else {
                        tracing::debug!(
                            records = this.cursor.emitted,
                            pages = this.cursor.pages_fetched,
                            "Paged read complete"
                        );
                        this.state = Inner::Ended;
                        return Poll::Ready(None);
                    };
                    tracing::debug!(url = %url, page = this.cursor.pages_fetched + 1, "Fetching page");
                    this.cursor.current_url.clone_from(&url);
                    this.state = Inner::Fetching(this.start_fetch(url));
                }
                Inner::Fetching(fetch) => {
                    let result = ready!(fetch.poll_unpin(cx));
                    this.cursor.pages_fetched += 1;
                    match this.accept_page(result) {
                        Ok(records) => this.state = Inner::Draining(records.into_iter()),
                        Err(error) => {
                            tracing::warn!(url = %this.cursor.current_url, error = %error, "Paged read failed");
                            this.cursor.next_url = None;
                            this.state = Inner::Errored;
                            return Poll::Ready(Some(Err(error)));
                        }
                    }
                }
                Inner::Draining(records) => {
                    let Some(record) = records.next() else {
                        this.state = Inner::Idle;
                        continue;
                    };
                    this.cursor.emitted += 1;
                    if this.cursor.limit_reached() {
                        tracing::debug!(limit = this.cursor.emitted, "Record limit reached");
                        this.cursor.next_url = None;
                        this.state = Inner::Ended;
                    }
                    return Poll::Ready(Some(Ok(record)));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_terminated() {
            return (0, Some(0));
        }
        let buffered = match &self.state {
            Inner::Draining(records) => records.len(),
            _ => 0,
        };
        let remaining = self.cursor.limit.map(|l| l - self.cursor.emitted);
        match remaining {
            Some(remaining) => (buffered.min(remaining), Some(remaining)),
            None => (buffered, None),
        }
    }
}

impl fmt::Debug for FindStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindStream")
            .field("state", &self.state())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
