//! Feed request lifecycle: issue, supersede, commit, tear down.
//!
//! The fetcher is split into three steps so that a caller driving several
//! requests concurrently still observes last-selector-wins semantics:
//!
//! 1. [`FeedFetcher::request`] issues a [`FetchTicket`], cancelling the
//!    previous in-flight ticket.
//! 2. [`FetchTicket::execute`] performs the transport call and
//!    normalization, aborting promptly if its token is cancelled.
//! 3. [`FeedFetcher::commit`] applies the outcome only if the ticket is
//!    still the latest one issued and the fetcher has not been torn down.
//!
//! [`FeedFetcher::fetch`] chains all three for the common sequential case.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quake_map_feed_models::{FeedDefinition, FetchStatus};
use quake_map_quake_models::{EarthquakeEvent, FeedWindow};

use crate::cancel::CancelToken;
use crate::normalize::{normalize, parse_feed};
use crate::registry;
use crate::{FeedError, FeedTransport};

/// A single issued request.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    window: FeedWindow,
    url: String,
    token: CancelToken,
}

impl FetchTicket {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.token.id()
    }

    #[must_use]
    pub const fn window(&self) -> FeedWindow {
        self.window
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fetches and normalizes the feed for this ticket.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Cancelled`] if the ticket is cancelled before
    /// or during the transport call, or any transport/parse error.
    pub async fn execute<T: FeedTransport + ?Sized>(
        &self,
        transport: &T,
    ) -> Result<Vec<EarthquakeEvent>, FeedError> {
        if self.token.is_cancelled() {
            return Err(FeedError::Cancelled);
        }

        let body = tokio::select! {
            biased;
            () = self.token.cancelled() => return Err(FeedError::Cancelled),
            body = transport.get(&self.url) => body?,
        };

        if self.token.is_cancelled() {
            return Err(FeedError::Cancelled);
        }

        let raw = parse_feed(&body)?;
        Ok(normalize(&raw))
    }
}

/// What [`FeedFetcher::commit`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// New data was applied.
    Applied,
    /// The failure was recorded in [`FetchStatus::Failed`].
    Failed,
    /// The outcome was stale, cancelled, or arrived after teardown.
    Discarded,
}

/// Owns the fetch state machine and the last successfully fetched events.
#[derive(Debug)]
pub struct FeedFetcher {
    feeds: BTreeMap<FeedWindow, FeedDefinition>,
    base_url: String,
    status: FetchStatus,
    selected: Option<FeedWindow>,
    active: Option<CancelToken>,
    next_id: u64,
    events: Arc<[EarthquakeEvent]>,
    data_window: Option<FeedWindow>,
    generation: u64,
    torn_down: bool,
}

impl FeedFetcher {
    /// Creates a fetcher over the given feed definitions.
    #[must_use]
    pub fn new(feeds: Vec<FeedDefinition>, base_url: impl Into<String>) -> Self {
        Self {
            feeds: feeds.into_iter().map(|f| (f.window, f)).collect(),
            base_url: base_url.into(),
            status: FetchStatus::Idle,
            selected: None,
            active: None,
            next_id: 0,
            events: Arc::from(Vec::new()),
            data_window: None,
            generation: 0,
            torn_down: false,
        }
    }

    /// Creates a fetcher over the embedded registry and the configured base
    /// URL.
    #[must_use]
    pub fn from_registry() -> Self {
        Self::new(registry::all_feeds(), registry::base_url())
    }

    #[must_use]
    pub const fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// The most recently selected window.
    #[must_use]
    pub const fn selected(&self) -> Option<FeedWindow> {
        self.selected
    }

    /// Events from the last successful fetch (empty before the first).
    #[must_use]
    pub fn events(&self) -> Arc<[EarthquakeEvent]> {
        Arc::clone(&self.events)
    }

    /// Window the current [`Self::events`] were fetched for.
    #[must_use]
    pub const fn data_window(&self) -> Option<FeedWindow> {
        self.data_window
    }

    /// Incremented every time [`Self::events`] changes.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        match &self.status {
            FetchStatus::Success { updated_at } => Some(*updated_at),
            _ => None,
        }
    }

    /// Issues a request for `window`, superseding any in-flight request.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::TornDown`] after [`Self::teardown`], or
    /// [`FeedError::UnknownWindow`] if no feed is configured for `window`.
    pub fn request(&mut self, window: FeedWindow) -> Result<FetchTicket, FeedError> {
        if self.torn_down {
            return Err(FeedError::TornDown);
        }
        let feed = self
            .feeds
            .get(&window)
            .ok_or(FeedError::UnknownWindow(window))?;
        let url = feed.url(&self.base_url);

        if let Some(previous) = self.active.take() {
            log::debug!("Superseding request {} with a request for {window}", previous.id());
            previous.cancel();
        }

        self.next_id += 1;
        let token = CancelToken::new(self.next_id);
        self.active = Some(token.clone());
        self.selected = Some(window);
        self.status = FetchStatus::Fetching;

        log::info!("Fetching {} ({url})", feed.name);

        Ok(FetchTicket { window, url, token })
    }

    /// Re-issues a request for the currently selected window (or the default
    /// window if nothing has been selected yet).
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub fn refresh(&mut self) -> Result<FetchTicket, FeedError> {
        self.request(self.selected.unwrap_or_default())
    }

    /// Applies the outcome of `ticket` if it is still current.
    pub fn commit(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<Vec<EarthquakeEvent>, FeedError>,
    ) -> CommitOutcome {
        if self.torn_down {
            log::debug!("Discarding result of request {} after teardown", ticket.id());
            return CommitOutcome::Discarded;
        }
        if self.active.as_ref().is_none_or(|t| t.id() != ticket.id()) {
            log::debug!("Discarding stale result of request {}", ticket.id());
            return CommitOutcome::Discarded;
        }

        match outcome {
            Err(e) if e.is_cancellation() => {
                log::debug!("Request {} was cancelled", ticket.id());
                CommitOutcome::Discarded
            }
            Ok(events) => {
                log::info!(
                    "Loaded {} events for window {}",
                    events.len(),
                    ticket.window
                );
                self.active = None;
                self.events = Arc::from(events);
                self.data_window = Some(ticket.window);
                self.generation += 1;
                self.status = FetchStatus::Success {
                    updated_at: Utc::now(),
                };
                CommitOutcome::Applied
            }
            Err(e) => {
                log::warn!("Failed to load window {}: {e}", ticket.window);
                self.active = None;
                // Last-good data survives a transient failure of the same
                // window, but never masquerades as another window's data.
                if self.data_window.is_some_and(|w| w != ticket.window) {
                    self.events = Arc::from(Vec::new());
                    self.data_window = None;
                    self.generation += 1;
                }
                self.status = FetchStatus::Failed {
                    reason: e.to_string(),
                };
                CommitOutcome::Failed
            }
        }
    }

    /// Requests, executes, and commits in one step.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request could not be issued; transport
    /// and parse failures are reported through [`CommitOutcome::Failed`]
    /// and [`Self::status`].
    pub async fn fetch<T: FeedTransport + ?Sized>(
        &mut self,
        transport: &T,
        window: FeedWindow,
    ) -> Result<CommitOutcome, FeedError> {
        let ticket = self.request(window)?;
        let outcome = ticket.execute(transport).await;
        Ok(self.commit(&ticket, outcome))
    }

    /// Cancels the active request and stops accepting results.
    ///
    /// Idempotent. State visible to the consumer is frozen from this point.
    pub fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
        self.torn_down = true;
    }

    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl Drop for FeedFetcher {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
    }
}
