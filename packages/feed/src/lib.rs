#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Earthquake feed registry, normalization, and cancellable fetch lifecycle.
//!
//! The feed is pulled, never pushed: a [`fetcher::FeedFetcher`] issues one
//! request per selected [`FeedWindow`], superseding any request still in
//! flight. Raw `GeoJSON` payloads are normalized by [`normalize`] into
//! validated [`quake_map_quake_models::EarthquakeEvent`] values.

pub mod cancel;
pub mod fetcher;
pub mod normalize;
pub mod registry;
pub mod transport;

use async_trait::async_trait;
use quake_map_quake_models::FeedWindow;

/// Errors that can occur while fetching a feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Network-level failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request was superseded or its consumer went away.
    #[error("request cancelled")]
    Cancelled,

    /// No feed is registered for the requested window.
    #[error("no feed configured for window '{0}'")]
    UnknownWindow(FeedWindow),

    /// The fetcher was torn down and accepts no further requests.
    #[error("fetcher has been torn down")]
    TornDown,
}

impl FeedError {
    /// Whether this error represents cancellation rather than a failure.
    ///
    /// Cancellations are swallowed by the fetcher and never surfaced as a
    /// failed state.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Retrieves the raw body of a feed URL.
///
/// Implementations must return [`FeedError::Status`] for non-2xx
/// responses. Cancellation is handled by the caller, which drops the
/// returned future when the request is superseded.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Fetches `url` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] on network failure or a non-success status.
    async fn get(&self, url: &str) -> Result<String, FeedError>;
}
