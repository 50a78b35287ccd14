#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived earthquake views: filtering, statistics, bounds, marker icons,
//! and clustering.
//!
//! Everything here is synchronous and pure apart from the [`icons::IconCache`],
//! which is append-only. Filtering never triggers network activity: a new
//! magnitude threshold is a local recomputation over already-fetched events.

pub mod bounds;
pub mod cluster;
pub mod config;
pub mod filter;
pub mod frame;
pub mod icons;
pub mod model;

use thiserror::Error;

pub use config::{AveragingPolicy, ViewConfig};

/// Errors that can occur while loading view configuration.
#[derive(Debug, Error)]
pub enum ViewConfigError {
    /// Reading the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML or has unexpected fields.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid view config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}
