//! Seedwatch core library.
//!
//! Seedwatch polls a tracker's listing page on a fixed interval, extracts
//! candidate entries with a configurable capture pattern, matches them
//! against a watch-list of wanted titles, and downloads the matching torrent
//! files until every watch-item has been satisfied.
//!
//! # Architecture
//!
//! - [`config`] - JSON configuration and the watch-list loader
//! - [`fetch`] - HTTP retrieval with proxying, fake headers, cookies, retry
//! - [`extract`] - pattern-based listing entry extraction
//! - [`download`] - streaming file downloads
//! - [`engine`] - the poll/match loop driving everything

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod engine;
pub mod extract;
pub mod fetch;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError, WatchItem, WatchList, WatchListError};
pub use download::{DownloadError, Downloader};
pub use engine::{CycleOutcome, EngineSettings, PollEngine};
pub use extract::{ListingExtractor, PatternError, SiteConfig};
pub use fetch::{FetchConfig, FetchError, FetchResponse, HttpClient};
