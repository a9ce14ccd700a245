//! Application configuration loading.
//!
//! All tunables live in one JSON file (default `config.json`), deserialized
//! with serde into [`AppConfig`] and validated before anything else starts.
//! The loaded config is split into the per-component structs
//! ([`FetchConfig`](crate::fetch::FetchConfig),
//! [`SiteConfig`](crate::extract::SiteConfig)) which are passed by reference
//! at construction time; there is no global mutable state.

mod watchlist;

pub use watchlist::{WatchItem, WatchList, WatchListError};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::extract::SiteConfig;
use crate::fetch::FetchConfig;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Errors raised while loading the config file. All fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// The config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// The config file path.
        path: PathBuf,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A config value is present but unusable.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// The offending field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// JSON-backed application configuration.
///
/// Every field has a default so a minimal config only needs the
/// site-specific values (`site_host`, `listing_page`, `login_probe`,
/// `entry_pattern`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Plain-text watch-list file, one wanted title per line.
    pub watch_list_file: PathBuf,
    /// Base URL of the tracker.
    pub site_host: String,
    /// Listing page path template with a `{page}` placeholder.
    pub listing_page: String,
    /// Pattern whose presence on a fetched page means the session is gone.
    pub login_probe: String,
    /// Entry capture pattern with `title` and `downurl` named groups.
    pub entry_pattern: String,
    /// Forward proxy URL; wins over `socks5_proxy` when both are set.
    pub http_proxy: String,
    /// SOCKS5 proxy address (`host:port`).
    pub socks5_proxy: String,
    /// Cookie string: Netscape browser export or raw `Cookie` header value.
    pub cookie: String,
    /// Global `Referer` override.
    pub referer: String,
    /// Total HTTP attempts per request; 1 means no retry.
    pub retry_times: u32,
    /// Minutes to sleep between poll cycles.
    pub sleep_minutes: u64,
    /// Directory downloaded torrent files are written to.
    pub output_dir: PathBuf,
    /// Emit a trace of every HTTP exchange.
    pub http_debug: bool,
    /// Headers applied to every outbound request to resemble a browser.
    pub fake_headers: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            watch_list_file: PathBuf::from("watchlist.txt"),
            site_host: String::new(),
            listing_page: String::new(),
            login_probe: String::new(),
            entry_pattern: String::new(),
            http_proxy: String::new(),
            socks5_proxy: String::new(),
            cookie: String::new(),
            referer: String::new(),
            retry_times: 1,
            sleep_minutes: 30,
            output_dir: PathBuf::from("."),
            http_debug: false,
            fake_headers: default_fake_headers(),
        }
    }
}

impl AppConfig {
    /// Loads and validates the config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] for an unreadable file,
    /// [`ConfigError::Parse`] for malformed JSON, and
    /// [`ConfigError::Invalid`] when a value fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates field values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_host.is_empty() {
            return Err(invalid("site_host", "must not be empty"));
        }
        if Url::parse(&self.site_host).is_err() {
            return Err(invalid("site_host", format!("not a URL: {}", self.site_host)));
        }
        if self.listing_page.is_empty() {
            return Err(invalid("listing_page", "must not be empty"));
        }
        if self.entry_pattern.is_empty() {
            return Err(invalid("entry_pattern", "must not be empty"));
        }
        if self.login_probe.is_empty() {
            // An empty pattern matches every page, which would read as a
            // permanent logged-out state.
            return Err(invalid("login_probe", "must not be empty"));
        }
        if self.retry_times < 1 {
            return Err(invalid("retry_times", "must be at least 1"));
        }
        if self.sleep_minutes < 1 {
            return Err(invalid("sleep_minutes", "must be at least 1"));
        }
        Ok(())
    }

    /// The retrieval-layer slice of the configuration.
    #[must_use]
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            http_proxy: self.http_proxy.clone(),
            socks5_proxy: self.socks5_proxy.clone(),
            fake_headers: self.fake_headers.clone(),
            cookie: self.cookie.clone(),
            referer: self.referer.clone(),
            retry_times: self.retry_times,
            http_debug: self.http_debug,
        }
    }

    /// The extraction slice of the configuration.
    #[must_use]
    pub fn site_config(&self) -> SiteConfig {
        SiteConfig {
            site_host: self.site_host.clone(),
            listing_page: self.listing_page.clone(),
            login_probe: self.login_probe.clone(),
            entry_pattern: self.entry_pattern.clone(),
        }
    }

    /// The inter-cycle sleep interval.
    #[must_use]
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_minutes * 60)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// The browser header set applied to every request by default.
fn default_fake_headers() -> BTreeMap<String, String> {
    [
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:63.0) Gecko/20100101 Firefox/63.0",
        ),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.8,zh-CN;q=0.5,zh;q=0.3"),
        ("Accept-Encoding", "gzip, deflate"),
        ("DNT", "1"),
        ("Connection", "keep-alive"),
        ("Upgrade-Insecure-Requests", "1"),
        ("Cache-Control", "max-age=0"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_owned(), value.to_owned()))
    .collect()
}
