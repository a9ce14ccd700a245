//! Pattern-based extraction of listing entries from fetched page text.
//!
//! The tracker's listing page is not parsed as HTML. A single configurable
//! regex with two named capture groups identifies each entry: `title` for
//! the display title, `downurl` for the relative download link. A second
//! configured pattern detects the "not logged in" page.

use std::collections::BTreeMap;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Named capture group holding the entry title.
pub const TITLE_GROUP: &str = "title";

/// Named capture group holding the relative download link.
pub const DOWNURL_GROUP: &str = "downurl";

/// Placeholder in the listing-page template replaced by the page index.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Site-specific extraction configuration, set once at startup.
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    /// Base URL of the tracker, e.g. `https://tracker.example.org`.
    pub site_host: String,
    /// Listing page path template with a `{page}` placeholder.
    pub listing_page: String,
    /// Pattern whose presence on a page means the session is gone.
    pub login_probe: String,
    /// Entry capture pattern with `title` and `downurl` named groups.
    pub entry_pattern: String,
}

/// Errors raised while compiling the configured patterns. All fatal at startup.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The entry capture pattern is not a valid regex.
    #[error("invalid entry capture pattern: {source}")]
    EntryPattern {
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The login detector pattern is not a valid regex.
    #[error("invalid login detector pattern: {source}")]
    LoginProbe {
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The entry capture pattern compiles but lacks a required named group.
    #[error("entry capture pattern is missing the `{group}` named group")]
    MissingGroup {
        /// The missing group name.
        group: &'static str,
    },
}

/// Compiles the configured patterns once and extracts listing entries.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    site_host: String,
    listing_page: String,
    entry_pattern: Regex,
    login_probe: Regex,
}

impl ListingExtractor {
    /// Compiles both configured patterns.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when either pattern fails to compile or the
    /// entry pattern lacks the `title`/`downurl` named groups.
    pub fn new(config: &SiteConfig) -> Result<Self, PatternError> {
        let entry_pattern =
            Regex::new(&config.entry_pattern).map_err(|source| PatternError::EntryPattern { source })?;
        let login_probe =
            Regex::new(&config.login_probe).map_err(|source| PatternError::LoginProbe { source })?;

        for group in [TITLE_GROUP, DOWNURL_GROUP] {
            if !entry_pattern
                .capture_names()
                .any(|name| name == Some(group))
            {
                return Err(PatternError::MissingGroup { group });
            }
        }

        Ok(Self {
            site_host: config.site_host.clone(),
            listing_page: config.listing_page.clone(),
            entry_pattern,
            login_probe,
        })
    }

    /// Expands the listing page URL for the given page index.
    #[must_use]
    pub fn listing_url(&self, page: u32) -> String {
        let path = self
            .listing_page
            .replace(PAGE_PLACEHOLDER, &page.to_string());
        format!("{}{}", self.site_host, path)
    }

    /// Extracts all listing entries from the page text.
    ///
    /// Scans for every non-overlapping match of the entry pattern, keying the
    /// result by the `title` capture verbatim (no trimming or normalization)
    /// and joining the `downurl` capture onto the site host. When two matches
    /// share a title, the later match in document order overwrites the
    /// earlier one.
    #[must_use]
    pub fn extract(&self, page_text: &str) -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();

        for captures in self.entry_pattern.captures_iter(page_text) {
            let title = captures
                .name(TITLE_GROUP)
                .map_or("", |m| m.as_str())
                .to_owned();
            let downurl = captures.name(DOWNURL_GROUP).map_or("", |m| m.as_str());
            let url = format!("{}/{}", self.site_host, downurl);

            // Duplicate titles: last match wins by overwriting the entry.
            entries.insert(title, url);
        }

        debug!(count = entries.len(), "extracted listing entries");
        entries
    }

    /// Returns true when the login-detector pattern matches the page,
    /// meaning the user session is absent.
    #[must_use]
    pub fn is_logged_out(&self, page_text: &str) -> bool {
        self.login_probe.is_match(page_text)
    }
}
