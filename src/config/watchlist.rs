//! Watch-list loading and download-state tracking.
//!
//! The watch-list is a plain-text file, one wanted title per line. Each line
//! becomes a [`WatchItem`] that starts out pending; the poll engine marks
//! items downloaded as matching torrents are fetched. The set of titles is
//! fixed for the process lifetime and the downloaded flag is monotonic: it
//! can only go from pending to downloaded, never back.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading the watch-list. Fatal at startup.
#[derive(Debug, Error)]
pub enum WatchListError {
    /// The watch-list file could not be read.
    #[error("failed to read watch-list file {path}: {source}")]
    Read {
        /// The watch-list file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// One wanted title and whether it has been downloaded yet.
#[derive(Debug, Clone)]
pub struct WatchItem {
    title: String,
    downloaded: bool,
}

impl WatchItem {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            downloaded: false,
        }
    }

    /// The watched title, kept verbatim from the watch-list line.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether a matching torrent has been downloaded.
    #[must_use]
    pub fn is_downloaded(&self) -> bool {
        self.downloaded
    }
}

/// The fixed set of watched titles with per-title download state.
#[derive(Debug, Clone, Default)]
pub struct WatchList {
    items: Vec<WatchItem>,
}

impl WatchList {
    /// Loads the watch-list from a plain-text file, one title per line.
    ///
    /// Duplicate lines collapse to a single item. Lines are kept verbatim,
    /// including interior blank lines, which become empty titles that match
    /// every listing entry under substring matching.
    ///
    /// # Errors
    ///
    /// Returns [`WatchListError::Read`] when the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, WatchListError> {
        let content = fs::read_to_string(path).map_err(|source| WatchListError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_titles(content.lines()))
    }

    /// Builds a watch-list from an iterator of titles, first occurrence wins
    /// on duplicates.
    #[must_use]
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items: Vec<WatchItem> = Vec::new();
        for title in titles {
            let title = title.into();
            if items.iter().any(|item| item.title == title) {
                continue;
            }
            items.push(WatchItem::new(title));
        }
        Self { items }
    }

    /// Number of watched titles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the watch-list has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in watch-list order.
    #[must_use]
    pub fn items(&self) -> &[WatchItem] {
        &self.items
    }

    /// Number of items already downloaded.
    #[must_use]
    pub fn downloaded_count(&self) -> usize {
        self.items.iter().filter(|item| item.downloaded).count()
    }

    /// Number of items still pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.len() - self.downloaded_count()
    }

    /// True once every item is downloaded. An empty watch-list is satisfied
    /// immediately.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.downloaded_count() >= self.len()
    }

    /// Titles of items still pending, in watch-list order.
    pub fn pending_titles(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(|item| !item.downloaded)
            .map(|item| item.title.as_str())
    }

    /// Marks a title downloaded. Returns true when the item existed and was
    /// newly marked. The flag never reverts.
    pub fn mark_downloaded(&mut self, title: &str) -> bool {
        match self.items.iter_mut().find(|item| item.title == title) {
            Some(item) if !item.downloaded => {
                item.downloaded = true;
                true
            }
            _ => false,
        }
    }
}
