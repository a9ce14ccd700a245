//! The poll/match engine.
//!
//! Drives repeated cycles of fetch → extract → match → download → sleep
//! until every watch-item has been downloaded. Execution is strictly
//! sequential: one listing fetch, one extraction pass and all matching
//! downloads complete before the engine sleeps. Steady-state failures
//! (fetch errors, a logged-out session, a failed download) are logged and
//! the loop keeps going; nothing past startup aborts the process.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::WatchList;
use crate::download::Downloader;
use crate::extract::ListingExtractor;
use crate::fetch::{FetchError, HttpClient};

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// How long to sleep between poll cycles.
    pub sleep_interval: Duration,
    /// Listing page index to poll. The engine owns this value; only page 0
    /// is polled today.
    pub page_index: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sleep_interval: Duration::from_secs(30 * 60),
            page_index: 0,
        }
    }
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Every watch-item is downloaded; the loop is done.
    AllSatisfied,
    /// Work remains; sleep and poll again.
    Continue,
}

/// Why a cycle's listing fetch was abandoned.
#[derive(Debug, Error)]
enum CycleError {
    /// The login-detector pattern matched the fetched page.
    #[error("user session absent on {url}")]
    Authentication { url: String },

    /// The listing page could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Polls the listing page and downloads torrents matching the watch-list.
#[derive(Debug)]
pub struct PollEngine {
    client: HttpClient,
    extractor: ListingExtractor,
    downloader: Downloader,
    watchlist: WatchList,
    settings: EngineSettings,
    cycle: u64,
}

impl PollEngine {
    /// Creates an engine over an already-loaded watch-list.
    #[must_use]
    pub fn new(
        client: HttpClient,
        extractor: ListingExtractor,
        downloader: Downloader,
        watchlist: WatchList,
        settings: EngineSettings,
    ) -> Self {
        Self {
            client,
            extractor,
            downloader,
            watchlist,
            settings,
            cycle: 0,
        }
    }

    /// The watch-list with its current download state.
    #[must_use]
    pub fn watchlist(&self) -> &WatchList {
        &self.watchlist
    }

    /// Number of cycles run so far.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Runs poll cycles until every watch-item is downloaded.
    ///
    /// There is no other exit: the loop sleeps the configured interval
    /// between cycles and only external process termination stops it early.
    pub async fn run(&mut self) {
        loop {
            match self.run_cycle().await {
                CycleOutcome::AllSatisfied => {
                    info!(cycles = self.cycle, "all watch items downloaded");
                    return;
                }
                CycleOutcome::Continue => {
                    info!(
                        seconds = self.settings.sleep_interval.as_secs(),
                        next_check = self.cycle + 1,
                        "sleeping until next check"
                    );
                    tokio::time::sleep(self.settings.sleep_interval).await;
                }
            }
        }
    }

    /// Runs a single poll cycle.
    ///
    /// Reports progress, then terminates **before** fetching when the
    /// watch-list is already satisfied, so a satisfied list never issues
    /// another request. Fetch and authentication failures skip the rest of
    /// the cycle; the cycle counter still advances.
    #[instrument(level = "debug", skip(self), fields(cycle = self.cycle + 1))]
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycle += 1;
        self.report_progress();

        if self.watchlist.is_satisfied() {
            return CycleOutcome::AllSatisfied;
        }

        let page_text = match self.fetch_listing().await {
            Ok(text) => text,
            Err(error) => {
                warn!(cycle = self.cycle, %error, "listing fetch failed, skipping this cycle");
                return CycleOutcome::Continue;
            }
        };

        let entries = self.extractor.extract(&page_text);
        for (entry_title, url) in &entries {
            self.match_entry(entry_title, url).await;
        }

        CycleOutcome::Continue
    }

    /// Per-cycle progress: cycle number and counts at info level, the
    /// download state of every watched title at debug level.
    fn report_progress(&self) {
        info!(
            cycle = self.cycle,
            downloaded = self.watchlist.downloaded_count(),
            pending = self.watchlist.pending_count(),
            total = self.watchlist.len(),
            "checking watch-list"
        );
        for item in self.watchlist.items() {
            debug!(
                title = item.title(),
                downloaded = item.is_downloaded(),
                "watch item"
            );
        }
    }

    /// Fetches the listing page and rejects it when the session is gone.
    async fn fetch_listing(&self) -> Result<String, CycleError> {
        let url = self.extractor.listing_url(self.settings.page_index);
        debug!(%url, "fetching listing page");
        let text = self.client.fetch_text(&url).await?;

        if self.extractor.is_logged_out(&text) {
            return Err(CycleError::Authentication { url });
        }
        Ok(text)
    }

    /// Downloads one listing entry for every pending watch-item it matches.
    ///
    /// Matching is substring containment: the watch title must appear inside
    /// the entry title, case-sensitively. An empty watch title therefore
    /// matches every entry. An item is marked downloaded only after the
    /// download succeeds; a failed attempt leaves it pending so the next
    /// cycle retries it.
    async fn match_entry(&mut self, entry_title: &str, url: &str) {
        let matched: Vec<String> = self
            .watchlist
            .pending_titles()
            .filter(|wanted| entry_title.contains(*wanted))
            .map(str::to_owned)
            .collect();

        for wanted in matched {
            info!(item = %wanted, entry = %entry_title, "watch item matched, downloading");
            let dest = format!("{wanted}.torrent");

            match self.downloader.download(&dest, url).await {
                Ok(path) => {
                    self.watchlist.mark_downloaded(&wanted);
                    info!(item = %wanted, path = %path.display(), "download complete");
                }
                Err(error) => {
                    warn!(item = %wanted, %error, "download failed, item stays pending");
                }
            }
        }
    }
}
