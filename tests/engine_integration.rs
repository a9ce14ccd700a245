//! Integration tests for the poll/match engine.
//!
//! Each test wires a real engine against a wiremock tracker: a listing page
//! endpoint plus download endpoints, with torrent files landing in a temp
//! directory.

use std::time::Duration;

use seedwatch::engine::{CycleOutcome, EngineSettings, PollEngine};
use seedwatch::extract::{ListingExtractor, SiteConfig};
use seedwatch::fetch::{FetchConfig, HttpClient};
use seedwatch::{Downloader, WatchList};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENTRY_PATTERN: &str =
    r#"<b>(?P<title>[^<]+)</b>.*?<a href="(?P<downurl>download\.php[^"]+)">"#;

fn listing_row(title: &str, id: u32) -> String {
    format!(r#"<tr><td><b>{title}</b></td><td><a href="download.php?id={id}">get</a></td></tr>"#)
}

fn build_engine(server: &MockServer, titles: &[&str], output_dir: &TempDir) -> PollEngine {
    let client = HttpClient::new(&FetchConfig::default()).expect("client should build");
    let extractor = ListingExtractor::new(&SiteConfig {
        site_host: server.uri(),
        listing_page: "/torrents.php?page={page}".to_owned(),
        login_probe: r"takelogin\.php".to_owned(),
        entry_pattern: ENTRY_PATTERN.to_owned(),
    })
    .expect("patterns should compile");
    let downloader = Downloader::new(client.clone(), output_dir.path());
    let watchlist = WatchList::from_titles(titles.iter().copied());

    PollEngine::new(
        client,
        extractor,
        downloader,
        watchlist,
        EngineSettings {
            sleep_interval: Duration::from_millis(10),
            page_index: 0,
        },
    )
}

async fn mount_listing(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/torrents.php"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_torrent(server: &MockServer, id: u32, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path("/download.php"))
        .and(query_param("id", id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_zero_watch_items_satisfied_without_any_request() {
    let server = MockServer::start().await;
    // Any request at all fails the test.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let mut engine = build_engine(&server, &[], &output);

    assert_eq!(engine.run_cycle().await, CycleOutcome::AllSatisfied);
}

#[tokio::test]
async fn test_matching_entry_downloads_and_marks_only_that_item() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        format!(
            "{}{}",
            listing_row("Alpha.S01E02.1080p", 7),
            listing_row("Unrelated.Show", 8)
        ),
    )
    .await;
    mount_torrent(&server, 7, b"d8:announce0:e").await;

    let output = TempDir::new().unwrap();
    let mut engine = build_engine(&server, &["Alpha", "Beta"], &output);

    assert_eq!(engine.run_cycle().await, CycleOutcome::Continue);

    let items = engine.watchlist().items();
    assert!(items[0].is_downloaded(), "Alpha should be downloaded");
    assert!(!items[1].is_downloaded(), "Beta should still be pending");

    let torrent = output.path().join("Alpha.torrent");
    assert_eq!(std::fs::read(&torrent).unwrap(), b"d8:announce0:e");
}

#[tokio::test]
async fn test_substring_matching_is_case_sensitive() {
    let server = MockServer::start().await;
    mount_listing(&server, listing_row("alpha.s01e02", 7)).await;
    // No torrent endpoint mounted: a download attempt would 404 loudly, but
    // none must happen.
    let output = TempDir::new().unwrap();
    let mut engine = build_engine(&server, &["Alpha"], &output);

    assert_eq!(engine.run_cycle().await, CycleOutcome::Continue);
    assert!(!engine.watchlist().items()[0].is_downloaded());
}

#[tokio::test]
async fn test_empty_watch_title_matches_every_entry() {
    let server = MockServer::start().await;
    mount_listing(&server, listing_row("Completely.Unrelated", 9)).await;
    mount_torrent(&server, 9, b"payload").await;

    let output = TempDir::new().unwrap();
    let mut engine = build_engine(&server, &[""], &output);

    assert_eq!(engine.run_cycle().await, CycleOutcome::Continue);
    assert!(engine.watchlist().items()[0].is_downloaded());
    assert!(output.path().join(".torrent").exists());
}

#[tokio::test]
async fn test_logged_out_page_skips_cycle_without_downloads() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        format!(
            r#"<a href="takelogin.php">log in</a>{}"#,
            listing_row("Alpha.S01E02", 7)
        ),
    )
    .await;

    let output = TempDir::new().unwrap();
    let mut engine = build_engine(&server, &["Alpha"], &output);

    assert_eq!(engine.run_cycle().await, CycleOutcome::Continue);
    assert!(
        !engine.watchlist().items()[0].is_downloaded(),
        "no download may happen on a logged-out page"
    );
}

#[tokio::test]
async fn test_listing_fetch_error_skips_cycle_and_keeps_looping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/torrents.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let mut engine = build_engine(&server, &["Alpha"], &output);

    assert_eq!(engine.run_cycle().await, CycleOutcome::Continue);
    assert_eq!(engine.cycle(), 1, "cycle counter advances on failure too");
}

#[tokio::test]
async fn test_failed_download_leaves_item_pending_and_retries_next_cycle() {
    let server = MockServer::start().await;
    mount_listing(&server, listing_row("Alpha.S01E02", 7)).await;

    // First download attempt fails, the next one succeeds.
    Mock::given(method("GET"))
        .and(path("/download.php"))
        .and(query_param("id", "7"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_torrent(&server, 7, b"payload").await;

    let output = TempDir::new().unwrap();
    let mut engine = build_engine(&server, &["Alpha"], &output);

    assert_eq!(engine.run_cycle().await, CycleOutcome::Continue);
    assert!(
        !engine.watchlist().items()[0].is_downloaded(),
        "failed download must leave the item pending"
    );

    assert_eq!(engine.run_cycle().await, CycleOutcome::Continue);
    assert!(
        engine.watchlist().items()[0].is_downloaded(),
        "next cycle must retry and succeed"
    );
    assert_eq!(
        std::fs::read(output.path().join("Alpha.torrent")).unwrap(),
        b"payload"
    );
}

#[tokio::test]
async fn test_run_terminates_once_all_items_downloaded() {
    let server = MockServer::start().await;
    mount_listing(&server, listing_row("Alpha.S01E02", 7)).await;
    mount_torrent(&server, 7, b"payload").await;

    let output = TempDir::new().unwrap();
    let mut engine = build_engine(&server, &["Alpha"], &output);

    // Cycle 1 downloads the item, cycle 2 observes satisfaction and stops.
    engine.run().await;
    assert_eq!(engine.cycle(), 2);
    assert!(engine.watchlist().is_satisfied());
}
