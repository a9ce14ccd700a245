//! Streaming file downloads through the retrieval layer.
//!
//! The downloader creates (or truncates) the destination file and streams
//! the response body to it chunk by chunk, so a torrent file is never
//! buffered whole beyond what the retrieval layer's response machinery
//! already holds. A failure at any stage aborts the download and may leave a
//! partial file behind; the poll engine keeps the watch-item pending so the
//! next cycle retries it.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Method;
use reqwest::header::HeaderMap;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use crate::fetch::{FetchError, HttpClient};

/// Errors that can occur while downloading a file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The destination file could not be created.
    #[error("failed to create {path}: {source}")]
    Create {
        /// The destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request failed (transport error or error status).
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Writing the body to disk failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Streams URLs to files in a fixed output directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: HttpClient,
    output_dir: PathBuf,
}

impl Downloader {
    /// Creates a downloader writing into `output_dir`.
    #[must_use]
    pub fn new(client: HttpClient, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
        }
    }

    /// Returns the output directory files are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Downloads `url` to `<output_dir>/<dest_name>`, returning the path.
    ///
    /// The destination is created or truncated before the request is issued.
    /// On error a partially written or empty file may remain; no cleanup is
    /// attempted.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Create`] when the file cannot be created,
    /// [`DownloadError::Fetch`] when the request fails after retries, and
    /// [`DownloadError::Write`] when streaming to disk fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn download(&self, dest_name: &str, url: &str) -> Result<PathBuf, DownloadError> {
        let path = self.output_dir.join(dest_name);

        let file = File::create(&path)
            .await
            .map_err(|source| DownloadError::Create {
                path: path.clone(),
                source,
            })?;

        let response = self
            .client
            .send(Method::GET, url, None, &HeaderMap::new())
            .await?;

        let bytes = stream_to_file(file, response, url, &path).await?;
        debug!(path = %path.display(), bytes, "download complete");

        Ok(path)
    }
}

/// Streams the response body to the file, returning bytes written.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::body(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|source| DownloadError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(bytes_written)
}
