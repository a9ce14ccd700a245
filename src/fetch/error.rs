//! Error types for the HTTP retrieval layer.
//!
//! Retrieval errors separate transport-level failures (DNS, connect, TLS,
//! stalled reads) from server-reported failures (status >= 400) so the poll
//! loop can log a precise reason before skipping a cycle.

use thiserror::Error;

/// Errors that can occur while issuing an HTTP request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("request error for {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with an error status (4xx/5xx) on every attempt.
    #[error("{url} request error: HTTP {status}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be read or decompressed.
    #[error("failed to read response body from {url}: {source}")]
    Body {
        /// The URL whose body failed to read.
        url: String,
        /// The underlying read error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured proxy URL was rejected by the client builder.
    #[error("invalid proxy {proxy}: {source}")]
    Proxy {
        /// The offending proxy specification.
        proxy: String,
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// A configured fake header has an invalid name or value.
    #[error("invalid header {name:?}: {reason}")]
    Header {
        /// The offending header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client itself failed to build.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a body read error.
    pub fn body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Body {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid proxy error.
    pub fn proxy(proxy: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Proxy {
            proxy: proxy.into(),
            source,
        }
    }

    /// Creates an invalid header error.
    pub fn header(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Header {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` because the
// variants require context (url, proxy, header name) that the source error
// does not provide. The helper constructors are the pattern used instead.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display_names_url_and_status() {
        let error = FetchError::http_status("https://example.com/list.php", 500);
        let msg = error.to_string();
        assert!(msg.contains("500"), "Expected '500' in: {msg}");
        assert!(
            msg.contains("https://example.com/list.php"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_header_display_names_offender() {
        let error = FetchError::header("Bad Name", "invalid header name");
        let msg = error.to_string();
        assert!(msg.contains("Bad Name"), "Expected header name in: {msg}");
    }
}
