//! HTTP client wrapper for the retrieval layer.
//!
//! Wraps a `reqwest::Client` configured for hostile tracker frontends:
//! trust-all TLS, optional forward or SOCKS5 proxying, browser-like fake
//! headers, cookie injection with a raw-string fallback, and a bounded
//! fixed-backoff retry loop. Response bodies are transparently decompressed
//! for `gzip` and `deflate` content encodings.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::{Client, Method, Proxy};
use tracing::{debug, instrument, warn};

use super::cookies::resolve_cookie_header;
use super::error::FetchError;

/// Connect timeout for direct and forward-proxy connections.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect timeout when dialing through a SOCKS5 proxy.
const SOCKS5_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP keep-alive interval used with the SOCKS5 dialer.
const SOCKS5_KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Fixed pause between retry attempts.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Configuration for the retrieval layer, constructed once at startup and
/// passed by reference into [`HttpClient::new`].
#[derive(Debug, Clone, Default)]
pub struct FetchConfig {
    /// Forward proxy URL. Takes precedence over `socks5_proxy` when both are set.
    pub http_proxy: String,
    /// SOCKS5 proxy address, `host:port` (a `socks5://` scheme is accepted too).
    pub socks5_proxy: String,
    /// Headers applied to every outbound request to resemble a browser.
    pub fake_headers: BTreeMap<String, String>,
    /// Cookie string: a Netscape browser export, or a raw `Cookie` header value.
    pub cookie: String,
    /// Global `Referer` override, applied last when non-empty.
    pub referer: String,
    /// Total attempts per request; 1 means a single attempt, no retry.
    pub retry_times: u32,
    /// Emit a trace of every request/response exchange.
    pub http_debug: bool,
}

/// A buffered HTTP response: status, headers, decompressed body bytes.
#[derive(Debug)]
pub struct FetchResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: HeaderMap,
    /// The decompressed body bytes.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client for listing-page fetches and file downloads.
///
/// Created once at startup and reused for every request so connections are
/// pooled across poll cycles.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    fake_headers: HeaderMap,
    cookie_header: Option<HeaderValue>,
    referer: Option<HeaderValue>,
    retry_times: u32,
    http_debug: bool,
}

impl HttpClient {
    /// Creates a client from the retrieval configuration.
    ///
    /// The cookie string is resolved once here: a parseable browser export
    /// becomes joined `name=value` pairs, anything else is kept verbatim
    /// (see [`resolve_cookie_header`]).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Proxy`] for an unusable proxy specification,
    /// [`FetchError::Header`] for a fake header or cookie that is not a
    /// legal HTTP header, and [`FetchError::ClientBuild`] when the
    /// underlying client fails to build.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = build_client(config)?;
        let fake_headers = build_header_map(&config.fake_headers)?;

        let cookie_header = match resolve_cookie_header(&config.cookie) {
            Some(value) => Some(
                HeaderValue::from_str(&value)
                    .map_err(|e| FetchError::header("Cookie", e.to_string()))?,
            ),
            None => None,
        };

        let referer = if config.referer.is_empty() {
            None
        } else {
            Some(
                HeaderValue::from_str(&config.referer)
                    .map_err(|e| FetchError::header("Referer", e.to_string()))?,
            )
        };

        Ok(Self {
            client,
            fake_headers,
            cookie_header,
            referer,
            // A retry count of zero would never attempt the request at all.
            retry_times: config.retry_times.max(1),
            http_debug: config.http_debug,
        })
    }

    /// Issues a request and buffers the full response body.
    ///
    /// Retries up to the configured attempt count; success means no
    /// transport error and a status below 400.
    ///
    /// # Errors
    ///
    /// After retry exhaustion, returns [`FetchError::Transport`] for a
    /// network-level failure or [`FetchError::HttpStatus`] when the server
    /// kept answering with status >= 400. A body read or decompression
    /// failure surfaces as [`FetchError::Body`].
    #[instrument(level = "debug", skip(self, body, extra_headers))]
    pub async fn fetch(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        extra_headers: &HeaderMap,
    ) -> Result<FetchResponse, FetchError> {
        let response = self.send(method, url, body, extra_headers).await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::body(url, e))?
            .to_vec();

        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }

    /// Convenience GET returning the page text.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`fetch`](Self::fetch).
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .fetch(Method::GET, url, None, &HeaderMap::new())
            .await?;
        Ok(response.text())
    }

    /// Issues a request and returns the raw response for streaming.
    ///
    /// Used by the downloader to stream large bodies to disk instead of
    /// buffering them. The retry policy is identical to [`fetch`](Self::fetch).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] or [`FetchError::HttpStatus`] after
    /// retry exhaustion.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        extra_headers: &HeaderMap,
    ) -> Result<reqwest::Response, FetchError> {
        let headers = self.resolve_headers(url, extra_headers);

        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let mut request = self.client.request(method.clone(), url).headers(headers.clone());
            if let Some(bytes) = body.clone() {
                request = request.body(bytes);
            }

            match request.send().await {
                Ok(response) if response.status().as_u16() < 400 => {
                    self.trace_exchange(&method, url, &headers, response.status().as_u16());
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    self.trace_exchange(&method, url, &headers, status);
                    if attempt >= self.retry_times {
                        return Err(FetchError::http_status(url, status));
                    }
                    warn!(url, status, attempt, "server error, retrying");
                }
                Err(source) => {
                    if attempt >= self.retry_times {
                        return Err(FetchError::transport(url, source));
                    }
                    warn!(url, attempt, error = %source, "transport error, retrying");
                }
            }

            tokio::time::sleep(RETRY_BACKOFF).await;
        }
    }

    /// Builds the effective header set for one request.
    ///
    /// Resolution order, later wins: fake headers, then per-call headers,
    /// then a default `Referer` equal to the requested URL (only when the
    /// per-call headers did not set one), then the configured global referer,
    /// then the configured cookie.
    fn resolve_headers(&self, url: &str, extra_headers: &HeaderMap) -> HeaderMap {
        let mut headers = self.fake_headers.clone();

        for (name, value) in extra_headers {
            headers.insert(name.clone(), value.clone());
        }

        if !extra_headers.contains_key(REFERER)
            && let Ok(value) = HeaderValue::from_str(url)
        {
            headers.insert(REFERER, value);
        }

        if let Some(referer) = &self.referer {
            headers.insert(REFERER, referer.clone());
        }

        if let Some(cookie) = &self.cookie_header {
            headers.insert(COOKIE, cookie.clone());
        }

        headers
    }

    /// Optional request trace. Header values stay out of the log because the
    /// set includes the session cookie.
    fn trace_exchange(&self, method: &Method, url: &str, headers: &HeaderMap, status: u16) {
        if !self.http_debug {
            return;
        }
        let header_names: Vec<&str> = headers.keys().map(HeaderName::as_str).collect();
        debug!(%method, url, headers = ?header_names, status, "http exchange");
    }
}

fn build_client(config: &FetchConfig) -> Result<Client, FetchError> {
    // Trust-all TLS: the target sites routinely run on self-signed or
    // mismatched certificates. No overall request timeout is set; timeouts
    // exist only at connect time.
    let mut builder = Client::builder()
        .danger_accept_invalid_certs(true)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .deflate(true);

    if !config.http_proxy.is_empty() {
        let proxy =
            Proxy::all(&config.http_proxy).map_err(|e| FetchError::proxy(&config.http_proxy, e))?;
        builder = builder.proxy(proxy);
    } else if !config.socks5_proxy.is_empty() {
        let spec = if config.socks5_proxy.contains("://") {
            config.socks5_proxy.clone()
        } else {
            format!("socks5://{}", config.socks5_proxy)
        };
        let proxy = Proxy::all(&spec).map_err(|e| FetchError::proxy(&spec, e))?;
        builder = builder
            .proxy(proxy)
            .connect_timeout(SOCKS5_CONNECT_TIMEOUT)
            .tcp_keepalive(SOCKS5_KEEP_ALIVE);
    }

    builder
        .build()
        .map_err(|source| FetchError::ClientBuild { source })
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, FetchError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetchError::header(name, e.to_string()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| FetchError::header(name, e.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
