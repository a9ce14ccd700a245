//! HTTP retrieval layer.
//!
//! Everything that touches the network lives here: the [`HttpClient`]
//! wrapper with proxying, fake headers, cookie injection and bounded retry,
//! plus the browser-export cookie parsing it relies on.

mod client;
mod cookies;
mod error;

pub use client::{FetchConfig, FetchResponse, HttpClient};
pub use cookies::{BrowserCookie, parse_browser_cookies, resolve_cookie_header};
pub use error::FetchError;
