//! Browser-export cookie parsing for the configured cookie string.
//!
//! The `cookie` configuration value may hold the contents of a Netscape
//! HTTP cookie file (7 TAB-separated fields per line) as exported by browser
//! extensions. When it parses to at least one cookie, the parsed name=value
//! pairs are attached to outbound requests. When it does not parse (for
//! example a raw `uid=1; pass=abc` header copied from devtools, or a single
//! opaque token), the whole original string is sent verbatim as the `Cookie`
//! header instead.

use std::fmt;

use tracing::debug;

/// A single parsed cookie from a Netscape-format cookie export.
///
/// The value field is redacted in Debug output so session cookies never end
/// up in logs.
#[derive(Clone)]
pub struct BrowserCookie {
    /// The domain the cookie belongs to (e.g., `.example.com`).
    pub domain: String,
    /// The URL path scope for the cookie.
    pub path: String,
    /// Whether the cookie should only be sent over HTTPS.
    pub secure: bool,
    /// Unix timestamp for expiry (0 = session cookie).
    pub expires: u64,
    /// Cookie name.
    pub name: String,
    /// Cookie value (sensitive, never log).
    value: String,
}

impl BrowserCookie {
    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive — avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Renders the cookie as a `name=value` header pair.
    #[must_use]
    pub fn header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl fmt::Debug for BrowserCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserCookie")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("expires", &self.expires)
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Resolves the configured cookie string into a `Cookie` header value.
///
/// Netscape-format lines that parse yield their `name=value` pairs joined
/// with `; `. If parsing yields zero cookies the raw string is returned
/// unchanged. An empty or whitespace-only string yields `None` (no header).
#[must_use]
pub fn resolve_cookie_header(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    let cookies = parse_browser_cookies(raw);
    if cookies.is_empty() {
        debug!("cookie string is not a browser export, sending it verbatim");
        return Some(raw.to_owned());
    }

    debug!(count = cookies.len(), "parsed browser-export cookies");
    let pairs: Vec<String> = cookies.iter().map(BrowserCookie::header_pair).collect();
    Some(pairs.join("; "))
}

/// Parses Netscape-format cookie lines out of a string.
///
/// Blank lines and `#` comments (including the `# Netscape HTTP Cookie File`
/// header) are skipped. Malformed lines are skipped individually; the caller
/// decides what zero parsed cookies means.
#[must_use]
pub fn parse_browser_cookies(raw: &str) -> Vec<BrowserCookie> {
    raw.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_cookie_line)
        .collect()
}

/// Parses one `domain<TAB>tailmatch<TAB>path<TAB>secure<TAB>expires<TAB>name<TAB>value` line.
fn parse_cookie_line(line: &str) -> Option<BrowserCookie> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 7 {
        return None;
    }

    // tailmatch (fields[1]) is part of the format but irrelevant here:
    // every configured cookie is attached to every request.
    parse_bool_field(fields[1])?;
    let secure = parse_bool_field(fields[3])?;
    let expires = fields[4].parse::<u64>().ok()?;

    if fields[5].is_empty() {
        return None;
    }

    Some(BrowserCookie {
        domain: fields[0].to_owned(),
        path: fields[2].to_owned(),
        secure,
        expires,
        name: fields[5].to_owned(),
        value: fields[6].to_owned(),
    })
}

fn parse_bool_field(field: &str) -> Option<bool> {
    match field {
        "TRUE" | "true" => Some(true),
        "FALSE" | "false" => Some(false),
        _ => None,
    }
}
