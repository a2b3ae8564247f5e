//! URL normalization into the canonical comparison form.
//!
//! Every list candidate and every queried URL passes through [`normalize`]
//! so membership checks always compare like with like. Normalization is
//! idempotent, and invalid input produces `None` rather than an error the
//! caller has to unwind: classification treats it as "no data".

use std::borrow::Cow;
use std::fmt;

// Leading `::` disambiguates the external crate from this module.
use ::url::Url;

// =============================================================================
// Scheme
// =============================================================================

/// Supported URL schemes. Everything else is invalid for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

// =============================================================================
// NormalizedUrl
// =============================================================================

/// A URL reduced to its canonical comparison form.
///
/// The serialized form has no query, no fragment, no trailing slash run, a
/// lowercase host with any leading `www.` label removed, and an explicit
/// scheme (bare input is assumed to be HTTPS).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedUrl {
    scheme: Scheme,
    host: String,
    port: Option<u16>,
    path: String,
    serialized: String,
}

impl NormalizedUrl {
    /// The canonical serialized form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.serialized
    }

    #[inline]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Non-default port, if the URL carried one.
    #[inline]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Path with the trailing slash run removed; empty for a root URL.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The derived root form: scheme and host only, no port, no path.
    pub fn root(&self) -> NormalizedUrl {
        NormalizedUrl {
            scheme: self.scheme,
            host: self.host.clone(),
            port: None,
            path: String::new(),
            serialized: format!("{}://{}", self.scheme.as_str(), self.host),
        }
    }

    /// True if this value is already a root form.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.path.is_empty() && self.port.is_none()
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized)
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Check for an explicit http/https scheme without parsing.
#[inline]
fn has_supported_scheme(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    (bytes.len() >= 7 && bytes[..7].eq_ignore_ascii_case(b"http://"))
        || (bytes.len() >= 8 && bytes[..8].eq_ignore_ascii_case(b"https://"))
}

/// Normalize a raw string into the canonical comparison form.
///
/// Returns `None` for input that cannot be interpreted as an http(s) URL
/// with a host. The failure is logged as a warning; callers fall through
/// to a no-data classification.
pub fn normalize(raw: &str) -> Option<NormalizedUrl> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        log::warn!("empty URL skipped");
        return None;
    }

    let candidate: Cow<'_, str> = if has_supported_scheme(trimmed) {
        Cow::Borrowed(trimmed)
    } else {
        // Bare domains are assumed to be HTTPS.
        Cow::Owned(format!("https://{trimmed}"))
    };

    let mut parsed = match Url::parse(&candidate) {
        Ok(url) => url,
        Err(err) => {
            log::warn!("invalid URL skipped: {trimmed} ({err})");
            return None;
        }
    };

    let scheme = match parsed.scheme() {
        "http" => Scheme::Http,
        "https" => Scheme::Https,
        other => {
            log::warn!("unsupported scheme '{other}' skipped: {trimmed}");
            return None;
        }
    };

    parsed.set_query(None);
    parsed.set_fragment(None);

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
        _ => {
            log::warn!("URL without host skipped: {trimmed}");
            return None;
        }
    };
    let host = match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => host,
    };

    let port = parsed.port();
    let path = parsed.path().trim_end_matches('/').to_string();

    let mut serialized = format!("{}://{}", scheme.as_str(), host);
    if let Some(port) = port {
        serialized.push(':');
        serialized.push_str(&port.to_string());
    }
    serialized.push_str(&path);

    Some(NormalizedUrl {
        scheme,
        host,
        port,
        path,
        serialized,
    })
}
