//! Browser request headers.
//!
//! Many origins (and the reverse proxies in front of them) special-case known
//! scanners and answer them differently than a browser. Probe requests present
//! this header set so the certificate captured is the one browsers see.

/// User-Agent sent when browser headers are enabled.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:96.0) Gecko/20100101 Firefox/96.0";

/// User-Agent sent when browser headers are disabled.
pub const PLAIN_USER_AGENT: &str = concat!("statcert/", env!("CARGO_PKG_VERSION"));

/// Headers presented on every probe request when browser headers are enabled.
///
/// To add/remove headers, modify this array.
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("user-agent", BROWSER_USER_AGENT),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "*"),
    ("accept-encoding", "gzip, deflate"),
    ("upgrade-insecure-requests", "1"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "cross-site"),
    ("sec-fetch-user", "?1"),
    ("pragma", "no-cache"),
    ("cache-control", "no-cache"),
];
