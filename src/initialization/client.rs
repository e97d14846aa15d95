//! HTTP client initialization.

use reqwest::redirect::Policy;
use reqwest::ClientBuilder;

use crate::config::{ProbeSettings, MAX_REDIRECT_HOPS, OCSP_TIMEOUT, PLAIN_USER_AGENT};

/// Initializes the client used by the fetch operation.
///
/// - TLS session info is kept on responses so the peer certificate can be read
/// - certificates are captured without verification unless `strict_tls` is set
/// - redirects are followed up to `MAX_REDIRECT_HOPS` when allowed
/// - the lenient timeout bounds every request; attempts set their own, shorter one
pub fn init_probe_client(settings: &ProbeSettings) -> Result<reqwest::Client, reqwest::Error> {
    let redirect = if settings.allow_redirects {
        Policy::limited(MAX_REDIRECT_HOPS)
    } else {
        Policy::none()
    };

    ClientBuilder::new()
        .user_agent(PLAIN_USER_AGENT)
        .redirect(redirect)
        .tls_info(true)
        .danger_accept_invalid_certs(!settings.strict_tls)
        .timeout(settings.lenient_timeout)
        .build()
}

/// Initializes the client used to download issuer certificates and OCSP responses.
pub fn init_ocsp_client() -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .user_agent(PLAIN_USER_AGENT)
        .timeout(OCSP_TIMEOUT)
        .build()
}
