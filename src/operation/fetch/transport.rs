//! HTTP transport used by the fetch operation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::tls::TlsInfo;
use url::Url;

use crate::config::{ProbeSettings, BROWSER_HEADERS};
use crate::error_handling::{transport_error_from_reqwest, InitializationError, TransportError};
use crate::initialization::init_probe_client;

/// One GET issued by the fetch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub url: String,
    pub timeout: Duration,
    pub browser_headers: bool,
}

/// What the fetch loop needs from a response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeResponse {
    /// URL after following redirects.
    pub final_url: String,
    pub redirected: bool,
    /// DER of the certificate presented on the final connection, if it used TLS.
    pub peer_certificate: Option<Vec<u8>>,
}

/// Issues probe requests. Implemented over `reqwest` and by test stubs.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &ProbeRequest) -> Result<ProbeResponse, TransportError>;
}

/// `reqwest` transport that records the peer certificate without verifying it
/// (unless the settings ask for strict TLS).
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: &ProbeSettings) -> Result<Self, InitializationError> {
        Ok(Self {
            client: init_probe_client(settings)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &ProbeRequest) -> Result<ProbeResponse, TransportError> {
        let mut builder = self.client.get(&request.url).timeout(request.timeout);
        if request.browser_headers {
            for (name, value) in BROWSER_HEADERS {
                builder = builder.header(*name, *value);
            }
        }

        let response = builder.send().await.map_err(transport_error_from_reqwest)?;

        let final_url = response.url().clone();
        let redirected = Url::parse(&request.url)
            .map(|requested| requested != final_url)
            .unwrap_or(false);
        let peer_certificate = response
            .extensions()
            .get::<TlsInfo>()
            .and_then(|info| info.peer_certificate())
            .map(|der| der.to_vec());

        Ok(ProbeResponse {
            final_url: final_url.to_string(),
            redirected,
            peer_certificate,
        })
    }
}
