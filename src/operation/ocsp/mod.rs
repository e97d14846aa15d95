//! OCSP revocation check operation.
//!
//! For a captured certificate the operation reads the responder and CA issuers URLs
//! from Authority Information Access, downloads the issuer certificate, then sends a
//! GET request per hash algorithm (SHA-1 first, then SHA-256) until a responder
//! answers with a definitive status.

mod request;
mod response;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;

use super::{Operation, OperationInput};
use crate::certificate::CertificateView;
use crate::config::OCSP_TIMEOUT;
use crate::error_handling::OperationError;
use crate::initialization::init_ocsp_client;
use crate::models::{DomainRecord, OcspInfo, OcspStatus, StageResult};

pub use request::{build_ocsp_request, ocsp_request_url, OcspHash};
pub use response::{parse_ocsp_response, CertStatus, OcspResponse, ResponseStatus};

/// Downloads raw bodies for the OCSP operation.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// `reqwest` fetcher bounded by [`OCSP_TIMEOUT`].
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: init_ocsp_client()?,
        })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(OCSP_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        Ok(body.to_vec())
    }
}

/// Issuer certificates are usually served as DER; some CAs serve PEM.
fn issuer_der(raw: Vec<u8>) -> Result<Vec<u8>> {
    if raw.trim_ascii_start().starts_with(b"-----BEGIN") {
        let (_, pem) = x509_parser::pem::parse_x509_pem(&raw)
            .map_err(|e| anyhow!("invalid PEM issuer certificate: {e}"))?;
        Ok(pem.contents)
    } else {
        Ok(raw)
    }
}

/// Checks the revocation status of `cert`.
///
/// Returns `unavailable` when the certificate lacks either AIA URL and `req_failed`
/// when no request yields a definitive answer. Download failures are returned as
/// [`OperationError::Record`].
pub async fn check_ocsp(
    fetcher: &dyn HttpFetcher,
    cert: &CertificateView,
) -> Result<OcspStatus, OperationError> {
    let (Some(responder), Some(issuer_url)) = (cert.ocsp_url(), cert.issuer_url()) else {
        return Ok(OcspStatus::Unavailable);
    };

    let issuer = fetcher
        .get(issuer_url)
        .await
        .and_then(issuer_der)
        .context("fetching issuer certificate")
        .map_err(OperationError::Record)?;

    for hash in OcspHash::ALL {
        let request = build_ocsp_request(cert.der(), &issuer, hash)
            .map_err(|e| OperationError::Record(e.into()))?;
        let url = ocsp_request_url(responder, &request);
        let raw = fetcher
            .get(&url)
            .await
            .context("querying OCSP responder")
            .map_err(OperationError::Record)?;

        match parse_ocsp_response(&raw) {
            Ok(OcspResponse {
                status: ResponseStatus::Successful,
                cert_status: Some(status),
            }) => return Ok(status.into()),
            Ok(response) => debug!(
                "OCSP {} request for {} answered {:?}",
                hash,
                cert.serial_number(),
                response.status
            ),
            Err(e) => debug!(
                "OCSP {} request for {}: {}",
                hash,
                cert.serial_number(),
                e
            ),
        }
    }

    Ok(OcspStatus::ReqFailed)
}

/// OCSP operation over an [`HttpFetcher`].
///
/// Records without a certificate are skipped.
pub struct OcspCheck {
    injected: Option<Arc<dyn HttpFetcher>>,
    active: Option<Arc<dyn HttpFetcher>>,
}

impl OcspCheck {
    pub fn new() -> Self {
        Self {
            injected: None,
            active: None,
        }
    }

    pub fn with_fetcher(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self {
            injected: Some(fetcher),
            active: None,
        }
    }
}

impl Default for OcspCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Operation for OcspCheck {
    fn name(&self) -> &'static str {
        "ocsp"
    }

    async fn open(&mut self) -> Result<()> {
        let fetcher: Arc<dyn HttpFetcher> = match &self.injected {
            Some(fetcher) => Arc::clone(fetcher),
            None => Arc::new(ReqwestFetcher::new()?),
        };
        self.active = Some(fetcher);
        Ok(())
    }

    async fn close(&mut self) {
        self.active = None;
    }

    fn prepare(&self, record: &DomainRecord) -> Option<OperationInput> {
        record.cert.clone().map(OperationInput::Certificate)
    }

    async fn execute(&self, input: OperationInput) -> Result<Vec<StageResult>, OperationError> {
        let fetcher = self
            .active
            .as_ref()
            .ok_or_else(|| OperationError::Fatal(anyhow!("ocsp operation used before open")))?;
        let OperationInput::Certificate(cert) = input else {
            return Err(OperationError::Fatal(anyhow!(
                "ocsp operation expects a certificate input"
            )));
        };

        let status = check_ocsp(fetcher.as_ref(), &cert).await?;
        Ok(vec![StageResult::Ocsp(OcspInfo::new(status))])
    }
}
