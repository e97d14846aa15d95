//! Certificate fetch operation.
//!
//! Probes a domain over HTTPS, falling back to plain HTTP on the final attempt, and
//! captures the certificate presented by the server.

mod transport;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;

use super::{Operation, OperationInput};
use crate::certificate::CertificateView;
use crate::config::ProbeSettings;
use crate::error_handling::{
    handle_error, OperationError, TransportError, KIND_NO_CERTIFICATE, KIND_NO_HTTPS,
    KIND_UNPARSEABLE_CERTIFICATE,
};
use crate::models::{DomainRecord, ProbeError, ProbeInfo, ProbeStatus, StageResult};

pub use transport::{ProbeRequest, ProbeResponse, ReqwestTransport, Transport};

/// Runs the attempt loop for one domain.
///
/// Every attempt but the last uses `https`; the last uses `http`. Attempts start with
/// the default timeout. The first timeout switches to the lenient timeout for the rest
/// of the domain's attempts, and a timeout at the lenient timeout stops the loop.
/// Known transport errors are recorded in the returned [`ProbeInfo`]; unclassified
/// ones abort with [`OperationError::Fatal`].
///
/// Returns a certificate view exactly when the probe status is `valid`.
pub async fn fetch_certificate(
    transport: &dyn Transport,
    settings: &ProbeSettings,
    domain: &str,
) -> Result<(ProbeInfo, Option<CertificateView>), OperationError> {
    let max_attempts = settings.max_attempts.max(1);
    let mut info = ProbeInfo::default();
    let mut view = None;
    let mut timeout = settings.default_timeout;

    for attempt in 1..=max_attempts {
        info.attempts = attempt;
        let https = attempt < max_attempts;
        let scheme = if https { "https" } else { "http" };
        let request = ProbeRequest {
            url: format!("{scheme}://{domain}"),
            timeout,
            browser_headers: settings.fake_browser_headers,
        };
        debug!(
            "Attempt {}/{} for {}: GET {} (timeout {:?})",
            attempt, max_attempts, domain, request.url, timeout
        );

        match transport.get(&request).await {
            Ok(response) => {
                info.home_page = Some(response.final_url.clone());
                info.redirected = response.redirected;

                match response.peer_certificate {
                    Some(der) => {
                        match CertificateView::from_bytes(&der) {
                            Ok(cert) => {
                                info.status = ProbeStatus::Valid;
                                view = Some(cert);
                            }
                            Err(e) => {
                                info.status = ProbeStatus::Unknown;
                                info.errors
                                    .push(ProbeError::new(KIND_UNPARSEABLE_CERTIFICATE, e.to_string()));
                            }
                        }
                        break;
                    }
                    None if https => {
                        info.status = ProbeStatus::Unknown;
                        info.errors.push(ProbeError::new(
                            KIND_NO_CERTIFICATE,
                            format!("no peer certificate in response from {}", response.final_url),
                        ));
                    }
                    None => {
                        info.status = ProbeStatus::Missing;
                        info.errors.push(ProbeError::new(
                            KIND_NO_HTTPS,
                            format!("{} answered over plain HTTP only", domain),
                        ));
                    }
                }
            }
            Err(TransportError::Known { class, message }) => {
                let (mut retry, kind) = handle_error(class);
                debug!("Attempt {attempt} for {domain} failed with {kind}: {message}");
                info.status = ProbeStatus::Unknown;
                info.errors
                    .push(ProbeError::new(kind, message).with_class(class.as_str()));

                if class.is_timeout() {
                    if timeout != settings.lenient_timeout {
                        timeout = settings.lenient_timeout;
                    } else {
                        retry = false;
                    }
                }
                if !retry {
                    break;
                }
            }
            Err(TransportError::Unclassified(e)) => {
                return Err(OperationError::Fatal(
                    e.context(format!("attempt {attempt} on {domain}")),
                ));
            }
        }
    }

    info.reason = if info.is_valid() {
        None
    } else {
        info.errors.last().map(|e| e.kind.clone())
    };

    Ok((info, view))
}

/// Fetch operation over a [`Transport`].
///
/// Built with [`CertFetch::new`] it creates a [`ReqwestTransport`] when opened; built
/// with [`CertFetch::with_transport`] it uses the given transport instead.
pub struct CertFetch {
    settings: ProbeSettings,
    injected: Option<Arc<dyn Transport>>,
    active: Option<Arc<dyn Transport>>,
}

impl CertFetch {
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            settings,
            injected: None,
            active: None,
        }
    }

    pub fn with_transport(settings: ProbeSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            injected: Some(transport),
            active: None,
        }
    }
}

#[async_trait]
impl Operation for CertFetch {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn open(&mut self) -> Result<()> {
        let transport: Arc<dyn Transport> = match &self.injected {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(ReqwestTransport::new(&self.settings)?),
        };
        self.active = Some(transport);
        Ok(())
    }

    async fn close(&mut self) {
        self.active = None;
    }

    fn prepare(&self, record: &DomainRecord) -> Option<OperationInput> {
        Some(OperationInput::Domain(record.domain.clone()))
    }

    async fn execute(&self, input: OperationInput) -> Result<Vec<StageResult>, OperationError> {
        let transport = self
            .active
            .as_ref()
            .ok_or_else(|| OperationError::Fatal(anyhow!("fetch operation used before open")))?;
        let OperationInput::Domain(domain) = input else {
            return Err(OperationError::Fatal(anyhow!(
                "fetch operation expects a domain input"
            )));
        };

        let (info, view) = fetch_certificate(transport.as_ref(), &self.settings, &domain).await?;

        let mut results = vec![StageResult::Probe(info)];
        if let Some(view) = view {
            results.push(StageResult::Certificate(view));
        }
        Ok(results)
    }
}
