//! Pipeline operations.
//!
//! An [`Operation`] is one stage of the probe pipeline. The runner opens every
//! operation once, then for each record asks [`Operation::prepare`] for the input
//! the stage needs and hands it to [`Operation::execute`]. Operations that acquire
//! clients do so in `open` and release them in `close`.
//!
//! Two operations are provided:
//! - [`CertFetch`]: HTTPS probe with HTTP fallback, captures the peer certificate
//! - [`OcspCheck`]: OCSP revocation check of the captured certificate

mod fetch;
mod ocsp;

use anyhow::Result;
use async_trait::async_trait;

use crate::certificate::CertificateView;
use crate::error_handling::OperationError;
use crate::models::{DomainRecord, StageResult};

pub use fetch::{
    fetch_certificate, CertFetch, ProbeRequest, ProbeResponse, ReqwestTransport, Transport,
};
pub use ocsp::{
    build_ocsp_request, check_ocsp, ocsp_request_url, parse_ocsp_response, CertStatus,
    HttpFetcher, OcspCheck, OcspHash, OcspResponse, ReqwestFetcher, ResponseStatus,
};

/// Input extracted from a record for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationInput {
    Domain(String),
    Certificate(CertificateView),
}

#[async_trait]
pub trait Operation: Send + Sync {
    /// Short name used in logs and progress events.
    fn name(&self) -> &'static str;

    /// Acquires the resources shared by every execution.
    async fn open(&mut self) -> Result<()>;

    /// Releases what `open` acquired. Called once, even after failures.
    async fn close(&mut self);

    /// Selects the input for this record, or `None` to skip the record.
    fn prepare(&self, record: &DomainRecord) -> Option<OperationInput>;

    async fn execute(&self, input: OperationInput) -> Result<Vec<StageResult>, OperationError>;
}
