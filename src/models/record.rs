//! Per-domain accumulator for stage results.

use log::warn;

use super::{OcspInfo, ProbeInfo};
use crate::certificate::CertificateView;

/// Output of one operation for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    Probe(ProbeInfo),
    Certificate(CertificateView),
    Ocsp(OcspInfo),
}

impl StageResult {
    /// Stage name the result is stored under.
    pub fn stage(&self) -> &'static str {
        match self {
            StageResult::Probe(_) => "probe",
            StageResult::Certificate(_) => "cert",
            StageResult::Ocsp(_) => "ocsp",
        }
    }
}

/// One domain's journey through the pipeline.
///
/// Identity (`index`, `domain`, `user_info`) is fixed at creation. Each stage holds at
/// most one result; appending a second result for the same stage replaces the first
/// and logs a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// 1-based position in the input.
    pub index: usize,
    pub domain: String,
    /// Extra input columns, in input order.
    pub user_info: Vec<(String, String)>,
    pub probe: Option<ProbeInfo>,
    pub cert: Option<CertificateView>,
    pub ocsp: Option<OcspInfo>,
}

impl DomainRecord {
    pub fn new(index: usize, domain: impl Into<String>) -> Self {
        Self {
            index,
            domain: domain.into(),
            user_info: Vec::new(),
            probe: None,
            cert: None,
            ocsp: None,
        }
    }

    pub fn with_user_info(mut self, user_info: Vec<(String, String)>) -> Self {
        self.user_info = user_info;
        self
    }

    /// Stores a stage result, replacing (and warning about) any earlier one.
    pub fn append(&mut self, result: StageResult) {
        let stage = result.stage();
        let replaced = match result {
            StageResult::Probe(probe) => self.probe.replace(probe).is_some(),
            StageResult::Certificate(cert) => self.cert.replace(cert).is_some(),
            StageResult::Ocsp(ocsp) => self.ocsp.replace(ocsp).is_some(),
        };
        if replaced {
            warn!(
                "Overwriting {} result of record #{} ({})",
                stage, self.index, self.domain
            );
        }
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = StageResult>) {
        for result in results {
            self.append(result);
        }
    }

    /// Stage names that currently hold a result, in pipeline order.
    pub fn stages(&self) -> Vec<&'static str> {
        let mut stages = Vec::with_capacity(3);
        if self.probe.is_some() {
            stages.push("probe");
        }
        if self.cert.is_some() {
            stages.push("cert");
        }
        if self.ocsp.is_some() {
            stages.push("ocsp");
        }
        stages
    }
}
