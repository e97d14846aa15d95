//! Data model for probe results.
//!
//! A [`DomainRecord`] accumulates one [`StageResult`] per stage:
//! - `probe`: [`ProbeInfo`], produced by the fetch operation
//! - `cert`: the captured certificate, produced by the fetch operation
//! - `ocsp`: [`OcspInfo`], produced by the OCSP operation

mod ocsp;
mod probe;
mod record;

pub use ocsp::{OcspInfo, OcspStatus};
pub use probe::{ProbeError, ProbeInfo, ProbeStatus};
pub use record::{DomainRecord, StageResult};
