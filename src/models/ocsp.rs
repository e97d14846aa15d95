//! Outcome of the OCSP stage.

use serde::Serialize;

/// Revocation status reported for a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OcspStatus {
    Good,
    Revoked,
    /// The responder does not know the certificate.
    Unknown,
    /// The certificate lacks an OCSP responder or issuer URL.
    Unavailable,
    /// No request produced a usable answer.
    ReqFailed,
}

impl OcspStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcspStatus::Good => "good",
            OcspStatus::Revoked => "revoked",
            OcspStatus::Unknown => "unknown",
            OcspStatus::Unavailable => "unavailable",
            OcspStatus::ReqFailed => "req_failed",
        }
    }
}

impl std::fmt::Display for OcspStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OcspInfo {
    pub status: OcspStatus,
}

impl OcspInfo {
    pub fn new(status: OcspStatus) -> Self {
        Self { status }
    }
}
