//! OCSP response decoding.
//!
//! Only the parts needed to report a status are read: the response status and the
//! `certStatus` of the first `SingleResponse`. Signatures are not checked.

use thiserror::Error;
use x509_parser::der_parser::ber::{BerObject, Class};
use x509_parser::der_parser::parse_der;

use crate::models::OcspStatus;

// id-pkix-ocsp-basic (1.3.6.1.5.5.7.48.1.1)
const OID_OCSP_BASIC: &[u8] = &[0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01, 0x01];

#[derive(Error, Debug, PartialEq, Eq)]
#[error("malformed OCSP response: {0}")]
pub struct MalformedResponse(&'static str);

/// `OCSPResponseStatus` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Successful,
    MalformedRequest,
    InternalError,
    TryLater,
    SigRequired,
    Unauthorized,
    Unrecognized(u8),
}

impl From<u8> for ResponseStatus {
    fn from(value: u8) -> Self {
        match value {
            0 => ResponseStatus::Successful,
            1 => ResponseStatus::MalformedRequest,
            2 => ResponseStatus::InternalError,
            3 => ResponseStatus::TryLater,
            5 => ResponseStatus::SigRequired,
            6 => ResponseStatus::Unauthorized,
            other => ResponseStatus::Unrecognized(other),
        }
    }
}

/// Status of the certificate named in a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertStatus {
    Good,
    Revoked,
    Unknown,
}

impl From<CertStatus> for OcspStatus {
    fn from(status: CertStatus) -> Self {
        match status {
            CertStatus::Good => OcspStatus::Good,
            CertStatus::Revoked => OcspStatus::Revoked,
            CertStatus::Unknown => OcspStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcspResponse {
    pub status: ResponseStatus,
    /// Present only for successful responses.
    pub cert_status: Option<CertStatus>,
}

fn parse_object<'a>(der: &'a [u8], what: &'static str) -> Result<BerObject<'a>, MalformedResponse> {
    parse_der(der)
        .map(|(_, obj)| obj)
        .map_err(|_| MalformedResponse(what))
}

/// Decodes the response status and, when successful, the first certificate status.
pub fn parse_ocsp_response(der: &[u8]) -> Result<OcspResponse, MalformedResponse> {
    // OCSPResponse ::= SEQUENCE { responseStatus, responseBytes [0] EXPLICIT OPTIONAL }
    let outer = parse_object(der, "unreadable OCSPResponse")?;
    let outer = outer
        .as_sequence()
        .map_err(|_| MalformedResponse("OCSPResponse is not a sequence"))?;

    let status = outer
        .first()
        .and_then(|obj| obj.as_u32().ok())
        .and_then(|value| u8::try_from(value).ok())
        .map(ResponseStatus::from)
        .ok_or(MalformedResponse("bad responseStatus"))?;
    if status != ResponseStatus::Successful {
        return Ok(OcspResponse {
            status,
            cert_status: None,
        });
    }

    let wrapper = outer
        .get(1)
        .and_then(|obj| obj.as_slice().ok())
        .ok_or(MalformedResponse("missing responseBytes"))?;
    let response_bytes = parse_object(wrapper, "unreadable responseBytes")?;
    let response_bytes = response_bytes
        .as_sequence()
        .map_err(|_| MalformedResponse("bad responseBytes"))?;
    let response_type = response_bytes
        .first()
        .and_then(|obj| obj.as_oid().ok())
        .ok_or(MalformedResponse("missing responseType"))?;
    if response_type.as_bytes() != OID_OCSP_BASIC {
        return Err(MalformedResponse("not a basic OCSP response"));
    }
    let basic = response_bytes
        .get(1)
        .and_then(|obj| obj.as_slice().ok())
        .ok_or(MalformedResponse("missing response"))?;

    let basic = parse_object(basic, "unreadable BasicOCSPResponse")?;
    let basic = basic
        .as_sequence()
        .map_err(|_| MalformedResponse("bad BasicOCSPResponse"))?;
    let response_data = basic
        .first()
        .and_then(|obj| obj.as_sequence().ok())
        .ok_or(MalformedResponse("bad tbsResponseData"))?;

    // version, responderID and producedAt are never sequences; `responses` is.
    let responses = response_data
        .iter()
        .find_map(|obj| obj.as_sequence().ok())
        .ok_or(MalformedResponse("missing responses"))?;
    let single = responses
        .first()
        .and_then(|obj| obj.as_sequence().ok())
        .ok_or(MalformedResponse("no SingleResponse"))?;
    if single.first().and_then(|obj| obj.as_sequence().ok()).is_none() {
        return Err(MalformedResponse("missing certID"));
    }

    let cert_status = single
        .get(1)
        .ok_or(MalformedResponse("missing certStatus"))?;
    if cert_status.header.class() != Class::ContextSpecific {
        return Err(MalformedResponse("unrecognized certStatus"));
    }
    let cert_status = match cert_status.header.tag().0 {
        0 => CertStatus::Good,
        1 => CertStatus::Revoked,
        2 => CertStatus::Unknown,
        _ => return Err(MalformedResponse("unrecognized certStatus")),
    };

    Ok(OcspResponse {
        status,
        cert_status: Some(cert_status),
    })
}
