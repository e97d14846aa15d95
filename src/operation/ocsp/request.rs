//! OCSP request construction.
//!
//! Builds a minimal DER `OCSPRequest` carrying a single `CertID` and no extensions:
//!
//! ```text
//! OCSPRequest ::= SEQUENCE { tbsRequest TBSRequest }
//! TBSRequest  ::= SEQUENCE { requestList SEQUENCE OF Request }
//! Request     ::= SEQUENCE { reqCert CertID }
//! CertID      ::= SEQUENCE { hashAlgorithm, issuerNameHash, issuerKeyHash, serialNumber }
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::error_handling::CertificateError;

const TAG_INTEGER: u8 = 0x02;
const TAG_OCTET_STRING: u8 = 0x04;
const TAG_NULL: u8 = 0x05;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;

// Encoded OID bodies
const OID_SHA1: &[u8] = &[0x2b, 0x0e, 0x03, 0x02, 0x1a];
const OID_SHA256: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];

/// Hash algorithm used for the CertID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcspHash {
    Sha1,
    Sha256,
}

impl OcspHash {
    /// Order in which requests are attempted.
    pub const ALL: [OcspHash; 2] = [OcspHash::Sha1, OcspHash::Sha256];

    fn oid(&self) -> &'static [u8] {
        match self {
            OcspHash::Sha1 => OID_SHA1,
            OcspHash::Sha256 => OID_SHA256,
        }
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            OcspHash::Sha1 => Sha1::digest(data).to_vec(),
            OcspHash::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

impl std::fmt::Display for OcspHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcspHash::Sha1 => f.write_str("SHA-1"),
            OcspHash::Sha256 => f.write_str("SHA-256"),
        }
    }
}

fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 4);
    out.push(tag);
    encode_length(content.len(), &mut out);
    out.extend_from_slice(content);
    out
}

fn sequence(parts: &[&[u8]]) -> Vec<u8> {
    tlv(TAG_SEQUENCE, &parts.concat())
}

fn parse<'a>(der: &'a [u8], what: &str) -> Result<X509Certificate<'a>, CertificateError> {
    X509Certificate::from_der(der)
        .map(|(_, cert)| cert)
        .map_err(|e| CertificateError::Der(format!("{what}: {e}")))
}

/// Builds the DER OCSP request for `cert_der` issued by `issuer_der`.
pub fn build_ocsp_request(
    cert_der: &[u8],
    issuer_der: &[u8],
    hash: OcspHash,
) -> Result<Vec<u8>, CertificateError> {
    let cert = parse(cert_der, "certificate")?;
    let issuer = parse(issuer_der, "issuer certificate")?;

    let algorithm = sequence(&[&tlv(TAG_OID, hash.oid()), &tlv(TAG_NULL, &[])]);
    let name_hash = tlv(
        TAG_OCTET_STRING,
        &hash.digest(issuer.subject().as_raw()),
    );
    let key_hash = tlv(
        TAG_OCTET_STRING,
        &hash.digest(&issuer.public_key().subject_public_key.data),
    );
    let serial = tlv(TAG_INTEGER, cert.raw_serial());

    let cert_id = sequence(&[&algorithm, &name_hash, &key_hash, &serial]);
    let request = sequence(&[&cert_id]);
    let request_list = sequence(&[&request]);
    let tbs_request = sequence(&[&request_list]);
    Ok(sequence(&[&tbs_request]))
}

/// GET URL for a DER request: the responder URL followed by the URL-encoded base64.
pub fn ocsp_request_url(responder: &str, request: &[u8]) -> String {
    let encoded = STANDARD.encode(request);
    let path: String = url::form_urlencoded::byte_serialize(encoded.as_bytes()).collect();
    format!("{}/{}", responder.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_encoding() {
        let mut out = Vec::new();
        encode_length(0x7f, &mut out);
        assert_eq!(out, vec![0x7f]);

        let mut out = Vec::new();
        encode_length(0x80, &mut out);
        assert_eq!(out, vec![0x81, 0x80]);

        let mut out = Vec::new();
        encode_length(0x1d4, &mut out);
        assert_eq!(out, vec![0x82, 0x01, 0xd4]);
    }

    #[test]
    fn test_null_algorithm_identifier() {
        let algorithm = sequence(&[&tlv(TAG_OID, OID_SHA1), &tlv(TAG_NULL, &[])]);
        assert_eq!(
            algorithm,
            vec![0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00]
        );
    }

    #[test]
    fn test_request_url_escapes_base64() {
        let url = ocsp_request_url("http://ocsp.example.test/", &[0xfb, 0xff, 0xfe]);
        // "+//+" in base64
        assert_eq!(url, "http://ocsp.example.test/%2B%2F%2F%2B");
    }

    #[test]
    fn test_digest_sizes() {
        assert_eq!(OcspHash::Sha1.digest(b"abc").len(), 20);
        assert_eq!(OcspHash::Sha256.digest(b"abc").len(), 32);
        assert_eq!(OcspHash::ALL, [OcspHash::Sha1, OcspHash::Sha256]);
    }

    #[test]
    fn test_unparseable_issuer_is_named() {
        let cert = include_bytes!("../../../tests/fixtures/dv.der");
        match build_ocsp_request(cert, &[0x30, 0x00], OcspHash::Sha1) {
            Err(CertificateError::Der(message)) => {
                assert!(message.starts_with("issuer certificate: "), "{message}")
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
