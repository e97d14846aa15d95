//! Read-only view over a captured X.509 certificate.
//!
//! Certificates are decoded once with `x509-parser` and the fields the probe reports
//! are copied into an owned [`CertificateView`]:
//! - serial number, subject and issuer (attribute order preserved)
//! - validity period
//! - public key algorithm and size
//! - Subject Alternative Names
//! - certificate policies and the validation level they imply
//! - Authority Information Access URLs (OCSP responder and CA issuers)

mod constants;
mod extract;

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeDelta, Utc};
use log::warn;
use serde::{Serialize, Serializer};
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::error_handling::CertificateError;

pub use constants::{OID_AIA_CA_ISSUERS, OID_AIA_OCSP, POLICY_TYPES, RDN_NAMES};

use constants::policy_type_of;
use extract::{
    asn1_time_to_datetime, extract_aia, extract_key, extract_name, extract_policy_oids,
    extract_sans, extract_serial,
};

/// Validation level implied by a certificate's policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PolicyType {
    Unknown,
    Dv,
    Ov,
    Ev,
}

impl PolicyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Ev => "EV",
            PolicyType::Ov => "OV",
            PolicyType::Dv => "DV",
            PolicyType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PolicyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Ordered attribute pairs of a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistinguishedName(Vec<(String, String)>);

impl DistinguishedName {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self(entries)
    }

    /// First value recorded for an attribute.
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == attribute)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl Serialize for DistinguishedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Immutable snapshot of a certificate presented by a server.
///
/// Two views are equal when their DER encodings are equal.
#[derive(Clone)]
pub struct CertificateView {
    der: Vec<u8>,
    serial_number: String,
    subject: DistinguishedName,
    issuer: DistinguishedName,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    key_algorithm: String,
    key_length: Option<usize>,
    subject_alt_names: Vec<String>,
    policy_oids: Vec<String>,
    ocsp_url: Option<String>,
    issuer_url: Option<String>,
}

impl CertificateView {
    /// Decodes a certificate from DER or PEM bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CertificateError> {
        if bytes.trim_ascii_start().starts_with(b"-----BEGIN") {
            Self::from_pem(bytes)
        } else {
            Self::from_der(bytes)
        }
    }

    pub fn from_pem(pem: &[u8]) -> Result<Self, CertificateError> {
        let (_, pem) = x509_parser::pem::parse_x509_pem(pem)
            .map_err(|e| CertificateError::Pem(e.to_string()))?;
        if pem.label != "CERTIFICATE" {
            return Err(CertificateError::UnexpectedPemLabel(pem.label));
        }
        Self::from_der(&pem.contents)
    }

    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (rest, cert) =
            X509Certificate::from_der(der).map_err(|e| CertificateError::Der(e.to_string()))?;
        let der = der[..der.len() - rest.len()].to_vec();

        let (key_algorithm, key_length) = extract_key(&cert);
        let (ocsp_url, issuer_url) = extract_aia(&cert);

        Ok(Self {
            serial_number: extract_serial(&cert),
            subject: extract_name(cert.subject()),
            issuer: extract_name(cert.issuer()),
            not_before: asn1_time_to_datetime(cert.validity().not_before)?,
            not_after: asn1_time_to_datetime(cert.validity().not_after)?,
            key_algorithm,
            key_length,
            subject_alt_names: extract_sans(&cert),
            policy_oids: extract_policy_oids(&cert),
            ocsp_url,
            issuer_url,
            der,
        })
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// PEM encoding of the certificate.
    pub fn to_pem(&self) -> String {
        let pem = ::pem::Pem::new("CERTIFICATE", self.der.clone());
        ::pem::encode_config(
            &pem,
            ::pem::EncodeConfig::new().set_line_ending(::pem::LineEnding::LF),
        )
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    /// Subject organization, falling back to the common name.
    pub fn subject_name(&self) -> Option<&str> {
        self.subject
            .get("organizationName")
            .or_else(|| self.subject.get("commonName"))
    }

    pub fn issuer_name(&self) -> Option<&str> {
        self.issuer
            .get("organizationName")
            .or_else(|| self.issuer.get("commonName"))
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    pub fn duration(&self) -> TimeDelta {
        self.not_after - self.not_before
    }

    pub fn key_algorithm(&self) -> &str {
        &self.key_algorithm
    }

    pub fn key_length(&self) -> Option<usize> {
        self.key_length
    }

    pub fn subject_alt_names(&self) -> &[String] {
        &self.subject_alt_names
    }

    pub fn policy_oids(&self) -> &[String] {
        &self.policy_oids
    }

    /// Validation level from the policy OIDs.
    ///
    /// When policies point at different levels the highest one is reported.
    pub fn policy_type(&self) -> PolicyType {
        let mut matching: Vec<PolicyType> = self
            .policy_oids
            .iter()
            .filter_map(|oid| policy_type_of(oid))
            .collect();
        matching.sort();
        matching.dedup();

        match matching.as_slice() {
            [] => {
                log::debug!(
                    "No known policy type for certificate {}; oids: {:?}",
                    self.serial_number,
                    self.policy_oids
                );
                PolicyType::Unknown
            }
            [single] => *single,
            several => {
                warn!(
                    "Certificate {} declares multiple policy types: {:?}",
                    self.serial_number, several
                );
                several.iter().copied().max().unwrap_or(PolicyType::Unknown)
            }
        }
    }

    /// OCSP responder URL from Authority Information Access.
    pub fn ocsp_url(&self) -> Option<&str> {
        self.ocsp_url.as_deref()
    }

    /// CA issuers URL from Authority Information Access.
    pub fn issuer_url(&self) -> Option<&str> {
        self.issuer_url.as_deref()
    }
}

impl PartialEq for CertificateView {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for CertificateView {}

impl Hash for CertificateView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.der.hash(state);
    }
}

impl fmt::Debug for CertificateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail = &self.serial_number[self.serial_number.len().saturating_sub(8)..];
        write!(f, "Certificate({tail})")
    }
}

#[derive(Serialize)]
struct CertificateSummary<'a> {
    serial_number: &'a str,
    subject_name: Option<&'a str>,
    issuer_name: Option<&'a str>,
    subject: &'a DistinguishedName,
    issuer: &'a DistinguishedName,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    duration_days: i64,
    key_alg: &'a str,
    key_length: Option<usize>,
    subject_alt_names: &'a [String],
    policy_oids: &'a [String],
    policy_type: PolicyType,
}

impl Serialize for CertificateView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CertificateSummary {
            serial_number: &self.serial_number,
            subject_name: self.subject_name(),
            issuer_name: self.issuer_name(),
            subject: &self.subject,
            issuer: &self.issuer,
            not_before: self.not_before,
            not_after: self.not_after,
            duration_days: self.duration().num_days(),
            key_alg: &self.key_algorithm,
            key_length: self.key_length,
            subject_alt_names: &self.subject_alt_names,
            policy_oids: &self.policy_oids,
            policy_type: self.policy_type(),
        }
        .serialize(serializer)
    }
}
