//! Field extraction from parsed X.509 certificates.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, TimeZone, Utc};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::public_key::PublicKey;
use x509_parser::time::ASN1Time;
use x509_parser::x509::X509Name;

use super::constants::{
    rdn_name, OID_AIA_CA_ISSUERS, OID_AIA_OCSP, OID_KEY_DSA, OID_KEY_EC, OID_KEY_ED25519,
    OID_KEY_ED448, OID_KEY_RSA,
};
use super::DistinguishedName;
use crate::error_handling::CertificateError;

/// Lower-case hex serial number without leading zeros.
pub(crate) fn extract_serial(cert: &X509Certificate<'_>) -> String {
    let hex: String = cert
        .raw_serial()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect();
    match hex.trim_start_matches('0') {
        "" => "0".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Attribute pairs of a name in encoding order, keyed by long attribute name.
pub(crate) fn extract_name(name: &X509Name<'_>) -> DistinguishedName {
    let entries = name
        .iter_attributes()
        .map(|attr| {
            let oid = attr.attr_type().to_string();
            let key = rdn_name(&oid).map(str::to_string).unwrap_or(oid);
            let value = match attr.as_str() {
                Ok(value) => value.to_string(),
                // BMPString and friends
                Err(_) => String::from_utf8_lossy(attr.attr_value().as_bytes()).into_owned(),
            };
            (key, value)
        })
        .collect();
    DistinguishedName::new(entries)
}

pub(crate) fn asn1_time_to_datetime(time: ASN1Time) -> Result<DateTime<Utc>, CertificateError> {
    Utc.timestamp_opt(time.timestamp(), 0)
        .single()
        .ok_or_else(|| CertificateError::Der(format!("invalid validity time {time}")))
}

/// Key algorithm name and size in bits.
pub(crate) fn extract_key(cert: &X509Certificate<'_>) -> (String, Option<usize>) {
    let spki = cert.public_key();
    let alg_oid = spki.algorithm.algorithm.to_string();
    match alg_oid.as_str() {
        OID_KEY_RSA => {
            let size = match spki.parsed() {
                Ok(PublicKey::RSA(rsa)) => Some(rsa.key_size()),
                _ => None,
            };
            ("RSA".to_string(), size)
        }
        OID_KEY_EC => {
            let size = match spki.parsed() {
                Ok(PublicKey::EC(point)) => Some(point.key_size()),
                _ => None,
            };
            ("EC".to_string(), size)
        }
        OID_KEY_DSA => ("DSA".to_string(), None),
        OID_KEY_ED25519 => ("Ed25519".to_string(), Some(256)),
        OID_KEY_ED448 => ("Ed448".to_string(), Some(456)),
        _ => {
            log::warn!("Unknown public key algorithm {alg_oid}");
            (alg_oid, None)
        }
    }
}

/// Subject Alternative Names in encoding order.
///
/// DNS names, e-mail addresses, URIs and IP addresses are kept; other name forms are
/// skipped.
pub(crate) fn extract_sans(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut sans = Vec::new();

    if let Ok(Some(san)) = cert.subject_alternative_name() {
        for name in &san.value.general_names {
            match name {
                GeneralName::DNSName(dns) => sans.push(dns.to_string()),
                GeneralName::RFC822Name(email) => sans.push(email.to_string()),
                GeneralName::URI(uri) => sans.push(uri.to_string()),
                GeneralName::IPAddress(ip) => {
                    if let Some(ip) = ip_from_bytes(ip) {
                        sans.push(ip.to_string());
                    }
                }
                _ => {}
            }
        }
    }

    sans
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => {
            let octets: [u8; 4] = bytes.try_into().ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        16 => {
            let octets: [u8; 16] = bytes.try_into().ok()?;
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

/// Dotted OIDs from the Certificate Policies extension, in encoding order.
pub(crate) fn extract_policy_oids(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut oids = Vec::new();
    for ext in cert.extensions() {
        if let ParsedExtension::CertificatePolicies(policies) = ext.parsed_extension() {
            oids.extend(policies.iter().map(|policy| policy.policy_id.to_string()));
        }
    }
    oids
}

/// OCSP responder URL and CA issuers URL from Authority Information Access.
///
/// The first URI of each access method wins.
pub(crate) fn extract_aia(cert: &X509Certificate<'_>) -> (Option<String>, Option<String>) {
    let mut ocsp_url = None;
    let mut issuer_url = None;

    for ext in cert.extensions() {
        if let ParsedExtension::AuthorityInfoAccess(aia) = ext.parsed_extension() {
            for desc in &aia.accessdescs {
                let GeneralName::URI(uri) = &desc.access_location else {
                    continue;
                };
                match desc.access_method.to_string().as_str() {
                    OID_AIA_OCSP if ocsp_url.is_none() => ocsp_url = Some(uri.to_string()),
                    OID_AIA_CA_ISSUERS if issuer_url.is_none() => {
                        issuer_url = Some(uri.to_string())
                    }
                    _ => {}
                }
            }
        }
    }

    (ocsp_url, issuer_url)
}
