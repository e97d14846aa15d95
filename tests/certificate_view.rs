//! Certificate decoding against the fixture certificates.

mod helpers;

use chrono::{TimeZone, Utc};
use helpers::fixture;
use statcert::certificate::{CertificateView, PolicyType};

fn view(name: &str) -> CertificateView {
    CertificateView::from_der(&fixture(name)).expect("fixture should decode")
}

#[test]
fn test_ev_certificate_fields() {
    let cert = view("ev.der");

    assert_eq!(cert.serial_number(), "941ab95fcbcc437166569969fdf8cef2");
    assert_eq!(cert.policy_type(), PolicyType::Ev);
    assert_eq!(cert.policy_oids(), ["2.23.140.1.1".to_string()]);
    assert_eq!(cert.subject_name(), Some("Example Bank S.A."));
    assert_eq!(cert.issuer_name(), Some("Statcert Test Trust"));
    assert_eq!(cert.key_algorithm(), "RSA");
    assert_eq!(cert.key_length(), Some(2048));
    assert_eq!(
        cert.subject_alt_names(),
        ["www.example.bank".to_string(), "example.bank".to_string()]
    );

    let keys: Vec<&str> = cert.subject().iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec![
            "commonName",
            "organizationalUnitName",
            "organizationName",
            "countryName",
            "businessCategory",
            "jurisdictionCountryName",
            "serialNumber",
        ]
    );
    assert_eq!(cert.subject().get("businessCategory"), Some("Private Organization"));
    assert_eq!(cert.subject().get("jurisdictionCountryName"), Some("BR"));
}

#[test]
fn test_ov_certificate_fields() {
    let cert = view("ov.der");

    // leading zero nibbles of the serial are dropped
    assert_eq!(cert.serial_number(), "6788dcc8560c6793cb5921d644412a1");
    assert_eq!(cert.policy_type(), PolicyType::Ov);
    assert_eq!(cert.subject_name(), Some("Example Org, Inc."));
    assert_eq!(cert.subject().get("localityName"), Some("San Francisco"));
    assert_eq!(
        cert.subject_alt_names(),
        ["example.org".to_string(), "www.example.org".to_string()]
    );
}

#[test]
fn test_dv_certificate_fields() {
    let cert = view("dv.der");

    assert_eq!(cert.serial_number(), "afff8ea23c08f71f0a000000012e077a");
    assert_eq!(cert.policy_type(), PolicyType::Dv);
    // no organization: falls back to the common name
    assert_eq!(cert.subject_name(), Some("www.example.com"));
    assert_eq!(cert.key_algorithm(), "EC");
    assert_eq!(cert.key_length(), Some(256));
    assert_eq!(cert.ocsp_url(), Some("http://ocsp.statcert.test"));
    assert_eq!(cert.issuer_url(), Some("http://certs.statcert.test/ca.der"));
}

#[test]
fn test_validity_window() {
    let cert = view("dv.der");
    assert_eq!(
        cert.not_before(),
        Utc.with_ymd_and_hms(2024, 1, 10, 3, 35, 32).unwrap()
    );
    assert_eq!(
        cert.not_after(),
        Utc.with_ymd_and_hms(2025, 1, 9, 3, 35, 31).unwrap()
    );
    assert_eq!(cert.duration().num_days(), 364);
}

#[test]
fn test_certificate_without_extensions_of_interest() {
    let cert = view("bare.der");
    assert_eq!(cert.serial_number(), "2a");
    assert_eq!(cert.policy_type(), PolicyType::Unknown);
    assert!(cert.policy_oids().is_empty());
    assert_eq!(cert.ocsp_url(), None);
    assert_eq!(cert.issuer_url(), None);
}

#[test]
fn test_issuer_distinguished_name() {
    let cert = view("ov.der");
    assert_eq!(
        cert.issuer().to_string(),
        "commonName=Statcert Test CA R1, organizationName=Statcert Test Trust, countryName=US"
    );
}

#[test]
fn test_pem_and_der_decode_to_the_same_view() {
    let from_pem = CertificateView::from_bytes(&fixture("dv.pem")).unwrap();
    let from_der = CertificateView::from_bytes(&fixture("dv.der")).unwrap();
    assert_eq!(from_pem, from_der);
    assert_eq!(from_pem.serial_number(), from_der.serial_number());

    let round_trip = CertificateView::from_pem(from_der.to_pem().as_bytes()).unwrap();
    assert_eq!(round_trip, from_der);
}

#[test]
fn test_pem_output_matches_openssl_armor() {
    let cert = view("dv.der");
    let expected = String::from_utf8(fixture("dv.pem")).unwrap();
    assert_eq!(cert.to_pem(), expected);
}

#[test]
fn test_trailing_bytes_are_not_part_of_the_view() {
    let mut padded = fixture("dv.der");
    padded.extend_from_slice(&[0, 0, 0]);
    let cert = CertificateView::from_der(&padded).unwrap();
    assert_eq!(cert.der(), fixture("dv.der").as_slice());
}

#[test]
fn test_serialized_summary() {
    let json = serde_json::to_value(view("ev.der")).unwrap();
    assert_eq!(json["policy_type"], "EV");
    assert_eq!(json["subject_name"], "Example Bank S.A.");
    assert_eq!(json["duration_days"], 364);
    assert_eq!(json["key_alg"], "RSA");
    assert_eq!(json["subject"]["commonName"], "www.example.bank");
    assert_eq!(json["not_before"], "2024-01-10T03:35:32Z");
}
