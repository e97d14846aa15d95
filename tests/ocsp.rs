//! OCSP request construction and status resolution against fixtures.

mod helpers;

use std::sync::Arc;

use helpers::{fixture, StubFetcher, ISSUER_URL, OCSP_RESPONDER};
use statcert::certificate::CertificateView;
use statcert::error_handling::OperationError;
use statcert::models::{DomainRecord, OcspStatus, StageResult};
use statcert::operation::{
    build_ocsp_request, check_ocsp, ocsp_request_url, OcspCheck, OcspHash, Operation,
};

fn dv() -> CertificateView {
    CertificateView::from_der(&fixture("dv.der")).unwrap()
}

fn request_url(fixture_name: &str) -> String {
    ocsp_request_url(OCSP_RESPONDER, &fixture(fixture_name))
}

#[test]
fn test_requests_match_reference_encoding() {
    let cert = fixture("dv.der");
    let issuer = fixture("ca.der");
    assert_eq!(
        build_ocsp_request(&cert, &issuer, OcspHash::Sha1).unwrap(),
        fixture("ocsp_request_sha1.der")
    );
    assert_eq!(
        build_ocsp_request(&cert, &issuer, OcspHash::Sha256).unwrap(),
        fixture("ocsp_request_sha256.der")
    );
}

#[tokio::test]
async fn test_good_answer_on_first_hash() {
    let fetcher = StubFetcher::with_answers(vec![fixture("ocsp_good.der")]);
    let status = check_ocsp(&fetcher, &dv()).await.unwrap();

    assert_eq!(status, OcspStatus::Good);
    assert_eq!(fetcher.urls()[0], ISSUER_URL);
    assert_eq!(fetcher.ocsp_urls(), vec![request_url("ocsp_request_sha1.der")]);
}

#[tokio::test]
async fn test_revoked_answer() {
    let fetcher = StubFetcher::with_answers(vec![fixture("ocsp_revoked.der")]);
    assert_eq!(check_ocsp(&fetcher, &dv()).await.unwrap(), OcspStatus::Revoked);
}

#[tokio::test]
async fn test_unknown_answer_is_definitive() {
    let fetcher = StubFetcher::with_answers(vec![
        fixture("ocsp_unknown.der"),
        fixture("ocsp_good.der"),
    ]);
    let status = check_ocsp(&fetcher, &dv()).await.unwrap();

    assert_eq!(status, OcspStatus::Unknown);
    // the SHA-256 request is never sent
    assert_eq!(fetcher.ocsp_urls(), vec![request_url("ocsp_request_sha1.der")]);
}

#[tokio::test]
async fn test_unsuccessful_status_moves_to_next_hash() {
    let fetcher = StubFetcher::with_answers(vec![
        fixture("ocsp_try_later.der"),
        fixture("ocsp_good.der"),
    ]);
    let status = check_ocsp(&fetcher, &dv()).await.unwrap();

    assert_eq!(status, OcspStatus::Good);
    assert_eq!(
        fetcher.ocsp_urls(),
        vec![
            request_url("ocsp_request_sha1.der"),
            request_url("ocsp_request_sha256.der"),
        ]
    );
}

#[tokio::test]
async fn test_no_definitive_answer_is_req_failed() {
    let fetcher = StubFetcher::with_answers(vec![
        fixture("ocsp_try_later.der"),
        b"garbage".to_vec(),
    ]);
    assert_eq!(check_ocsp(&fetcher, &dv()).await.unwrap(), OcspStatus::ReqFailed);
}

#[tokio::test]
async fn test_missing_aia_is_unavailable() {
    let fetcher = StubFetcher::with_answers(Vec::new());
    let bare = CertificateView::from_der(&fixture("bare.der")).unwrap();

    assert_eq!(check_ocsp(&fetcher, &bare).await.unwrap(), OcspStatus::Unavailable);
    assert!(fetcher.urls().is_empty());
}

#[tokio::test]
async fn test_pem_issuer_is_accepted() {
    let pem = CertificateView::from_der(&fixture("ca.der")).unwrap().to_pem();
    let fetcher = StubFetcher::with_answers(vec![fixture("ocsp_good.der")])
        .serve(ISSUER_URL, pem.into_bytes());
    assert_eq!(check_ocsp(&fetcher, &dv()).await.unwrap(), OcspStatus::Good);
    assert_eq!(fetcher.ocsp_urls(), vec![request_url("ocsp_request_sha1.der")]);
}

#[tokio::test]
async fn test_responder_failure_abandons_the_record() {
    let fetcher = StubFetcher::with_answers(Vec::new());
    let result = check_ocsp(&fetcher, &dv()).await;
    assert!(matches!(result, Err(OperationError::Record(_))));
}

#[tokio::test]
async fn test_operation_skips_records_without_certificate() {
    let fetcher = Arc::new(StubFetcher::with_answers(vec![fixture("ocsp_good.der")]));
    let mut op = OcspCheck::with_fetcher(fetcher.clone());
    op.open().await.unwrap();

    assert!(op.prepare(&DomainRecord::new(1, "plain.example")).is_none());

    let mut record = DomainRecord::new(2, "www.example.com");
    record.cert = Some(dv());
    let input = op.prepare(&record).expect("certificate present");
    let results = op.execute(input).await.unwrap();
    assert!(matches!(
        results.as_slice(),
        [StageResult::Ocsp(info)] if info.status == OcspStatus::Good
    ));

    op.close().await;
}
