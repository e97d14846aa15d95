// Shared test helpers: scripted transports, fixture loading and stub fetchers.
//
// This module provides common utilities used across multiple test files to reduce duplication.

#![allow(dead_code)] // Each test file uses a different subset

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use statcert::config::ProbeSettings;
use statcert::error_handling::{ErrorClass, TransportError};
use statcert::operation::{HttpFetcher, ProbeRequest, ProbeResponse, Transport};

/// Reads a file from `tests/fixtures`.
pub fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("missing fixture {}: {e}", path.display()))
}

/// Settings with the stock attempt policy.
pub fn settings() -> ProbeSettings {
    ProbeSettings::default()
}

/// One scripted transport outcome.
#[derive(Clone, Debug)]
pub enum Step {
    /// HTTPS response carrying the given certificate bytes.
    Cert(Vec<u8>),
    /// Response without a peer certificate.
    NoCert,
    /// Known transport failure.
    Fail(ErrorClass),
    /// Failure the classifier does not recognize.
    Unclassified,
}

impl Step {
    fn respond(&self, request: &ProbeRequest) -> Result<ProbeResponse, TransportError> {
        match self {
            Step::Cert(der) => Ok(ProbeResponse {
                final_url: format!("{}/", request.url),
                redirected: false,
                peer_certificate: Some(der.clone()),
            }),
            Step::NoCert => Ok(ProbeResponse {
                final_url: format!("{}/", request.url),
                redirected: false,
                peer_certificate: None,
            }),
            Step::Fail(class) => Err(TransportError::known(
                *class,
                format!("scripted {class} on {}", request.url),
            )),
            Step::Unclassified => Err(TransportError::Unclassified(anyhow!(
                "scripted unclassified failure"
            ))),
        }
    }
}

/// Transport that replays a script and records every request.
///
/// Once the script runs out, the fallback step repeats.
pub struct StubTransport {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    requests: Mutex<Vec<ProbeRequest>>,
}

impl StubTransport {
    pub fn new(script: Vec<Step>, fallback: Step) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `step`.
    pub fn always(step: Step) -> Self {
        Self::new(Vec::new(), step)
    }

    pub fn requests(&self) -> Vec<ProbeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.requests().iter().map(|r| r.timeout).collect()
    }

    pub fn schemes(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url.split("://").next().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, request: &ProbeRequest) -> Result<ProbeResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        step.respond(request)
    }
}

/// Transport keyed by domain: `https` answers come from `certs`, everything else
/// answers over plain HTTP.
pub struct DomainTransport {
    certs: HashMap<String, Vec<u8>>,
}

impl DomainTransport {
    pub fn new(certs: &[(&str, Vec<u8>)]) -> Self {
        Self {
            certs: certs
                .iter()
                .map(|(domain, der)| (domain.to_string(), der.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl Transport for DomainTransport {
    async fn get(&self, request: &ProbeRequest) -> Result<ProbeResponse, TransportError> {
        let (scheme, domain) = request.url.split_once("://").unwrap_or(("", &request.url));
        match (scheme, self.certs.get(domain)) {
            ("https", Some(der)) => Step::Cert(der.clone()).respond(request),
            ("https", None) => Step::Fail(ErrorClass::Connection).respond(request),
            _ => Step::NoCert.respond(request),
        }
    }
}

/// Fetcher serving fixed bodies by URL and recording what was requested.
///
/// OCSP responses are served from a queue so consecutive hash attempts can get
/// different answers.
pub struct StubFetcher {
    bodies: HashMap<String, Vec<u8>>,
    ocsp_responder: String,
    ocsp_answers: Mutex<VecDeque<Vec<u8>>>,
    urls: Mutex<Vec<String>>,
}

pub const OCSP_RESPONDER: &str = "http://ocsp.statcert.test";
pub const ISSUER_URL: &str = "http://certs.statcert.test/ca.der";

impl StubFetcher {
    /// Serves the fixture CA at the fixture issuer URL and `answers` from the
    /// fixture OCSP responder, in order.
    pub fn with_answers(answers: Vec<Vec<u8>>) -> Self {
        let mut bodies = HashMap::new();
        bodies.insert(ISSUER_URL.to_string(), fixture("ca.der"));
        Self {
            bodies,
            ocsp_responder: OCSP_RESPONDER.to_string(),
            ocsp_answers: Mutex::new(answers.into()),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the body served at `url`.
    pub fn serve(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn ocsp_urls(&self) -> Vec<String> {
        self.urls()
            .into_iter()
            .filter(|url| url.starts_with(&self.ocsp_responder))
            .collect()
    }
}

#[async_trait]
impl HttpFetcher for StubFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.urls.lock().unwrap().push(url.to_string());
        if let Some(body) = self.bodies.get(url) {
            return Ok(body.clone());
        }
        if url.starts_with(&self.ocsp_responder) {
            return self
                .ocsp_answers
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow!("no OCSP answer scripted for {url}"));
        }
        Err(anyhow!("connection refused: {url}"))
    }
}
