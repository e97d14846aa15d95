//! Error categorization for probe attempts.
//!
//! Maps transport failures to an [`ErrorClass`] and looks up, for each class, whether
//! the fetch loop may retry and which error kind it records.

use std::error::Error as StdError;

use super::types::{ErrorClass, TransportError};

pub const KIND_INVALID_CERTIFICATE: &str = "invalid certificate";
pub const KIND_INVALID_RESPONSE: &str = "invalid HTTP response";
pub const KIND_CONNECTION: &str = "connection error";
pub const KIND_TIMEOUT: &str = "timeout";
pub const KIND_TOO_MANY_REDIRECTS: &str = "too many redirects";
pub const KIND_NO_CERTIFICATE: &str = "unable to extract certificate from response";
pub const KIND_UNPARSEABLE_CERTIFICATE: &str = "unable to parse certificate";
pub const KIND_NO_HTTPS: &str = "no https support";

/// Known transport failures: class, whether the attempt may be retried, recorded kind.
pub const KNOWN_ERRORS: &[(ErrorClass, bool, &str)] = &[
    (ErrorClass::CertificateValidation, false, KIND_INVALID_CERTIFICATE),
    (ErrorClass::MalformedResponse, true, KIND_INVALID_RESPONSE),
    (ErrorClass::Connection, true, KIND_CONNECTION),
    (ErrorClass::ConnectTimeout, true, KIND_TIMEOUT),
    (ErrorClass::RequestTimeout, true, KIND_TIMEOUT),
    (ErrorClass::TooManyRedirects, false, KIND_TOO_MANY_REDIRECTS),
    (ErrorClass::TlsVerification, false, KIND_INVALID_CERTIFICATE),
];

/// Returns `(retryable, kind)` for a known error class.
pub fn handle_error(class: ErrorClass) -> (bool, &'static str) {
    KNOWN_ERRORS
        .iter()
        .find(|(known, _, _)| *known == class)
        .map(|(_, retry, kind)| (*retry, *kind))
        // Every variant is listed above; this arm is unreachable in practice.
        .unwrap_or((false, KIND_CONNECTION))
}

/// Categorizes a `reqwest::Error` into an [`ErrorClass`].
///
/// Returns `None` for failures the fetch loop does not know how to handle
/// (request builder errors and anything unrecognized).
pub fn classify_reqwest_error(error: &reqwest::Error) -> Option<ErrorClass> {
    if error.is_timeout() {
        return Some(if error.is_connect() {
            ErrorClass::ConnectTimeout
        } else {
            ErrorClass::RequestTimeout
        });
    }
    if error.is_redirect() {
        return Some(ErrorClass::TooManyRedirects);
    }
    if let Some(tls) = find_rustls_error(error) {
        return Some(classify_rustls_error(tls));
    }
    if error.is_connect() {
        return Some(ErrorClass::Connection);
    }
    if error.is_body() || error.is_decode() {
        return Some(ErrorClass::MalformedResponse);
    }
    if error.is_request() {
        // hyper reports garbage responses as request errors without an io cause
        return Some(if find_io_error(error).is_some() {
            ErrorClass::Connection
        } else {
            ErrorClass::MalformedResponse
        });
    }
    None
}

/// Converts a `reqwest::Error` into a [`TransportError`].
pub fn transport_error_from_reqwest(error: reqwest::Error) -> TransportError {
    match classify_reqwest_error(&error) {
        Some(class) => TransportError::known(class, error_chain_message(&error)),
        None => TransportError::Unclassified(error.into()),
    }
}

fn classify_rustls_error(error: &rustls::Error) -> ErrorClass {
    match error {
        rustls::Error::InvalidCertificate(_) => ErrorClass::CertificateValidation,
        rustls::Error::NoCertificatesPresented
        | rustls::Error::InvalidCertRevocationList(_)
        | rustls::Error::UnsupportedNameType => ErrorClass::TlsVerification,
        _ => ErrorClass::Connection,
    }
}

fn find_rustls_error<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a rustls::Error> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(cause) = current {
        if let Some(tls) = cause.downcast_ref::<rustls::Error>() {
            return Some(tls);
        }
        // io::Error::source() skips the wrapped error, so look inside explicitly
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if let Some(tls) = io
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<rustls::Error>())
            {
                return Some(tls);
            }
        }
        current = cause.source();
    }
    None
}

fn find_io_error<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a std::io::Error> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(cause) = current {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return Some(io);
        }
        current = cause.source();
    }
    None
}

/// Joins an error and its sources into a single line.
pub fn error_chain_message(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut current = error.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = cause.source();
    }
    message
}
