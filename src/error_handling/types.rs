//! Error type definitions.
//!
//! This module defines the error types used throughout the application, plus the
//! classification of transport failures that the fetch loop records per attempt.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing an HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for reading the domain list.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse input file: {0}")]
    Csv(#[from] csv::Error),

    /// The file has neither one column, two index/domain columns nor a `domain` header.
    #[error("Unrecognized input structure in {0}")]
    UnrecognizedStructure(String),

    #[error("Invalid index {value:?} on line {line}")]
    InvalidIndex { line: usize, value: String },
}

/// Error types for decoding certificate bytes into a view.
#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("invalid PEM certificate: {0}")]
    Pem(String),

    #[error("invalid DER certificate: {0}")]
    Der(String),

    #[error("PEM block is a {0}, not a certificate")]
    UnexpectedPemLabel(String),
}

/// Classes of transport failure that the fetch loop knows how to handle.
///
/// Anything outside these classes is unclassified and aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorClass {
    // Server presented a certificate that failed validation
    CertificateValidation,
    // Server answered with something that is not HTTP
    MalformedResponse,
    // Refused, reset, unreachable, name resolution failures
    Connection,
    ConnectTimeout,
    RequestTimeout,
    TooManyRedirects,
    // Handshake aborted during certificate verification
    TlsVerification,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorClass {
    /// Identifier recorded as the `class` of a probe error.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::CertificateValidation => "CertificateValidation",
            ErrorClass::MalformedResponse => "MalformedResponse",
            ErrorClass::Connection => "Connection",
            ErrorClass::ConnectTimeout => "ConnectTimeout",
            ErrorClass::RequestTimeout => "RequestTimeout",
            ErrorClass::TooManyRedirects => "TooManyRedirects",
            ErrorClass::TlsVerification => "TlsVerification",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ErrorClass::ConnectTimeout | ErrorClass::RequestTimeout)
    }
}

/// Failure of a single transport request.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{message}")]
    Known { class: ErrorClass, message: String },

    #[error("Unclassified transport error: {0:#}")]
    Unclassified(#[source] anyhow::Error),
}

impl TransportError {
    pub fn known(class: ErrorClass, message: impl Into<String>) -> Self {
        TransportError::Known {
            class,
            message: message.into(),
        }
    }
}

/// Failure of one operation on one record.
#[derive(Error, Debug)]
pub enum OperationError {
    /// The record is abandoned for the remaining operations; other records continue.
    #[error("{0:#}")]
    Record(anyhow::Error),

    /// The whole run is aborted.
    #[error("{0:#}")]
    Fatal(anyhow::Error),
}

/// Error surfaced by the pipeline runner.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to open operation {operation}: {source:#}")]
    Open {
        operation: &'static str,
        source: anyhow::Error,
    },

    #[error("Operation {operation} failed on record #{index} ({domain}): {source:#}")]
    Operation {
        operation: &'static str,
        index: usize,
        domain: String,
        source: anyhow::Error,
    },
}
