//! Error handling.
//!
//! This module provides:
//! - Error type definitions for initialization, input, certificates and the pipeline
//! - Classification of transport failures into known error classes
//! - The retry table consulted by the fetch loop

mod categorization;
mod types;

// Re-export public API
pub use categorization::{
    classify_reqwest_error, error_chain_message, handle_error, transport_error_from_reqwest,
    KIND_CONNECTION, KIND_INVALID_CERTIFICATE, KIND_INVALID_RESPONSE, KIND_NO_CERTIFICATE,
    KIND_NO_HTTPS, KIND_TIMEOUT, KIND_TOO_MANY_REDIRECTS, KIND_UNPARSEABLE_CERTIFICATE,
    KNOWN_ERRORS,
};
pub use types::{
    CertificateError, ErrorClass, InitializationError, InputError, OperationError,
    PipelineError, TransportError,
};
