//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - The rustls crypto provider
//! - HTTP clients for the fetch and OCSP operations
//! - The logger

mod client;
mod logger;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use client::{init_ocsp_client, init_probe_client};
pub use logger::init_logger_with;

/// Installs the `ring` crypto provider as the process default for `rustls`.
///
/// Must run before the first TLS connection. Installing twice is harmless.
pub fn init_crypto_provider() {
    let _ = CryptoProvider::install_default(default_provider());
}
