//! Configuration constants.
//!
//! This module defines the defaults used by the probing pipeline and the
//! application layer around it.

use std::time::Duration;

// Probe retry policy
/// Maximum number of fetch attempts per domain (the last one is made over plain HTTP)
pub const DEFAULT_MAX_ATTEMPTS: usize = 6;
/// Timeout applied to every attempt until a timeout has been observed
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;
/// Timeout applied once a previous attempt on the same domain timed out
pub const LENIENT_TIMEOUT_SECS: u64 = 60;

// Redirect handling
/// Maximum number of redirect hops to follow when redirects are allowed
pub const MAX_REDIRECT_HOPS: usize = 10;

// OCSP
/// Timeout for issuer certificate downloads and OCSP responder requests
pub const OCSP_TIMEOUT: Duration = Duration::from_secs(10);

// Scheduling
/// Number of domains probed at the same time by the concurrent strategy
pub const DEFAULT_CONCURRENCY: usize = 1;
/// Progress logging interval in seconds
pub const LOGGING_INTERVAL: u64 = 5;
