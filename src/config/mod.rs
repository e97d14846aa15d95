//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (attempt limits, timeouts, intervals)
//! - The browser header set presented on probe requests
//! - CLI option types and the probe settings consumed by the pipeline

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{
    parse_range, Config, Detail, InputRange, InputType, LogFormat, LogLevel, OutputFormat,
    ProbeSettings,
};
