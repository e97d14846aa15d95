//! Application layer around the probing pipeline.
//!
//! This module provides input loading, output files, per-record printing, the run
//! summary, progress logging and interrupt handling used by the binary.

pub mod input;
pub mod logging;
pub mod output;
pub mod shutdown;
pub mod summary;

// Re-export public API
pub use input::{deduce_input_type, load_records, parse_domain_list, records_from_domains};
pub use logging::{log_progress, spawn_progress_logger};
pub use output::{flatten_record, format_record, write_output};
pub use shutdown::{cancel_on_interrupt, shutdown_gracefully};
pub use summary::{create_summary, format_summary, Summary};
