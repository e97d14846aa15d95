//! statcert library: certificate probing pipeline
//!
//! This library probes domains over HTTPS, captures the certificate each server
//! presents, falls back to plain HTTP for servers without HTTPS support and can
//! check the captured certificate's revocation status over OCSP.
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use statcert::{run_probe, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::parse_from(["statcert", "example.com", "--ocsp"]);
//! let report = run_probe(config).await?;
//! for record in &report.records {
//!     println!("{}: {:?}", record.domain, record.probe.as_ref().map(|p| p.status));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The building blocks are public too: [`operation::CertFetch`] and
//! [`operation::OcspCheck`] implement [`operation::Operation`], and
//! [`pipeline::run_operations`] drives any list of operations over a set of
//! [`models::DomainRecord`]s.
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod certificate;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod models;
pub mod operation;
pub mod pipeline;

// Re-export public API
pub use certificate::{CertificateView, PolicyType};
pub use config::{Config, InputType, LogFormat, LogLevel, ProbeSettings};
pub use models::{DomainRecord, OcspStatus, ProbeStatus};
pub use run::{run_probe, ProbeReport};

// Internal run module (wires the application layer around the pipeline)
mod run {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::{anyhow, Context, Result};
    use log::info;
    use tokio_util::sync::CancellationToken;

    use crate::app::{
        cancel_on_interrupt, create_summary, deduce_input_type, format_record, load_records,
        shutdown_gracefully, spawn_progress_logger, write_output, Summary,
    };
    use crate::config::{Config, Detail, InputType, ProbeSettings, LOGGING_INTERVAL};
    use crate::models::DomainRecord;
    use crate::operation::{CertFetch, OcspCheck, Operation};
    use crate::pipeline::{
        run_operations, BoundedConcurrency, ExecutionStrategy, ProgressCallback, ProgressEvent,
        Sequential,
    };

    /// Results of a probing run.
    #[derive(Debug, Clone)]
    pub struct ProbeReport {
        /// Finished records, ordered by index
        pub records: Vec<DomainRecord>,
        /// Counts over `records`
        pub summary: Summary,
        /// How the inputs were read
        pub input_type: InputType,
        /// Whether the run was cut short by Ctrl-C
        pub interrupted: bool,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// The fetch stage, followed by the OCSP stage when the settings enable it.
    fn build_operations(settings: ProbeSettings) -> Vec<Box<dyn Operation>> {
        let enable_ocsp = settings.enable_ocsp;
        let mut operations: Vec<Box<dyn Operation>> = vec![Box::new(CertFetch::new(settings))];
        if enable_ocsp {
            operations.push(Box::new(OcspCheck::new()));
        }
        operations
    }

    /// Runs a probe with the provided configuration.
    ///
    /// Loads the inputs, runs the fetch operation (and the OCSP operation when
    /// enabled) over every record, prints finished records at the configured detail
    /// level and writes the output file if one was requested. Ctrl-C stops the run
    /// early; the records finished so far are still summarized and written.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The inputs cannot be read or have an unrecognized structure
    /// - The output format cannot be determined
    /// - An operation fails to open or fails fatally on a record
    /// - The output file cannot be written
    pub async fn run_probe(config: Config) -> Result<ProbeReport> {
        let start_time = Instant::now();

        let output_format = config.output_format().map_err(|e| anyhow!(e))?;
        let input_type = config
            .input_type
            .unwrap_or_else(|| deduce_input_type(&config.inputs));
        let records = load_records(&config.inputs, input_type, config.range, config.random)
            .context("Failed to load input domains")?;
        let total = records.len();

        let mut operations = build_operations(config.probe_settings());

        let strategy: Box<dyn ExecutionStrategy> = if config.concurrency > 1 {
            Box::new(BoundedConcurrency::new(config.concurrency))
        } else {
            Box::new(Sequential)
        };

        let completed = Arc::new(AtomicUsize::new(0));
        let results_detail = config.results_detail(input_type);
        let callback: ProgressCallback = {
            let completed = Arc::clone(&completed);
            Arc::new(move |event: &ProgressEvent<'_>| {
                if !event.finished {
                    return;
                }
                completed.fetch_add(1, Ordering::SeqCst);
                if results_detail > Detail::None {
                    println!("{}\n", format_record(event.record, results_detail));
                }
            })
        };

        let cancel = CancellationToken::new();
        let logging_cancel = CancellationToken::new();
        let logging_task = spawn_progress_logger(
            start_time,
            Arc::clone(&completed),
            total,
            Duration::from_secs(LOGGING_INTERVAL),
            logging_cancel.clone(),
        );
        let interrupt_task = cancel_on_interrupt(cancel.clone());

        let outcome = run_operations(
            &mut operations,
            records,
            strategy.as_ref(),
            Some(callback),
            cancel.clone(),
        )
        .await;

        cancel.cancel();
        shutdown_gracefully(logging_cancel, Some(logging_task), Some(interrupt_task)).await;
        let outcome = outcome.context("Probe run failed")?;

        let summary = create_summary(&outcome.records);
        info!(
            "Fetched {} certificates from {} domains",
            summary.https_support, summary.total
        );

        if let (Some(path), Some(format)) = (&config.output, output_format) {
            write_output(&outcome.records, path, format)?;
        }

        Ok(ProbeReport {
            records: outcome.records,
            summary,
            input_type,
            interrupted: outcome.interrupted,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

}
