//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `statcert` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing summary output
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use statcert::app::format_summary;
use statcert::initialization::{init_crypto_provider, init_logger_with};
use statcert::{run_probe, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    let summary_config = config.clone();
    match run_probe(config).await {
        Ok(report) => {
            let detail = summary_config.summary_detail(report.input_type);
            for line in format_summary(&report.summary, detail) {
                println!("{line}");
            }
            if report.interrupted {
                println!(
                    "⚠️ Interrupted after {} domain{} ({:.1}s)",
                    report.records.len(),
                    if report.records.len() == 1 { "" } else { "s" },
                    report.elapsed_seconds
                );
            }
            if let Some(path) = &summary_config.output {
                println!("Results saved in {}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("statcert error: {:#}", e);
            process::exit(1);
        }
    }
}
