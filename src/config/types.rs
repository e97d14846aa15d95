//! Configuration types and CLI options.
//!
//! This module defines the enums and structs used for command-line argument
//! parsing, and the `ProbeSettings` consumed by the probing pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS, LENIENT_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Serialization format for the output file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable record blocks (`.txt`)
    Plain,
    /// Comma-separated values with flattened columns (`.csv`)
    Csv,
    /// JSON array of flattened records (`.json`)
    Json,
}

impl OutputFormat {
    /// Deduces the output format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            "txt" => Some(OutputFormat::Plain),
            _ => None,
        }
    }
}

/// How the positional inputs are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputType {
    /// Each input is a file containing a list of domains
    File,
    /// Each input is a domain to probe
    Domain,
}

/// Amount of detail for summaries and per-record result printing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Detail {
    /// Print nothing
    None,
    /// Print the most relevant fields
    Short,
    /// Print everything
    Detailed,
}

/// Slice of the input list to probe, 0-based and end-exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputRange {
    /// First entry to keep
    pub start: usize,
    /// One past the last entry to keep (`None` keeps everything after `start`)
    pub end: Option<usize>,
}

/// Parses a `--range` value.
///
/// `N` keeps the first N entries; `A-B` keeps entries A through B (1-based,
/// inclusive). Underscores are ignored so `1_000` reads as `1000`.
pub fn parse_range(raw: &str) -> Result<InputRange, String> {
    let cleaned = raw.replace('_', "");
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid range: {raw}"))
    };

    match cleaned.split_once('-') {
        Some((start, end)) => {
            let start = parse(start)?;
            let end = parse(end)?;
            if start == 0 || end < start {
                return Err(format!("Invalid range: {raw}"));
            }
            Ok(InputRange {
                start: start - 1,
                end: Some(end),
            })
        }
        None => Ok(InputRange {
            start: 0,
            end: Some(parse(&cleaned)?),
        }),
    }
}

fn parse_max_attempts(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("expected a positive number of attempts, got {raw}")),
        Ok(n) => Ok(n),
    }
}

/// Settings consumed by the probing pipeline.
///
/// This is the configuration surface of the core: the fetch retry policy, the
/// request shape, and whether the OCSP stage is part of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Maximum number of fetch attempts per domain (at least 1)
    pub max_attempts: usize,
    /// Timeout for every attempt until a timeout has been observed
    pub default_timeout: Duration,
    /// Timeout used after the first timeout on a domain
    pub lenient_timeout: Duration,
    /// Follow redirects (up to `MAX_REDIRECT_HOPS`)
    pub allow_redirects: bool,
    /// Present a realistic browser header set
    pub fake_browser_headers: bool,
    /// Add the OCSP stage to the pipeline
    pub enable_ocsp: bool,
    /// Verify certificate chains during the handshake instead of only capturing them
    pub strict_tls: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            lenient_timeout: Duration::from_secs(LENIENT_TIMEOUT_SECS),
            allow_redirects: true,
            fake_browser_headers: true,
            enable_ocsp: false,
            strict_tls: false,
        }
    }
}

/// Command-line options and configuration.
///
/// # Examples
///
/// ```bash
/// # Probe a couple of domains and print the results
/// statcert example.com example.org
///
/// # Probe a list, check OCSP, and save a CSV report
/// statcert domains.txt --ocsp -o report.csv
///
/// # Probe entries 100 to 200 of a list, four at a time
/// statcert domains.csv --range 100-200 --concurrency 4
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "statcert",
    version,
    about = "Fetches the TLS certificates served by a list of domains and summarizes them."
)]
pub struct Config {
    /// Domains to probe, or files containing lists of domains
    #[arg(value_name = "FILE | DOMAIN", required = true)]
    pub inputs: Vec<String>,

    /// Interpret inputs explicitly instead of guessing
    #[arg(short = 't', long = "type", value_enum)]
    pub input_type: Option<InputType>,

    /// Probe only the first N entries, or entries START-END (1-based, inclusive)
    #[arg(short = 'n', long, value_parser = parse_range, value_name = "NUM | RANGE")]
    pub range: Option<InputRange>,

    /// Shuffle domains before probing
    #[arg(long)]
    pub random: bool,

    /// Also check OCSP revocation status
    #[arg(long)]
    pub ocsp: bool,

    /// Save results to this file (format inferred from the extension)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format: plain|csv|json (overrides the file extension)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of domains probed at the same time (1 probes sequentially)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Maximum fetch attempts per domain; the last attempt falls back to plain HTTP
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = parse_max_attempts)]
    pub max_attempts: usize,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Timeout in seconds used after an attempt timed out
    #[arg(long, default_value_t = LENIENT_TIMEOUT_SECS)]
    pub lenient_timeout_seconds: u64,

    /// Don't follow redirects
    #[arg(long)]
    pub no_redirects: bool,

    /// Don't present browser-like request headers
    #[arg(long)]
    pub no_browser_headers: bool,

    /// Verify certificate chains during the handshake
    #[arg(long)]
    pub strict_tls: bool,

    /// Summary detail: none|short|detailed (default depends on the inputs)
    #[arg(short = 's', long, value_enum)]
    pub summary: Option<Detail>,

    /// Per-domain result detail: none|short|detailed (default depends on the inputs)
    #[arg(short = 'r', long, value_enum)]
    pub results: Option<Detail>,

    /// Don't print summaries or results
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// Builds the settings consumed by the probing pipeline.
    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            max_attempts: self.max_attempts.max(1),
            default_timeout: Duration::from_secs(self.timeout_seconds),
            lenient_timeout: Duration::from_secs(self.lenient_timeout_seconds),
            allow_redirects: !self.no_redirects,
            fake_browser_headers: !self.no_browser_headers,
            enable_ocsp: self.ocsp,
            strict_tls: self.strict_tls,
        }
    }

    /// Resolves the summary detail level.
    ///
    /// An explicit `--summary` wins; otherwise a summary is printed unless the
    /// run probes domains given directly on the command line.
    pub fn summary_detail(&self, input_type: InputType) -> Detail {
        if self.quiet {
            return Detail::None;
        }
        self.summary.unwrap_or(match input_type {
            InputType::Domain if self.output.is_none() => Detail::None,
            _ => Detail::Short,
        })
    }

    /// Resolves the per-domain result detail level.
    ///
    /// Without `--results`, domains given on the command line are printed in
    /// detail, lists are printed briefly, and nothing is printed when results go
    /// to an output file.
    pub fn results_detail(&self, input_type: InputType) -> Detail {
        if self.quiet {
            return Detail::None;
        }
        self.results.unwrap_or(match (input_type, &self.output) {
            (_, Some(_)) => Detail::None,
            (InputType::Domain, None) => Detail::Detailed,
            (InputType::File, None) => Detail::Short,
        })
    }

    /// Resolves the output format from `--format` or the output file extension.
    pub fn output_format(&self) -> Result<Option<OutputFormat>, String> {
        match (&self.output, self.format) {
            (None, _) => Ok(None),
            (Some(_), Some(format)) => Ok(Some(format)),
            (Some(path), None) => OutputFormat::from_path(path).map(Some).ok_or_else(|| {
                format!(
                    "Unknown or unspecified file format for output file {}",
                    path.display()
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_parse_range_count() {
        assert_eq!(
            parse_range("10"),
            Ok(InputRange {
                start: 0,
                end: Some(10)
            })
        );
    }

    #[test]
    fn test_parse_range_interval_is_one_based_inclusive() {
        assert_eq!(
            parse_range("5-8"),
            Ok(InputRange {
                start: 4,
                end: Some(8)
            })
        );
    }

    #[test]
    fn test_parse_range_ignores_underscores() {
        assert_eq!(
            parse_range("1_000-2_000"),
            Ok(InputRange {
                start: 999,
                end: Some(2000)
            })
        );
    }

    #[test]
    fn test_parse_range_rejects_garbage() {
        assert!(parse_range("abc").is_err());
        assert!(parse_range("1-2-3").is_err());
        assert!(parse_range("8-5").is_err());
        assert!(parse_range("0-5").is_err());
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out.JSON")),
            Some(OutputFormat::Json)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("out.csv")),
            Some(OutputFormat::Csv)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("out.txt")),
            Some(OutputFormat::Plain)
        );
        assert_eq!(OutputFormat::from_path(Path::new("out.xml")), None);
    }

    #[test]
    fn test_probe_settings_defaults() {
        let settings = ProbeSettings::default();
        assert_eq!(settings.max_attempts, 6);
        assert_eq!(settings.default_timeout, Duration::from_secs(2));
        assert_eq!(settings.lenient_timeout, Duration::from_secs(60));
        assert!(settings.allow_redirects);
        assert!(settings.fake_browser_headers);
        assert!(!settings.enable_ocsp);
    }

    #[test]
    fn test_cli_defaults_match_probe_settings_defaults() {
        let config = Config::parse_from(["statcert", "example.com"]);
        assert_eq!(config.probe_settings(), ProbeSettings::default());
    }

    #[test]
    fn test_cli_flags_flow_into_probe_settings() {
        let config = Config::parse_from([
            "statcert",
            "example.com",
            "--ocsp",
            "--no-redirects",
            "--no-browser-headers",
            "--max-attempts",
            "3",
            "--timeout-seconds",
            "5",
        ]);
        let settings = config.probe_settings();
        assert!(settings.enable_ocsp);
        assert!(!settings.allow_redirects);
        assert!(!settings.fake_browser_headers);
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.default_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_cli_rejects_zero_attempts() {
        assert!(Config::try_parse_from(["statcert", "example.com", "--max-attempts", "0"]).is_err());
    }

    #[test]
    fn test_detail_defaults() {
        let config = Config::parse_from(["statcert", "example.com"]);
        assert_eq!(config.results_detail(InputType::Domain), Detail::Detailed);
        assert_eq!(config.summary_detail(InputType::Domain), Detail::None);
        assert_eq!(config.results_detail(InputType::File), Detail::Short);
        assert_eq!(config.summary_detail(InputType::File), Detail::Short);

        let config = Config::parse_from(["statcert", "list.txt", "-o", "out.json"]);
        assert_eq!(config.results_detail(InputType::File), Detail::None);
        assert_eq!(config.output_format(), Ok(Some(OutputFormat::Json)));

        let config = Config::parse_from(["statcert", "list.txt", "-q"]);
        assert_eq!(config.results_detail(InputType::File), Detail::None);
        assert_eq!(config.summary_detail(InputType::File), Detail::None);
    }
}
