//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::*;

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
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Run one collection cycle with the default file layout
/// sub_curator
///
/// # Smaller output, reproducible sampling
/// sub_curator --output-cap 5000 --seed 42
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "sub_curator",
    about = "Collects proxy subscriptions, tracks source health and packages unique nodes."
)]
pub struct Opt {
    /// Source ledger (CSV with at least a `url` column)
    #[arg(long, value_parser, default_value = DEFAULT_LEDGER_PATH)]
    pub ledger: PathBuf,

    /// Quality report listing bad source ids (`failed_id` column)
    #[arg(long, value_parser, default_value = DEFAULT_REPORT_PATH)]
    pub report: PathBuf,

    /// Directory holding the raw content of consumed sources
    #[arg(long, value_parser, default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// Output package (YAML with a `proxies` list)
    #[arg(long, value_parser, default_value = DEFAULT_PACKAGE_PATH)]
    pub output: PathBuf,

    /// Manifest of cache references for contributing sources
    #[arg(long, value_parser, default_value = DEFAULT_MANIFEST_PATH)]
    pub manifest: PathBuf,

    /// List of sources represented in the final package
    #[arg(long, value_parser, default_value = DEFAULT_SOURCE_LIST_PATH)]
    pub source_list: PathBuf,

    /// Prefix for manifest entries (defaults to local cache paths)
    #[arg(long)]
    pub cache_base_url: Option<String>,

    /// Unique nodes to collect before no further sources are dispatched
    #[arg(long, default_value_t = DEFAULT_NODE_QUOTA)]
    pub node_quota: usize,

    /// Maximum number of nodes written to the package
    #[arg(long, default_value_t = DEFAULT_OUTPUT_CAP)]
    pub output_cap: usize,

    /// Consecutive bad cycles before a source is marked dead
    #[arg(long, default_value_t = DEFAULT_DEAD_THRESHOLD)]
    pub dead_threshold: u32,

    /// Maximum concurrent probes
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Retries per request for transient failures
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: usize,

    /// Seed for output down-sampling (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without going through `clap`.
///
/// # Examples
///
/// ```no_run
/// use sub_curator::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     ledger_path: PathBuf::from("sources.csv"),
///     output_cap: 1000,
///     seed: Some(7),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Source ledger path
    pub ledger_path: PathBuf,

    /// Quality report path
    pub report_path: PathBuf,

    /// Raw content cache directory
    pub cache_dir: PathBuf,

    /// Output package path
    pub package_path: PathBuf,

    /// Cache manifest path
    pub manifest_path: PathBuf,

    /// Final source list path
    pub source_list_path: PathBuf,

    /// Optional prefix for manifest entries
    pub cache_base_url: Option<String>,

    /// Collection target (unique nodes)
    pub node_quota: usize,

    /// Hard output cap
    pub output_cap: usize,

    /// Failure streak at which a source becomes dead
    pub dead_threshold: u32,

    /// Maximum concurrent probes
    pub max_concurrency: usize,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Retries per request for transient failures
    pub max_retries: usize,

    /// Down-sampling seed
    pub seed: Option<u64>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            package_path: PathBuf::from(DEFAULT_PACKAGE_PATH),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            source_list_path: PathBuf::from(DEFAULT_SOURCE_LIST_PATH),
            cache_base_url: None,
            node_quota: DEFAULT_NODE_QUOTA,
            output_cap: DEFAULT_OUTPUT_CAP,
            dead_threshold: DEFAULT_DEAD_THRESHOLD,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            seed: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            ledger_path: opt.ledger,
            report_path: opt.report,
            cache_dir: opt.cache_dir,
            package_path: opt.output,
            manifest_path: opt.manifest,
            source_list_path: opt.source_list,
            cache_base_url: opt.cache_base_url,
            node_quota: opt.node_quota,
            output_cap: opt.output_cap,
            dead_threshold: opt.dead_threshold,
            max_concurrency: opt.max_concurrency,
            timeout_seconds: opt.timeout_seconds,
            user_agent: opt.user_agent,
            max_retries: opt.max_retries,
            seed: opt.seed,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}

impl Config {
    /// Checks that the numeric settings can drive a collection cycle.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message naming the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be at least 1".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("timeout_seconds must be at least 1".to_string());
        }
        if self.output_cap == 0 {
            return Err("output_cap must be at least 1".to_string());
        }
        if self.dead_threshold == 0 {
            return Err("dead_threshold must be at least 1".to_string());
        }
        Ok(())
    }

    /// Outer time budget for one probe.
    ///
    /// Covers both response shapes with every retry at the full request
    /// timeout, plus a margin for backoff delays.
    pub fn probe_timeout(&self) -> Duration {
        let attempts = (self.max_retries as u64 + 1) * 2;
        Duration::from_secs(self.timeout_seconds.saturating_mul(attempts)) + PROBE_TIMEOUT_MARGIN
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
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.node_quota, 50_000);
        assert_eq!(config.output_cap, 20_500);
        assert_eq!(config.dead_threshold, 10);
        assert_eq!(config.max_concurrency, 100);
        assert_eq!(config.timeout_seconds, 8);
        assert_eq!(config.user_agent, "clash");
        assert_eq!(config.ledger_path, PathBuf::from("link_database.csv"));
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_probe_timeout_covers_both_shapes_and_retries() {
        let config = Config {
            timeout_seconds: 8,
            max_retries: 1,
            ..Default::default()
        };
        assert_eq!(
            config.probe_timeout(),
            Duration::from_secs(32) + PROBE_TIMEOUT_MARGIN
        );
    }

    #[test]
    fn test_config_validate_rejects_zero_values() {
        let config = Config {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("max_concurrency"));

        let config = Config {
            output_cap: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("output_cap"));

        let config = Config {
            dead_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("dead_threshold"));
    }

    #[test]
    fn test_opt_parses_defaults_and_overrides() {
        let opt = Opt::parse_from(["sub_curator", "--output-cap", "10", "--seed", "3"]);
        let config = Config::from(opt);
        assert_eq!(config.output_cap, 10);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.node_quota, DEFAULT_NODE_QUOTA);
        assert_eq!(config.report_path, PathBuf::from("quality_report.csv"));
    }
}
