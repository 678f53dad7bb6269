//! sub_curator library: proxy subscription collection
//!
//! This library runs collection cycles over a ledger of subscription sources:
//! it tracks per-source health across cycles, probes live sources with
//! bounded concurrency, parses every common subscription format into
//! canonical nodes, deduplicates them by fingerprint, and packages a capped
//! sample for downstream testing.
//!
//! # Example
//!
//! ```no_run
//! use sub_curator::{run_cycle, Config};
//! use tokio;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     ledger_path: std::path::PathBuf::from("link_database.csv"),
//!     node_quota: 10_000,
//!     output_cap: 5_000,
//!     ..Default::default()
//! };
//!
//! let report = run_cycle(config).await?;
//! println!("Probed {} sources: {} succeeded, {} failed, {} nodes emitted",
//!          report.dispatched, report.succeeded, report.failed, report.emitted_nodes);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
mod collect;
pub mod config;
mod error_handling;
mod fetch;
mod health;
pub mod initialization;
mod node;
mod parse;
mod run;
mod storage;

// Re-export public API
pub use collect::{make_rng, select_output, InsertOutcome, UniqueNodes};
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use error_handling::{FetchError, InitializationError, StorageError};
pub use health::{
    load_quality_report, source_id_for, FetchMode, HealthRegistry, SourceRecord, SourceStatus,
};
pub use node::{fingerprint, Network, Protocol, ProtocolConfig, ProxyNode, Transport};
pub use parse::{decode_link, parse_content};
pub use run::{run_cycle, CycleReport};
pub use storage::{load_ledger, save_ledger};
