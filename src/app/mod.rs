//! Cycle support: progress logging, shutdown handling and statistics
//! printing.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::{log_progress, CycleProgress};
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_cycle_summary, print_error_statistics};
