//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Transfer progress line
//! - Statistics reporting

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{print_banner, print_config_summary, print_error, print_info, print_warning};
pub use progress::TransferProgress;
pub use stats::{print_channel_stats, print_run_stats};
