//! CLI command implementations

pub mod error;
pub mod scrape;

pub use error::CliError;
pub use scrape::{print_summary, Cli, OutputFormat, RunSummary};
