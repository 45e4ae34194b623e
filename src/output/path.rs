//! Output file naming
//!
//! Exports are named `{prefix}{YYYY-MM-DD}.csv` using the local date of the
//! run, e.g. `df2024-03-01.csv`.

use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// File name for an export made on `date`
pub fn output_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}{}.csv", date.format("%Y-%m-%d"))
}

/// Full path of an export in `dir` made on `date`
pub fn output_path(dir: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    dir.join(output_file_name(prefix, date))
}

/// Today's local date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
