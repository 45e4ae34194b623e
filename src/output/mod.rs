//! Data output writers

use crate::VacancyRecord;

pub mod csv;
pub mod path;

pub use self::csv::{CsvVacancyWriter, CSV_COLUMNS};
pub use path::{output_file_name, output_path};

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Generic output writer trait
pub trait OutputWriter {
    /// Flush any buffered data to disk
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output
    fn close(self) -> OutputResult<()>;
}

/// Trait for writing vacancy rows
pub trait VacancyWriter: OutputWriter {
    /// Write a single vacancy to output
    fn write_vacancy(&mut self, record: &VacancyRecord) -> OutputResult<()>;

    /// Write multiple vacancies at once
    fn write_vacancies(&mut self, records: &[VacancyRecord]) -> OutputResult<()> {
        for record in records {
            self.write_vacancy(record)?;
        }
        Ok(())
    }
}
