//! CSV output writer for vacancies

use crate::fetcher::parser::format_timestamp;
use crate::VacancyRecord;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

use super::{OutputError, OutputResult, OutputWriter, VacancyWriter};

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024; // descriptions are long

/// Header row of the export, in column order
pub const CSV_COLUMNS: [&str; 13] = [
    "vacancy",
    "url",
    "created",
    "has_test",
    "salary_from",
    "salary_to",
    "currency",
    "experience",
    "schedule",
    "skills",
    "employer",
    "area",
    "description",
];

/// One CSV row; field order must match [`CSV_COLUMNS`]
#[derive(Debug, Serialize)]
struct VacancyRow<'a> {
    vacancy: &'a str,
    url: &'a str,
    created: String,
    has_test: bool,
    salary_from: Option<String>,
    salary_to: Option<String>,
    currency: Option<&'a str>,
    experience: &'a str,
    schedule: &'a str,
    skills: String,
    employer: &'a str,
    area: &'a str,
    description: &'a str,
}

impl<'a> From<&'a VacancyRecord> for VacancyRow<'a> {
    fn from(record: &'a VacancyRecord) -> Self {
        Self {
            vacancy: &record.title,
            url: &record.canonical_url,
            created: format_timestamp(&record.published_at),
            has_test: record.has_test,
            salary_from: record.salary_from.map(|d| d.to_string()),
            salary_to: record.salary_to.map(|d| d.to_string()),
            currency: record.currency.as_deref(),
            experience: &record.experience_level,
            schedule: &record.schedule_type,
            skills: record.skills_joined(),
            employer: &record.employer_name,
            area: &record.area_name,
            description: &record.description,
        }
    }
}

/// CSV writer for vacancies
pub struct CsvVacancyWriter {
    writer: Writer<BufWriter<File>>,
    rows_written: u64,
}

impl CsvVacancyWriter {
    /// Create the file at `path` and write the header row
    pub fn new<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        Self::new_with_buffer_size(path, DEFAULT_BUFFER_SIZE)
    }

    /// Create a new CSV vacancy writer with custom buffer size
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `buffer_size` - Size of write buffer in bytes
    pub fn new_with_buffer_size<P: AsRef<Path>>(
        path: P,
        buffer_size: usize,
    ) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating CSV writer: path={}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("Failed to create directory: {}", e)))?;
        }

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {}", e)))?;

        let buf_writer = BufWriter::with_capacity(buffer_size, file);

        // Header is written by hand so that an empty export still has one
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(buf_writer);
        writer
            .write_record(CSV_COLUMNS)
            .map_err(|e| OutputError::CsvError(format!("Failed to write header: {}", e)))?;

        debug!("CSV writer created with {} columns", CSV_COLUMNS.len());

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Get number of rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl VacancyWriter for CsvVacancyWriter {
    fn write_vacancy(&mut self, record: &VacancyRecord) -> OutputResult<()> {
        self.writer
            .serialize(VacancyRow::from(record))
            .map_err(|e| OutputError::CsvError(format!("Failed to write vacancy: {}", e)))?;

        self.rows_written += 1;
        Ok(())
    }
}

impl OutputWriter for CsvVacancyWriter {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {}", e)))
    }

    fn close(mut self) -> OutputResult<()> {
        self.flush()?;

        let buf_writer = self.writer.into_inner().map_err(|e| {
            OutputError::IoError(format!("Failed to get inner writer: {}", e))
        })?;

        let file = buf_writer.into_inner().map_err(|e| {
            OutputError::IoError(format!("Failed to get file handle: {}", e))
        })?;

        file.sync_all()
            .map_err(|e| OutputError::IoError(format!("Failed to sync file: {}", e)))?;

        info!("CSV writer closed successfully: {} rows written", self.rows_written);
        Ok(())
    }
}
