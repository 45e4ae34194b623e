//! End-to-end run: listing, batch and CSV export against a fake API

use crate::support::{detail_urls, transport_with_vacancies, FakeTransport, BASE_URL};
use clap::Parser;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use vacancy_scraper::cli::{Cli, CliError};
use vacancy_scraper::output::CSV_COLUMNS;

fn cli_for(dir: &Path, extra: &[&str]) -> Cli {
    let dir = dir.to_str().unwrap();
    let mut args = vec![
        "vacancy-scraper",
        "-p",
        "1",
        "-t",
        "Engineer",
        "--delay",
        "0",
        "--base-url",
        BASE_URL,
        "--output-dir",
        dir,
        "--output-format",
        "json",
    ];
    args.extend_from_slice(extra);
    Cli::parse_from(args)
}

/// Rows keyed by the `vacancy` column
fn read_rows(path: &Path) -> (Vec<String>, HashMap<String, HashMap<String, String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();

    let mut rows = HashMap::new();
    for record in reader.records() {
        let record = record.unwrap();
        let row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.insert(row["vacancy"].clone(), row);
    }
    (headers, rows)
}

#[tokio::test]
async fn test_scrape_writes_csv() {
    let dir = TempDir::new().unwrap();
    let urls = detail_urls(2);
    let mut second = crate::support::vacancy_json(2);
    second["salary"] = json!(null);
    second["key_skills"] = json!([]);
    second["has_test"] = json!(true);
    let transport = FakeTransport::new()
        .with_listing_page(&urls, 1)
        .with_detail(&urls[0], crate::support::vacancy_json(1))
        .with_detail(&urls[1], second);

    let summary = cli_for(dir.path(), &[])
        .execute_with(Arc::new(transport), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.fetched, 2);
    assert!(summary.failed_url.is_none());
    assert!(!summary.cancelled);

    let file_name = summary.output_path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("df"));
    assert!(file_name.ends_with(".csv"));
    assert_eq!(file_name.len(), "df2024-03-01.csv".len());
    assert_eq!(summary.output_path.parent().unwrap(), dir.path());

    let (headers, rows) = read_rows(&summary.output_path);
    assert_eq!(headers, CSV_COLUMNS.to_vec());
    assert_eq!(rows.len(), 2);

    let first = &rows["Vacancy 1"];
    assert_eq!(first["url"], "https://hh.ru/applicant/vacancy_response?vacancyId=1");
    assert_eq!(first["created"], "2024-03-01T10:00:00+0300");
    assert_eq!(first["has_test"], "false");
    assert_eq!(first["salary_from"], "100000");
    assert_eq!(first["salary_to"], "150000");
    assert_eq!(first["currency"], "RUR");
    assert_eq!(first["experience"], "1-3 years");
    assert_eq!(first["schedule"], "Remote");
    assert_eq!(first["skills"], "Rust;SQL");
    assert_eq!(first["employer"], "Acme");
    assert_eq!(first["area"], "Moscow");
    assert_eq!(first["description"], "Build services");

    let second = &rows["Vacancy 2"];
    assert_eq!(second["has_test"], "true");
    assert_eq!(second["salary_from"], "");
    assert_eq!(second["salary_to"], "");
    assert_eq!(second["currency"], "");
    assert_eq!(second["skills"], "");
}

#[tokio::test]
async fn test_scrape_with_no_results_writes_header_only() {
    let dir = TempDir::new().unwrap();
    let transport = FakeTransport::new().with_listing_page(&[], 0);

    let summary = cli_for(dir.path(), &["-o", "empty_"])
        .execute_with(Arc::new(transport), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.fetched, 0);
    let (headers, rows) = read_rows(&summary.output_path);
    assert_eq!(headers.len(), CSV_COLUMNS.len());
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_scrape_keeps_partial_results_on_failure() {
    let dir = TempDir::new().unwrap();
    let urls = detail_urls(3);
    let transport = transport_with_vacancies(3).with_failure(
        &urls[2],
        vacancy_scraper::fetcher::FetcherError::HttpStatus {
            status: 404,
            url: urls[2].clone(),
        },
    );

    let summary = cli_for(dir.path(), &[])
        .execute_with(Arc::new(transport), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.failed_url.as_deref(), Some(urls[2].as_str()));
    assert!(summary.error.is_some());
    let (_, rows) = read_rows(&summary.output_path);
    assert_eq!(rows.len(), summary.fetched);
    assert!(!rows.contains_key("Vacancy 3"));
}

#[tokio::test]
async fn test_scrape_abort_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let urls = detail_urls(2);
    let transport = transport_with_vacancies(2).with_failure(
        &urls[0],
        vacancy_scraper::fetcher::FetcherError::Transport("refused".to_string()),
    );

    let err = cli_for(dir.path(), &["--on-error", "abort"])
        .execute_with(Arc::new(transport), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::PipelineError(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_scrape_listing_failure_writes_nothing() {
    let dir = TempDir::new().unwrap();

    let err = cli_for(dir.path(), &[])
        .execute_with(Arc::new(FakeTransport::new()), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::PipelineError(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
