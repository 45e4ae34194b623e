//! Unit tests for vacancy response parsing

use crate::support::{listing_json, vacancy_json};
use rust_decimal::Decimal;
use serde_json::json;
use vacancy_scraper::fetcher::parser::format_timestamp;
use vacancy_scraper::fetcher::{FetcherError, VacancyParser};

#[test]
fn test_parse_full_vacancy() {
    let record = VacancyParser::parse_vacancy(&vacancy_json(7)).unwrap();

    assert_eq!(record.title, "Vacancy 7");
    assert_eq!(
        record.canonical_url,
        "https://hh.ru/applicant/vacancy_response?vacancyId=7"
    );
    assert_eq!(format_timestamp(&record.published_at), "2024-03-01T10:00:00+0300");
    assert!(!record.has_test);
    assert_eq!(record.salary_from, Some(Decimal::from(100000)));
    assert_eq!(record.salary_to, Some(Decimal::from(150000)));
    assert_eq!(record.currency.as_deref(), Some("RUR"));
    assert_eq!(record.experience_level, "1-3 years");
    assert_eq!(record.schedule_type, "Remote");
    assert_eq!(record.skills_joined(), "Rust;SQL");
    assert_eq!(record.employer_name, "Acme");
    assert_eq!(record.area_name, "Moscow");
    assert_eq!(record.description, "Build services");
}

#[test]
fn test_missing_name_is_parse_error() {
    let mut body = vacancy_json(1);
    body.as_object_mut().unwrap().remove("name");

    let err = VacancyParser::parse_vacancy(&body).unwrap_err();
    assert!(matches!(err, FetcherError::Parse(ref msg) if msg.contains("name")));
}

#[test]
fn test_missing_nested_name_is_parse_error() {
    let mut body = vacancy_json(1);
    body["employer"] = json!({"id": "42"});

    let err = VacancyParser::parse_vacancy(&body).unwrap_err();
    assert!(matches!(err, FetcherError::Parse(ref msg) if msg.contains("employer")));
}

#[test]
fn test_absent_and_null_salary_are_equivalent() {
    let mut absent = vacancy_json(1);
    absent.as_object_mut().unwrap().remove("salary");
    let mut null = vacancy_json(1);
    null["salary"] = json!(null);

    let absent = VacancyParser::parse_vacancy(&absent).unwrap();
    let null = VacancyParser::parse_vacancy(&null).unwrap();

    for record in [&absent, &null] {
        assert_eq!(record.salary_from, None);
        assert_eq!(record.salary_to, None);
        assert_eq!(record.currency, None);
        assert!(!record.has_salary());
    }
    assert_eq!(absent, null);
}

#[test]
fn test_open_ended_salary() {
    let mut body = vacancy_json(1);
    body["salary"] = json!({"from": null, "to": 2500.5, "currency": "USD"});

    let record = VacancyParser::parse_vacancy(&body).unwrap();
    assert_eq!(record.salary_from, None);
    assert_eq!(record.salary_to, Some(Decimal::new(25005, 1)));
    assert_eq!(record.currency.as_deref(), Some("USD"));
    assert!(record.has_salary());
}

#[test]
fn test_absent_skills_are_empty() {
    let mut body = vacancy_json(1);
    body.as_object_mut().unwrap().remove("key_skills");

    let record = VacancyParser::parse_vacancy(&body).unwrap();
    assert!(record.skills.is_empty());
    assert_eq!(record.skills_joined(), "");
}

#[test]
fn test_duplicate_skills_collapse() {
    let mut body = vacancy_json(1);
    body["key_skills"] = json!([{"name": "Go"}, {"name": "Go"}, {"name": "Docker"}]);

    let record = VacancyParser::parse_vacancy(&body).unwrap();
    assert_eq!(record.skills.len(), 2);
    assert_eq!(record.skills_joined(), "Docker;Go");
}

#[test]
fn test_rfc3339_offset_accepted() {
    let mut body = vacancy_json(1);
    body["published_at"] = json!("2024-03-01T10:00:00+03:00");

    let record = VacancyParser::parse_vacancy(&body).unwrap();
    assert_eq!(format_timestamp(&record.published_at), "2024-03-01T10:00:00+0300");
}

#[test]
fn test_invalid_timestamp_is_parse_error() {
    let mut body = vacancy_json(1);
    body["published_at"] = json!("yesterday");

    assert!(matches!(
        VacancyParser::parse_vacancy(&body),
        Err(FetcherError::Parse(_))
    ));
}

#[test]
fn test_non_object_body_is_parse_error() {
    assert!(matches!(
        VacancyParser::parse_vacancy(&json!([1, 2, 3])),
        Err(FetcherError::Parse(_))
    ));
}

#[test]
fn test_parse_listing_page() {
    let urls = vec![
        "http://api.test/vacancies/1".to_string(),
        "http://api.test/vacancies/2".to_string(),
    ];
    let page = VacancyParser::parse_listing(&listing_json(&urls, 4), 2).unwrap();

    assert_eq!(page.items, urls);
    assert_eq!(page.page_index, 2);
    assert_eq!(page.total_pages, 4);
    assert!(!page.is_last());
}

#[test]
fn test_parse_listing_missing_pages() {
    let body = json!({"items": []});
    assert!(matches!(
        VacancyParser::parse_listing(&body, 0),
        Err(FetcherError::Parse(_))
    ));
}
