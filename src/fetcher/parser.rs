//! Vacancy API response parser
//!
//! Stateless functions converting JSON responses of the search and detail
//! endpoints into [`ListingPage`] and [`VacancyRecord`].

use crate::fetcher::{FetcherError, FetcherResult};
use crate::{ListingPage, VacancyRecord};
use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Matches one `<...>` span, shortest first. Not an HTML parser: text such as
/// `1 < 2 > 0` is treated as a tag.
static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<]+?>").expect("hardcoded pattern is valid"));

/// Timestamp layout used by the API (`2024-03-01T10:00:00+0300`)
const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Stateless parser for vacancy API responses
pub struct VacancyParser;

impl VacancyParser {
    /// Parse one page of the search endpoint
    ///
    /// # Format
    /// `{"items": [{"url": "..."}, ...], "pages": 20, ...}`
    ///
    /// # Errors
    /// Returns [`FetcherError::Parse`] if `items`, an item's `url` or `pages` is
    /// missing.
    pub fn parse_listing(body: &Value, page_index: u32) -> FetcherResult<ListingPage> {
        let items = body
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| FetcherError::Parse("Missing or invalid items array".to_string()))?;

        let urls = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.get("url")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| FetcherError::Parse(format!("Missing url in item {i}")))
            })
            .collect::<FetcherResult<Vec<_>>>()?;

        let total_pages = body
            .get("pages")
            .and_then(Value::as_u64)
            .ok_or_else(|| FetcherError::Parse("Missing or invalid pages".to_string()))?;

        Ok(ListingPage {
            items: urls,
            page_index,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        })
    }

    /// Parse a detail endpoint response into a [`VacancyRecord`]
    ///
    /// Optional data (`key_skills`, `salary` and its members) defaults to
    /// empty; every other field is required.
    ///
    /// # Errors
    /// Returns [`FetcherError::Parse`] naming the first missing or malformed
    /// required field.
    pub fn parse_vacancy(body: &Value) -> FetcherResult<VacancyRecord> {
        let obj = body
            .as_object()
            .ok_or_else(|| FetcherError::Parse("Vacancy is not a JSON object".to_string()))?;

        let title = Self::required_str(obj, "name")?.to_string();
        let skills = Self::parse_skills(obj)?;
        let (salary_from, salary_to, currency) = Self::parse_salary(obj)?;
        let experience_level = Self::required_name(obj, "experience")?;
        let schedule_type = Self::required_name(obj, "schedule")?;
        let employer_name = Self::required_name(obj, "employer")?;
        let description = strip_html_tags(Self::required_str(obj, "description")?).into_owned();
        let area_name = Self::required_name(obj, "area")?;
        let canonical_url = Self::required_str(obj, "apply_alternate_url")?.to_string();
        let published_at = parse_timestamp(Self::required_str(obj, "published_at")?)?;
        let has_test = obj
            .get("has_test")
            .and_then(Value::as_bool)
            .ok_or_else(|| FetcherError::Parse("Missing or invalid has_test".to_string()))?;

        Ok(VacancyRecord {
            title,
            canonical_url,
            published_at,
            has_test,
            salary_from,
            salary_to,
            currency,
            experience_level,
            schedule_type,
            skills,
            employer_name,
            area_name,
            description,
        })
    }

    fn required_str<'a>(obj: &'a Map<String, Value>, field: &str) -> FetcherResult<&'a str> {
        obj.get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| FetcherError::Parse(format!("Missing or invalid {field}")))
    }

    /// `obj[field].name`, used by the dictionary-style fields
    fn required_name(obj: &Map<String, Value>, field: &str) -> FetcherResult<String> {
        obj.get(field)
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| FetcherError::Parse(format!("Missing or invalid {field}.name")))
    }

    fn parse_skills(obj: &Map<String, Value>) -> FetcherResult<BTreeSet<String>> {
        let Some(skills) = obj.get("key_skills").and_then(Value::as_array) else {
            return Ok(BTreeSet::new());
        };

        skills
            .iter()
            .map(|skill| {
                skill
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| FetcherError::Parse("Missing key_skills[].name".to_string()))
            })
            .collect()
    }

    fn parse_salary(
        obj: &Map<String, Value>,
    ) -> FetcherResult<(Option<Decimal>, Option<Decimal>, Option<String>)> {
        let Some(salary) = obj.get("salary").filter(|v| !v.is_null()) else {
            return Ok((None, None, None));
        };

        let from = Self::optional_decimal(salary.get("from"), "salary.from")?;
        let to = Self::optional_decimal(salary.get("to"), "salary.to")?;
        let currency = salary
            .get("currency")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok((from, to, currency))
    }

    /// Salary bounds arrive as JSON numbers; null or absent means unknown
    fn optional_decimal(value: Option<&Value>, field: &str) -> FetcherResult<Option<Decimal>> {
        let text = match value {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(FetcherError::Parse(format!(
                    "{field} is not a number: {other}"
                )))
            }
        };

        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map(Some)
            .map_err(|e| FetcherError::Parse(format!("Failed to parse {field}: {e}")))
    }
}

/// Remove every `<...>` span from `html`
///
/// Entities such as `&amp;` are left untouched.
pub fn strip_html_tags(html: &str) -> Cow<'_, str> {
    HTML_TAG.replace_all(html, "")
}

/// Parse an API timestamp, accepting both `+0300` and `+03:00` offsets
pub fn parse_timestamp(value: &str) -> FetcherResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, API_TIMESTAMP_FORMAT))
        .map_err(|e| FetcherError::Parse(format!("Invalid published_at '{value}': {e}")))
}

/// Format a timestamp the way the API emits it
pub fn format_timestamp(value: &DateTime<FixedOffset>) -> String {
    value.format(API_TIMESTAMP_FORMAT).to_string()
}
