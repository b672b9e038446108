//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies arrive as loosely typed strings; these helpers turn them
//! into domain values and report failures as `invalid_request` errors whose
//! details name the offending field.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use pagination::PageRequest;
use serde_json::json;

use crate::domain::{Error, InvalidIdentifier};
use crate::inbound::http::state::PagingSettings;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidDate,
    InvalidTime,
    InvalidIdentifier,
    InvalidValue,
    InvalidPage,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidDate => "invalid_date",
            Self::InvalidTime => "invalid_time",
            Self::InvalidIdentifier => "invalid_identifier",
            Self::InvalidValue => "invalid_value",
            Self::InvalidPage => "invalid_page",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("missing required field: {name}"))
        .with_code(ErrorCode::MissingField)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        ValidationError::new(field, format!("{name} must be a date formatted YYYY-MM-DD"))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

/// Parse an `HH:MM` or `HH:MM:SS` wall-clock time.
pub(crate) fn parse_time(value: &str, field: FieldName) -> Result<NaiveTime, Error> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| {
            let name = field.as_str();
            ValidationError::new(field, format!("{name} must be a time formatted HH:MM"))
                .with_value(ErrorCode::InvalidTime, value)
        })
}

pub(crate) fn parse_optional_date(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_date(&raw, field)).transpose()
}

pub(crate) fn parse_optional_time(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<NaiveTime>, Error> {
    value.map(|raw| parse_time(&raw, field)).transpose()
}

/// Parse an identifier with the constructor of its newtype.
pub(crate) fn parse_id<T>(
    value: &str,
    field: FieldName,
    parse: impl FnOnce(&str) -> Result<T, InvalidIdentifier>,
) -> Result<T, Error> {
    parse(value).map_err(|err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidIdentifier, value)
    })
}

/// Parse a named value such as a status, priority or service type.
pub(crate) fn parse_named<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse::<T>().map_err(|err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidValue, value)
    })
}

pub(crate) fn parse_optional_named<T>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value.map(|raw| parse_named(raw, field)).transpose()
}

/// Build a page request from the `page` and `pageSize` query parameters.
///
/// Absent values fall back to the first page and the configured default
/// size; the configured maximum bounds the size.
pub(crate) fn page_request(
    page: Option<usize>,
    page_size: Option<usize>,
    paging: PagingSettings,
) -> Result<PageRequest, Error> {
    let number = page.unwrap_or(1);
    if number == 0 {
        return Err(ValidationError::new(
            FieldName::new(pagination::PAGE_PARAM),
            "page numbers start at 1",
        )
        .with_value(ErrorCode::InvalidPage, "0"));
    }
    let size = page_size.unwrap_or(paging.default_page_size);
    PageRequest::with_max_page_size(number, size, paging.max_page_size).map_err(|err| {
        ValidationError::new(FieldName::new(pagination::PAGE_SIZE_PARAM), err.to_string())
            .with_value(ErrorCode::InvalidPage, size.to_string())
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::{ErrorCode as ApiErrorCode, JobStatus, TechnicianId};

    fn detail(error: &Error, key: &str) -> Option<Value> {
        error.details().and_then(|details| details.get(key)).cloned()
    }

    #[rstest]
    #[case("2024-03-14", NaiveDate::from_ymd_opt(2024, 3, 14))]
    #[case(" 2024-12-01 ", NaiveDate::from_ymd_opt(2024, 12, 1))]
    fn parses_dates(#[case] raw: &str, #[case] expected: Option<NaiveDate>) {
        let parsed = parse_date(raw, FieldName::new("scheduledDate")).expect("valid date");
        assert_eq!(Some(parsed), expected);
    }

    #[rstest]
    fn rejects_malformed_dates() {
        let err = parse_date("14/03/2024", FieldName::new("scheduledDate")).expect_err("bad date");
        assert_eq!(err.code(), ApiErrorCode::InvalidRequest);
        assert_eq!(detail(&err, "field"), Some(Value::from("scheduledDate")));
        assert_eq!(detail(&err, "code"), Some(Value::from("invalid_date")));
    }

    #[rstest]
    #[case("09:00", NaiveTime::from_hms_opt(9, 0, 0))]
    #[case("14:30:15", NaiveTime::from_hms_opt(14, 30, 15))]
    fn parses_times(#[case] raw: &str, #[case] expected: Option<NaiveTime>) {
        let parsed = parse_time(raw, FieldName::new("scheduledTime")).expect("valid time");
        assert_eq!(Some(parsed), expected);
    }

    #[rstest]
    fn rejects_unknown_names() {
        let err = parse_named::<JobStatus>("done", FieldName::new("status")).expect_err("unknown");
        assert_eq!(detail(&err, "value"), Some(Value::from("done")));
        assert_eq!(detail(&err, "code"), Some(Value::from("invalid_value")));
    }

    #[rstest]
    fn rejects_spaced_identifiers() {
        let err = parse_id("TECH 001", FieldName::new("technicianId"), TechnicianId::parse)
            .expect_err("spaced id");
        assert_eq!(detail(&err, "code"), Some(Value::from("invalid_identifier")));
    }

    #[rstest]
    fn page_defaults_come_from_settings() {
        let paging = PagingSettings {
            default_page_size: 25,
            max_page_size: 50,
        };
        let request = page_request(None, None, paging).expect("defaults");
        assert_eq!((request.page(), request.page_size()), (1, 25));
    }

    #[rstest]
    #[case(Some(0), Some(10), "page")]
    #[case(Some(1), Some(0), "pageSize")]
    #[case(Some(1), Some(101), "pageSize")]
    fn rejects_out_of_range_paging(
        #[case] page: Option<usize>,
        #[case] page_size: Option<usize>,
        #[case] field: &str,
    ) {
        let err = page_request(page, page_size, PagingSettings::default()).expect_err("rejected");
        assert_eq!(err.code(), ApiErrorCode::InvalidRequest);
        assert_eq!(detail(&err, "field"), Some(Value::from(field)));
    }
}
