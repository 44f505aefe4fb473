//! Date rendering for credential images and issuance views.

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Calendar date of an ISO date, an RFC 3339 timestamp or a unix timestamp (seconds).
pub fn parse_date_value(value: &Value) -> Option<Date> {
    match value {
        Value::String(text) => parse_date(text),
        Value::Number(number) => OffsetDateTime::from_unix_timestamp(number.as_i64()?)
            .ok()
            .map(|datetime| datetime.date()),
        _ => None,
    }
}

pub fn parse_date(text: &str) -> Option<Date> {
    let text = text.trim();

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| {
            OffsetDateTime::parse(text, &Rfc3339)
                .ok()
                .map(|datetime| datetime.date())
        })
}

/// `DD/MM/YYYY`
pub fn format_ddmmyyyy(date: Date) -> Option<String> {
    date.format(format_description!("[day]/[month]/[year]")).ok()
}

/// Short date in the conventions of `locale`. Unknown locales fall back to ISO 8601.
pub fn format_localized(date: Date, locale: &str) -> Option<String> {
    let language = locale.split(['-', '_']).next().unwrap_or_default();

    let formatted = match (locale, language) {
        ("en-US", _) | (_, "") => date.format(format_description!(
            "[month padding:none]/[day padding:none]/[year]"
        )),
        ("en-GB", _) | (_, "fr") | (_, "es") | (_, "it") | (_, "el") => {
            date.format(format_description!("[day]/[month]/[year]"))
        }
        (_, "de") => date.format(format_description!(
            "[day padding:none].[month padding:none].[year]"
        )),
        _ => date.format(format_description!("[year]-[month]-[day]")),
    };

    formatted.ok()
}
