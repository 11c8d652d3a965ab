//! Parsing of client input that arrives as loosely typed JSON or query strings.
//!
//! Clients may send numbers either as JSON numbers or as numeric strings, so
//! fields such as `amount` and `category_id` are read as [Value]s and checked
//! here. Every failure maps to a client facing [Error].

use axum::extract::{Path, rejection::PathRejection};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::{Date, macros::format_description};

use crate::{Error, Kind, asset::AssetType, category::CategoryId};

/// Unwrap an ID path parameter, turning a rejection into a JSON client error.
pub(crate) fn parse_path_id<T>(path: Result<Path<T>, PathRejection>) -> Result<T, Error> {
    path.map(|Path(id)| id)
        .map_err(|rejection| Error::InvalidPathParameter(rejection.body_text()))
}

/// Parse a calendar date formatted as YYYY-MM-DD.
pub(crate) fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Parse a date given as a JSON value, anything other than a string is invalid.
pub(crate) fn parse_date_value(value: &Value) -> Result<Date, Error> {
    match value {
        Value::String(text) => parse_date(text),
        other => Err(Error::InvalidDate(display_value(other))),
    }
}

/// Parse an optional query string date, treating an empty string as absent.
pub(crate) fn parse_optional_date(text: Option<&str>) -> Result<Option<Date>, Error> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_date(text).map(Some),
    }
}

/// Parse an amount given as a JSON number or a numeric string.
///
/// Only checks that the value is a finite number, the sign is validated by
/// the store.
pub(crate) fn parse_amount(value: &Value) -> Result<f64, Error> {
    let amount = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match amount {
        Some(amount) if amount.is_finite() => Ok(amount),
        _ => Err(Error::InvalidAmount(display_value(value))),
    }
}

/// Parse a transaction type given as a JSON value.
pub(crate) fn parse_kind(value: &Value) -> Result<Kind, Error> {
    match value {
        Value::String(text) => text.parse(),
        other => Err(Error::InvalidKind(display_value(other))),
    }
}

/// Parse an asset type given as a JSON value.
pub(crate) fn parse_asset_type(value: &Value) -> Result<AssetType, Error> {
    match value {
        Value::String(text) => text.parse(),
        other => Err(Error::InvalidAssetType(display_value(other))),
    }
}

/// Parse a category ID given as a JSON integer or an integer string.
pub(crate) fn parse_category_id(value: &Value) -> Result<CategoryId, Error> {
    let id = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<CategoryId>().ok(),
        _ => None,
    };

    id.ok_or_else(|| Error::InvalidCategoryId(display_value(value)))
}

/// Parse a category ID that may be explicitly set to `null` to clear it.
pub(crate) fn parse_nullable_category_id(value: &Value) -> Result<Option<CategoryId>, Error> {
    match value {
        Value::Null => Ok(None),
        value => parse_category_id(value).map(Some),
    }
}

/// Parse a query string category ID, treating an empty string as absent.
pub(crate) fn parse_optional_category_id(text: Option<&str>) -> Result<Option<CategoryId>, Error> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidCategoryId(text.to_owned())),
    }
}

/// Parse a query string result limit, which must be a positive integer.
pub(crate) fn parse_optional_limit(text: Option<&str>) -> Result<Option<u32>, Error> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => match text.parse::<u32>() {
            Ok(limit) if limit > 0 => Ok(Some(limit)),
            _ => Err(Error::InvalidLimit(text.to_owned())),
        },
    }
}

/// Parse a text field that must be a string when it is present.
pub(crate) fn parse_text(field_name: &'static str, value: &Value) -> Result<String, Error> {
    match value {
        Value::String(text) => Ok(text.to_owned()),
        _ => Err(Error::InvalidFieldType(field_name, "a string")),
    }
}

/// Parse a text field that may be explicitly set to `null` to clear it.
pub(crate) fn parse_nullable_text(
    field_name: &'static str,
    value: &Value,
) -> Result<Option<String>, Error> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.to_owned())),
        _ => Err(Error::InvalidFieldType(field_name, "a string or null")),
    }
}

/// Deserialize a field so that an explicit `null` becomes `Some(Value::Null)`.
///
/// Use together with `#[serde(default)]` so that a missing field is `None`.
pub(crate) fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.to_owned(),
        other => other.to_string(),
    }
}
