//! Wire-format helpers shared by the endpoint methods

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{DataPlatformError, Result};

/// Convert a snake_case field name to the API's camelCase
pub fn camelize(snake_name: &str) -> String {
    let mut parts = snake_name.split('_');
    let mut out = String::with_capacity(snake_name.len());
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

/// Query-string form of a boolean
pub fn bool_param(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// ISO 8601 / RFC 3339 form used for every time parameter
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Convert nanoseconds since epoch to a timestamp
///
/// The value goes through `f64` seconds and is rounded to the nearest
/// microsecond, so nanosecond digits are lost and very large values lose
/// sub-microsecond precision to float rounding. Use the exact
/// `timestamp_nanos` field of a record where that matters.
pub fn timestamp_from_nanos(nanos: i64) -> DateTime<Utc> {
    let seconds = nanos as f64 / 1e9;
    let micros = (seconds * 1e6).round() as i64;
    DateTime::from_timestamp_micros(micros).unwrap_or_default()
}

/// Query parameters with absent and falsy values dropped
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always-present parameter
    pub fn set(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.pairs.push((key, value.into()));
        self
    }

    /// Dropped when `None` or empty
    pub fn text(self, key: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.set(key, v),
            _ => self,
        }
    }

    /// Dropped when `None` or zero
    pub fn number(self, key: &'static str, value: Option<u64>) -> Self {
        match value {
            Some(v) if v != 0 => self.set(key, v.to_string()),
            _ => self,
        }
    }

    /// Dropped when `None`
    pub fn time(self, key: &'static str, value: Option<&DateTime<Utc>>) -> Self {
        match value {
            Some(t) => self.set(key, format_time(t)),
            None => self,
        }
    }

    /// Dropped when `false`
    pub fn flag(self, key: &'static str, value: bool) -> Self {
        if value {
            self.set(key, bool_param(true))
        } else {
            self
        }
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse a response body, turning error statuses into errors
///
/// The body must be JSON whatever the status. For 4xx responses the body's
/// `error` field replaces the reason phrase in the returned error.
pub fn json_or_error(status: StatusCode, body: &[u8]) -> Result<Value> {
    let json: Value =
        serde_json::from_slice(body).map_err(|e| DataPlatformError::UnexpectedFormat {
            status: status.as_u16(),
            detail: e.to_string(),
        })?;

    if status.is_client_error() || status.is_server_error() {
        let reason = status.canonical_reason().unwrap_or("Unknown Error").to_string();
        let message = if status.is_client_error() {
            match json.get("error") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => reason,
                Some(other) => other.to_string(),
            }
        } else {
            reason
        };
        return Err(DataPlatformError::api(status.as_u16(), message));
    }

    Ok(json)
}

/// Accepts nanosecond counts sent either as JSON numbers or strings
pub fn nanos<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Accepts a JSON number or string, yielding its string form
pub fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n.to_string()),
        StringOrNumber::String(s) => Ok(s),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(i64),
    String(String),
}
