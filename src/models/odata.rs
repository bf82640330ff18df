//! Tolerant decoders for OData wire values.
//!
//! V2 services send decimals as strings and dates as `/Date(ms)/` literals,
//! V4 services send numbers and ISO-8601 text. The document models accept both
//! so one struct serves either protocol and also round-trips through our own
//! JSON output.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Empty strings and nulls both decode to `None`.
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

/// Accepts a JSON string or number and keeps its textual form.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unrecognised date literal '{}'", raw))),
    }
}

pub fn opt_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_datetime(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unrecognised timestamp '{}'", raw))),
    }
}

/// Parses `/Date(1714521600000)/`, `/Date(1714521600000+0000)/`, RFC 3339 and
/// `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Some(millis) = v2_date_millis(raw) {
        return Utc.timestamp_millis_opt(millis).single().map(|dt| dt.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Some(millis) = v2_date_millis(raw) {
        return Utc.timestamp_millis_opt(millis).single();
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn v2_date_millis(raw: &str) -> Option<i64> {
    let inner = raw.strip_prefix("/Date(")?.strip_suffix(")/")?;
    // offset suffix (+0000) is informational, the millis are already UTC
    let end = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .unwrap_or(inner.len());
    inner[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "string_or_number")]
        qty: Option<String>,
        #[serde(default, deserialize_with = "opt_date")]
        date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "empty_as_none")]
        doc: Option<String>,
    }

    #[test]
    fn decodes_v2_values() {
        let sample: Sample = serde_json::from_value(serde_json::json!({
            "qty": "12.000",
            "date": "/Date(1714521600000)/",
            "doc": ""
        }))
        .unwrap();

        assert_eq!(sample.qty.as_deref(), Some("12.000"));
        assert_eq!(sample.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(sample.doc, None);
    }

    #[test]
    fn decodes_v4_values() {
        let sample: Sample = serde_json::from_value(serde_json::json!({
            "qty": 40,
            "date": "2024-05-01",
            "doc": " 1800000123 "
        }))
        .unwrap();

        assert_eq!(sample.qty.as_deref(), Some("40"));
        assert_eq!(sample.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(sample.doc.as_deref(), Some("1800000123"));
    }

    #[test]
    fn missing_fields_are_none() {
        let sample: Sample = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(sample.qty.is_none() && sample.date.is_none() && sample.doc.is_none());
    }

    #[test]
    fn v2_literal_with_offset() {
        let parsed = parse_datetime("/Date(1714521600000+0000)/").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T00:00:00+00:00");
    }

    #[test]
    fn garbage_date_is_rejected() {
        let result: Result<Sample, _> =
            serde_json::from_value(serde_json::json!({ "date": "yesterday" }));
        assert!(result.is_err());
    }
}
