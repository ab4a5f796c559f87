use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub mod chat_tab;
pub mod composer;
pub mod workspace;
pub mod workspace_log;

/// Treats an explicit JSON `null` the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a millisecond timestamp from a number or an RFC 3339 string.
pub fn millis_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|millis| millis.is_finite())
                .map(|millis| millis as i64)
        }),
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|parsed| parsed.timestamp_millis()),
        _ => None,
    }
}

/// Renders a millisecond timestamp as RFC 3339, substituting the current time
/// for missing, zero or out-of-range values.
pub fn rfc3339_or_now(millis: Option<i64>) -> String {
    millis
        .filter(|millis| *millis != 0)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// First eight characters of an identifier, used in fallback titles.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_millis_from_numbers_and_strings() {
        assert_eq!(millis_from_value(&json!(1_700_000_000_000_i64)), Some(1_700_000_000_000));
        assert_eq!(millis_from_value(&json!(12.9)), Some(12));
        assert_eq!(
            millis_from_value(&json!("2024-01-02T03:04:05.006Z")),
            Some(1_704_164_645_006)
        );
        assert_eq!(millis_from_value(&json!("not a date")), None);
        assert_eq!(millis_from_value(&json!(null)), None);
    }

    #[test]
    fn formats_timestamps_or_falls_back_to_now() {
        assert_eq!(
            rfc3339_or_now(Some(1_704_164_645_006)),
            "2024-01-02T03:04:05.006Z"
        );

        let before = Utc::now();
        let fallback = rfc3339_or_now(None);
        let parsed = DateTime::parse_from_rfc3339(&fallback).expect("valid timestamp");
        assert!(parsed.timestamp() >= before.timestamp());

        let zero = rfc3339_or_now(Some(0));
        assert_ne!(zero, "1970-01-01T00:00:00.000Z");
        let out_of_range = rfc3339_or_now(Some(i64::MAX));
        assert!(DateTime::parse_from_rfc3339(&out_of_range).is_ok());
    }

    #[test]
    fn shortens_ids_by_characters() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
