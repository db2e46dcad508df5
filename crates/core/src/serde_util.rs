//! Lenient deserializers for form-shaped JSON payloads.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Deserialize blank strings as `None`.
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Deserialize an optional id where `""` means "not set".
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id '{}'", raw))),
    }
}

/// Deserialize a number sent either as JSON number or as a numeric string.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid number '{}'", text))),
    }
}

/// Deserialize RFC 3339 timestamps, `datetime-local` values or plain dates.
/// Values without an offset are taken as UTC.
pub fn optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = s.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    parse_datetime(raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Patch field that can be cleared: absent stays `None` (with
/// `#[serde(default)]`), `null` or `""` becomes `Some(None)`.
pub fn clearable_string<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    empty_string_as_none(deserializer).map(Some)
}

pub fn clearable_id<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_id(deserializer).map(Some)
}

pub fn clearable_datetime<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_datetime(deserializer).map(Some)
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "optional_id")]
        contact_id: Option<Uuid>,
        #[serde(default, deserialize_with = "empty_string_as_none")]
        phone: Option<String>,
    }

    #[test]
    fn blank_values_become_none() {
        let form: Form = serde_json::from_str(r#"{"contact_id": "", "phone": "  "}"#).unwrap();
        assert!(form.contact_id.is_none());
        assert!(form.phone.is_none());

        let form: Form = serde_json::from_str("{}").unwrap();
        assert!(form.contact_id.is_none());
    }

    #[derive(Deserialize)]
    struct Schedule {
        #[serde(default, deserialize_with = "optional_datetime")]
        at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "optional_number")]
        value: Option<f64>,
    }

    #[test]
    fn dates_accept_common_shapes() {
        for raw in ["2024-05-01T09:30:00Z", "2024-05-01T09:30", "2024-05-01T11:30:00+02:00"] {
            let s: Schedule = serde_json::from_str(&format!(r#"{{"at": "{}"}}"#, raw)).unwrap();
            assert_eq!(s.at.unwrap().to_rfc3339(), "2024-05-01T09:30:00+00:00", "{raw}");
        }
        let s: Schedule = serde_json::from_str(r#"{"at": "2024-05-01"}"#).unwrap();
        assert_eq!(s.at.unwrap().to_rfc3339(), "2024-05-01T00:00:00+00:00");
        let s: Schedule = serde_json::from_str(r#"{"at": ""}"#).unwrap();
        assert!(s.at.is_none());
        assert!(serde_json::from_str::<Schedule>(r#"{"at": "soon"}"#).is_err());
    }

    #[test]
    fn numbers_accept_strings() {
        let s: Schedule = serde_json::from_str(r#"{"value": 1500.5}"#).unwrap();
        assert_eq!(s.value, Some(1500.5));
        let s: Schedule = serde_json::from_str(r#"{"value": "2500"}"#).unwrap();
        assert_eq!(s.value, Some(2500.0));
        assert!(serde_json::from_str::<Schedule>(r#"{"value": "lots"}"#).is_err());
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for raw in ["NaN", "inf", "-infinity"] {
            let body = format!(r#"{{"value": "{}"}}"#, raw);
            assert!(serde_json::from_str::<Schedule>(&body).is_err(), "{raw}");
        }
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "clearable_string")]
        phone: Option<Option<String>>,
        #[serde(default, deserialize_with = "clearable_datetime")]
        due: Option<Option<DateTime<Utc>>>,
    }

    #[test]
    fn clearable_fields_distinguish_absent_from_cleared() {
        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.phone, None);
        assert_eq!(patch.due, None);

        let patch: Patch = serde_json::from_str(r#"{"phone": "", "due": null}"#).unwrap();
        assert_eq!(patch.phone, Some(None));
        assert_eq!(patch.due, Some(None));

        let patch: Patch = serde_json::from_str(r#"{"phone": "555-0100"}"#).unwrap();
        assert_eq!(patch.phone, Some(Some("555-0100".to_string())));
    }

    #[test]
    fn ids_are_parsed() {
        let id = Uuid::new_v4();
        let form: Form = serde_json::from_str(&format!(r#"{{"contact_id": "{}"}}"#, id)).unwrap();
        assert_eq!(form.contact_id, Some(id));

        assert!(serde_json::from_str::<Form>(r#"{"contact_id": "nope"}"#).is_err());
    }
}
