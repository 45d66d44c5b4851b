use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Default environment assigned when the caller omits one
pub const DEFAULT_ENVIRONMENT: &str = "prod";

const MAX_ENVIRONMENT_LEN: usize = 16;

/// A persisted datetime message, as stored in a tenant's schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub datetime: DateTime<Utc>,
    pub environment: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for storing a message
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub datetime: DateTime<Utc>,
    pub environment: String,
}

impl NewMessage {
    /// Validates raw HTTP input into a storable message.
    ///
    /// `datetime` is required; `environment` falls back to
    /// [`DEFAULT_ENVIRONMENT`] when absent.
    pub fn parse(datetime: Option<&str>, environment: Option<&str>) -> DomainResult<Self> {
        let raw_datetime = datetime.ok_or(DomainError::MissingDatetime)?;
        let datetime = parse_datetime(raw_datetime)?;
        let environment = match environment {
            Some(env) => validate_environment(env)?,
            None => DEFAULT_ENVIRONMENT.to_string(),
        };
        Ok(Self {
            datetime,
            environment,
        })
    }
}

/// Per-tenant aggregate statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantStats {
    pub total_messages: i64,
    pub prod_messages: i64,
    pub test_messages: i64,
    pub last_message: Option<DateTime<Utc>>,
}

impl TenantStats {
    /// The zero-valued aggregate, returned for tenants with no storage yet
    pub fn empty() -> Self {
        Self {
            total_messages: 0,
            prod_messages: 0,
            test_messages: 0,
            last_message: None,
        }
    }
}

/// Parses a message datetime from RFC 3339 or `"%Y-%m-%d %H:%M:%S"`
/// (the producer's wire format, assumed UTC).
pub fn parse_datetime(raw: &str) -> DomainResult<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::MissingDatetime);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(DomainError::InvalidDatetime(raw.to_string()))
}

/// Validates an environment label: 1..=16 chars of `[A-Za-z0-9_-]`.
pub fn validate_environment(raw: &str) -> DomainResult<String> {
    let raw = raw.trim();
    let valid = !raw.is_empty()
        && raw.len() <= MAX_ENVIRONMENT_LEN
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(DomainError::InvalidEnvironment(raw.to_string()));
    }
    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_datetime() {
        let dt = parse_datetime("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_producer_wire_format_as_utc() {
        let dt = parse_datetime("2024-06-15 12:30:45").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 45).unwrap());
    }

    #[test]
    fn rejects_empty_and_garbage_datetimes() {
        assert!(matches!(
            parse_datetime(""),
            Err(DomainError::MissingDatetime)
        ));
        assert!(matches!(
            parse_datetime("   "),
            Err(DomainError::MissingDatetime)
        ));
        assert!(matches!(
            parse_datetime("not-a-date"),
            Err(DomainError::InvalidDatetime(_))
        ));
    }

    #[test]
    fn missing_datetime_is_required() {
        assert!(matches!(
            NewMessage::parse(None, None),
            Err(DomainError::MissingDatetime)
        ));
    }

    #[test]
    fn environment_defaults_to_prod() {
        let message = NewMessage::parse(Some("2024-01-01T00:00:00Z"), None).unwrap();
        assert_eq!(message.environment, DEFAULT_ENVIRONMENT);
    }

    #[test]
    fn environment_validation() {
        assert_eq!(validate_environment("test").unwrap(), "test");
        assert_eq!(validate_environment("stage-2").unwrap(), "stage-2");
        assert!(validate_environment("").is_err());
        assert!(validate_environment("has spaces").is_err());
        assert!(validate_environment("way-too-long-environment-name").is_err());
        assert!(validate_environment("drop;table").is_err());
    }
}
