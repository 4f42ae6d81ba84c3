//! Custody/location event model.
//!
//! # Responsibility
//! - Define the immutable event record referenced by items.
//! - Own the wire format of event timestamps.
//!
//! # Invariants
//! - Events are created once and never mutated.
//! - `timestamp` has millisecond precision and is always UTC.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an event record.
pub type EventId = Uuid;

/// Creation input for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub location: String,
    pub custodian: String,
    /// Defaults to creation time when `None`.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewEvent {
    pub fn new(location: impl Into<String>, custodian: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            custodian: custodian.into(),
            timestamp: None,
        }
    }
}

/// Persisted event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub location: String,
    pub custodian: String,
    #[serde(with = "rfc3339_millis")]
    pub timestamp: DateTime<Utc>,
}

/// Truncates a timestamp to the millisecond precision used by storage.
pub fn to_storage_precision(value: DateTime<Utc>) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value.timestamp_millis())
}

/// Formats a timestamp the way event bodies carry it.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod rfc3339_millis {
    use super::format_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{to_storage_precision, Event};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn timestamp_serializes_as_utc_millis() {
        let event = Event {
            id: Uuid::new_v4(),
            location: "Dock 4".to_string(),
            custodian: "Bob".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["timestamp"], "2026-03-01T08:30:00.000Z");
    }

    #[test]
    fn storage_precision_drops_sub_millisecond_part() {
        let precise = Utc.timestamp_nanos(1_700_000_000_123_456_789);
        let truncated = to_storage_precision(precise).unwrap();
        assert_eq!(truncated.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(truncated.timestamp_subsec_nanos(), 123_000_000);
    }
}
