use crate::coerce::unix_millis;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// Instant wrapping `chrono::DateTime<Utc>` that travels as milliseconds
/// since the Unix epoch, the way the API encodes every timestamp.
///
/// Use it directly as a field type when a dedicated attribute would be noise;
/// it deserializes through the same converter as `coerce::unix_millis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Create a new Timestamp from a DateTime
    pub fn new(dt: DateTime<Utc>) -> Self {
        Timestamp(dt)
    }

    /// Create a Timestamp from milliseconds since the epoch
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn from_millis(ms: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(ms).single().map(Timestamp)
    }

    /// Current time
    pub fn now() -> Self {
        Timestamp(Utc::now())
    }

    /// Get the timestamp in milliseconds
    pub fn unix_milli(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Get the unix timestamp in seconds
    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Deref for Timestamp {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(t: Timestamp) -> Self {
        t.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        unix_millis::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        unix_millis::deserialize(deserializer).map(Timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_serialization() {
        let time = Timestamp::from_millis(1597242491747).unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "1597242491747");
    }

    #[test]
    fn test_timestamp_deserialization() {
        let time: Timestamp = serde_json::from_str("1597242491747").unwrap();
        assert_eq!(time.unix(), 1597242491);
        assert_eq!(time.unix_milli(), 1597242491747);
        assert_eq!(time.to_string(), "2020-08-12T14:28:11.747+00:00");
    }

    #[test]
    fn test_timestamp_null() {
        let result: Result<Option<Timestamp>, _> = serde_json::from_str("null");
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_timestamp_rejects_text() {
        let result: Result<Timestamp, _> = serde_json::from_str(r#""last tuesday""#);
        assert!(result.is_err());
    }
}
