//! Field converters for JSON tokens the API does not encode the standard way.
//!
//! Each submodule is a `#[serde(with = "...")]` target bound to one native
//! type, so the mapping from field to converter is fixed at compile time.
//! Every converter rejects input it cannot interpret instead of falling back
//! to a default; the pipeline reports the failing field path.
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Entry {
//!     #[serde(with = "feedly::coerce::flexible_bool")]
//!     unread: bool,
//!     #[serde(with = "feedly::coerce::unix_millis")]
//!     published: DateTime<Utc>,
//!     #[serde(with = "feedly::coerce::duration")]
//!     engagement_time: Duration,
//!     #[serde(default, with = "feedly::coerce::nullable_int")]
//!     engagement: Option<i64>,
//! }
//!
//! let entry: Entry = serde_json::from_str(
//!     r#"{"unread":1,"published":1367539068016,"engagement_time":"00:01:30","engagement":""}"#,
//! ).unwrap();
//! assert!(entry.unread);
//! assert_eq!(entry.published.timestamp(), 1367539068);
//! assert_eq!(entry.engagement_time, Duration::from_secs(90));
//! assert_eq!(entry.engagement, None);
//! ```

/// Booleans sent as `true`/`false`, `0`/`1` (also `0.0`/`1.0`), or strings
/// such as `"yes"`.
pub mod flexible_bool {
    use serde::de::{self, Unexpected, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(BoolVisitor)
    }

    struct BoolVisitor;

    impl<'de> Visitor<'de> for BoolVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean, 0/1, or a boolean string")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(Unexpected::Signed(v), &self)),
            }
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
            if v == 0.0 {
                Ok(false)
            } else if v == 1.0 {
                Ok(true)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
            }
        }
    }

    /// Same as the parent module for `Option<bool>`, mapping `null` to `None`
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super")] bool);

        pub fn serialize<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(v) => serializer.serialize_some(v),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
        }
    }
}

/// Instants encoded as milliseconds since the Unix epoch, in UTC.
pub mod unix_millis {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::de::{self, Unexpected, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.timestamp_millis())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MillisVisitor)
    }

    pub(crate) fn from_millis<E: de::Error>(ms: i64) -> Result<DateTime<Utc>, E> {
        Utc.timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| E::invalid_value(Unexpected::Signed(ms), &"a timestamp within range"))
    }

    struct MillisVisitor;

    impl<'de> Visitor<'de> for MillisVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("milliseconds since the Unix epoch")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            from_millis(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            let ms = i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))?;
            from_millis(ms)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if v.fract() != 0.0 || v.abs() >= i64::MAX as f64 {
                return Err(E::invalid_value(Unexpected::Float(v), &self));
            }
            from_millis(v as i64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let ms = v
                .trim()
                .parse::<i64>()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))?;
            from_millis(ms)
        }
    }

    /// Same as the parent module for `Option<DateTime<Utc>>`
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super")] DateTime<Utc>);

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(v) => serializer.serialize_some(&v.timestamp_millis()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
        }
    }
}

/// Elapsed time sent as a millisecond count or a `[d.]hh:mm:ss[.fff]` string.
pub mod duration {
    use serde::de::{self, Unexpected, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;
    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DurationVisitor)
    }

    /// Parse the clock form `[d.]hh:mm:ss[.fffffffff]`
    pub fn parse_clock(s: &str) -> Option<Duration> {
        let (days, rest) = match s.split_once(':') {
            Some((head, _)) if head.contains('.') => {
                let (d, _) = head.split_once('.')?;
                (Some(d.parse::<u64>().ok()?), &s[d.len() + 1..])
            }
            _ => (None, s),
        };

        let mut parts = rest.split(':');
        let hours: u64 = parts.next()?.parse().ok()?;
        let minutes: u64 = parts.next()?.parse().ok()?;
        let seconds_part = parts.next()?;
        if parts.next().is_some() || minutes >= 60 {
            return None;
        }
        // with a day count, hours are a time of day
        if days.is_some() && hours >= 24 {
            return None;
        }

        let (seconds, fraction) = match seconds_part.split_once('.') {
            Some((s, f)) => (s, Some(f)),
            None => (seconds_part, None),
        };
        let seconds: u64 = seconds.parse().ok()?;
        if seconds >= 60 {
            return None;
        }

        let nanos = match fraction {
            Some(f) if f.is_empty() || f.len() > 9 || !f.bytes().all(|b| b.is_ascii_digit()) => {
                return None
            }
            Some(f) => format!("{:0<9}", f).parse::<u32>().ok()?,
            None => 0,
        };

        let total = days
            .unwrap_or(0)
            .checked_mul(86_400)?
            .checked_add(hours.checked_mul(3_600)?)?
            .checked_add(minutes * 60 + seconds)?;
        Some(Duration::new(total, nanos))
    }

    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative millisecond count or a [d.]hh:mm:ss string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_millis(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_millis)
                .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Duration, E> {
            Duration::try_from_secs_f64(v / 1000.0)
                .map_err(|_| E::invalid_value(Unexpected::Float(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            let trimmed = v.trim();
            if let Ok(ms) = trimmed.parse::<u64>() {
                return Ok(Duration::from_millis(ms));
            }
            parse_clock(trimmed).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    /// Same as the parent module for `Option<Duration>`
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super")] Duration);

        pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(v) => serializer.serialize_some(&u64::try_from(v.as_millis()).unwrap_or(u64::MAX)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
        }
    }
}

/// Integers that may arrive as `null`, `""`, or a numeric string.
///
/// Pair with `#[serde(default)]` so a missing field is `None` as well.
pub mod nullable_int {
    use serde::de::{self, Unexpected, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(NullableIntVisitor)
    }

    struct NullableIntVisitor;

    impl<'de> Visitor<'de> for NullableIntVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer, null, or an empty string")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            i64::try_from(v)
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if v.fract() != 0.0 || v.abs() >= i64::MAX as f64 {
                return Err(E::invalid_value(Unexpected::Float(v), &self));
            }
            Ok(Some(v as i64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<i64>()
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Deserialize, Serialize)]
    struct Flags {
        #[serde(with = "super::flexible_bool")]
        unread: bool,
        #[serde(default, with = "super::flexible_bool::option")]
        saved: Option<bool>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    struct Times {
        #[serde(with = "super::unix_millis")]
        published: DateTime<Utc>,
        #[serde(default, with = "super::unix_millis::option")]
        updated: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    struct Elapsed {
        #[serde(with = "super::duration")]
        spent: Duration,
        #[serde(default, with = "super::duration::option")]
        remaining: Option<Duration>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    struct Counts {
        #[serde(default, with = "super::nullable_int")]
        unread: Option<i64>,
    }

    #[test]
    fn test_bool_tokens() {
        for (json, expected) in [
            (r#"{"unread":true}"#, true),
            (r#"{"unread":false}"#, false),
            (r#"{"unread":1}"#, true),
            (r#"{"unread":0}"#, false),
            (r#"{"unread":"True"}"#, true),
            (r#"{"unread":" no "}"#, false),
            (r#"{"unread":"1"}"#, true),
            (r#"{"unread":1.0}"#, true),
            (r#"{"unread":0.0}"#, false),
        ] {
            let flags: Flags = serde_json::from_str(json).unwrap();
            assert_eq!(flags.unread, expected, "input {}", json);
            assert_eq!(flags.saved, None);
        }
    }

    #[test]
    fn test_bool_rejects_garbage() {
        let err = serde_json::from_str::<Flags>(r#"{"unread":"maybe"}"#).unwrap_err();
        assert!(err.to_string().contains("maybe"), "{}", err);

        assert!(serde_json::from_str::<Flags>(r#"{"unread":2}"#).is_err());
        assert!(serde_json::from_str::<Flags>(r#"{"unread":0.5}"#).is_err());
        assert!(serde_json::from_str::<Flags>(r#"{"unread":null}"#).is_err());
    }

    #[test]
    fn test_optional_bool() {
        let flags: Flags = serde_json::from_str(r#"{"unread":0,"saved":"yes"}"#).unwrap();
        assert_eq!(flags.saved, Some(true));
        let flags: Flags = serde_json::from_str(r#"{"unread":0,"saved":null}"#).unwrap();
        assert_eq!(flags.saved, None);
    }

    #[test]
    fn test_unix_millis() {
        let times: Times = serde_json::from_str(r#"{"published":1367539068016}"#).unwrap();
        assert_eq!(
            times.published,
            Utc.timestamp_millis_opt(1367539068016).single().unwrap()
        );
        assert_eq!(times.updated, None);

        let times: Times =
            serde_json::from_str(r#"{"published":"1367539068016","updated":1367539068017}"#).unwrap();
        assert_eq!(times.published.timestamp_subsec_millis(), 16);
        assert_eq!(times.updated.unwrap().timestamp_millis(), 1367539068017);

        let json = serde_json::to_value(&times).unwrap();
        assert_eq!(json["published"], 1367539068016i64);
        assert_eq!(json["updated"], 1367539068017i64);
    }

    #[test]
    fn test_unix_millis_rejects_non_numeric() {
        assert!(serde_json::from_str::<Times>(r#"{"published":"yesterday"}"#).is_err());
        assert!(serde_json::from_str::<Times>(r#"{"published":1.5}"#).is_err());
    }

    #[test]
    fn test_duration_forms() {
        let elapsed: Elapsed = serde_json::from_str(r#"{"spent":1500}"#).unwrap();
        assert_eq!(elapsed.spent, Duration::from_millis(1500));

        let elapsed: Elapsed = serde_json::from_str(r#"{"spent":"250"}"#).unwrap();
        assert_eq!(elapsed.spent, Duration::from_millis(250));

        let elapsed: Elapsed =
            serde_json::from_str(r#"{"spent":"01:02:03","remaining":"1.00:00:00.25"}"#).unwrap();
        assert_eq!(elapsed.spent, Duration::from_secs(3723));
        assert_eq!(elapsed.remaining, Some(Duration::from_millis(86_400_250)));

        let json = serde_json::to_value(&elapsed).unwrap();
        assert_eq!(json["spent"], 3_723_000u64);
    }

    #[test]
    fn test_duration_rejects_bad_input() {
        assert!(serde_json::from_str::<Elapsed>(r#"{"spent":-1}"#).is_err());
        assert!(serde_json::from_str::<Elapsed>(r#"{"spent":"00:61:00"}"#).is_err());
        assert!(serde_json::from_str::<Elapsed>(r#"{"spent":"soon"}"#).is_err());
        assert!(serde_json::from_str::<Elapsed>(r#"{"spent":true}"#).is_err());
    }

    #[test]
    fn test_parse_clock() {
        use super::duration::parse_clock;

        assert_eq!(parse_clock("00:00:01"), Some(Duration::from_secs(1)));
        assert_eq!(parse_clock("2.03:00:00"), Some(Duration::from_secs(2 * 86_400 + 3 * 3_600)));
        assert_eq!(parse_clock("00:00:00.5"), Some(Duration::from_millis(500)));
        assert_eq!(parse_clock("1.23:59:59"), Some(Duration::from_secs(86_400 * 2 - 1)));
        assert_eq!(parse_clock("1.99:00:00"), None);
        assert_eq!(parse_clock("99:00:00"), Some(Duration::from_secs(99 * 3_600)));
        assert_eq!(parse_clock("00:00"), None);
        assert_eq!(parse_clock("00:00:00."), None);
        assert_eq!(parse_clock("a:b:c"), None);
    }

    #[test]
    fn test_nullable_int() {
        let counts: Counts = serde_json::from_str(r#"{"unread":42}"#).unwrap();
        assert_eq!(counts.unread, Some(42));
        let counts: Counts = serde_json::from_str(r#"{"unread":null}"#).unwrap();
        assert_eq!(counts.unread, None);
        let counts: Counts = serde_json::from_str(r#"{"unread":""}"#).unwrap();
        assert_eq!(counts.unread, None);
        let counts: Counts = serde_json::from_str(r#"{"unread":"-7"}"#).unwrap();
        assert_eq!(counts.unread, Some(-7));
        let counts: Counts = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(counts.unread, None);
    }

    #[test]
    fn test_nullable_int_rejects_text() {
        let err = serde_json::from_str::<Counts>(r#"{"unread":"lots"}"#).unwrap_err();
        assert!(err.to_string().contains("lots"), "{}", err);
        assert!(serde_json::from_str::<Counts>(r#"{"unread":[]}"#).is_err());
    }
}
