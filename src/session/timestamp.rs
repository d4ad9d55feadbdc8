//! Timestamps that survive schema drift
//!
//! Persisted records carry their dates as strings written by whatever
//! version of the application saved them. Reviving them never fails: a value
//! that cannot be understood becomes [`Timestamp::Invalid`] and the views
//! built on top of it degrade to an "unknown" label.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A point in time, or the sentinel for a value that failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timestamp {
    /// A well-formed UTC instant, held at millisecond precision
    Valid(DateTime<Utc>),
    /// The stored value was missing, null, or unparseable
    #[default]
    Invalid,
}

/// Naive layouts accepted in addition to RFC 3339, interpreted as UTC.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Years that RFC 3339 can spell with four digits
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

impl Timestamp {
    /// The current instant
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Wrap an instant, truncating to the millisecond precision used on disk
    ///
    /// Instants outside years 0000 through 9999 cannot be written back as
    /// RFC 3339 and become [`Timestamp::Invalid`].
    pub fn at(instant: DateTime<Utc>) -> Self {
        if !STORABLE_YEARS.contains(&instant.year()) {
            return Self::Invalid;
        }
        Self::Valid(instant.trunc_subsecs(3))
    }

    /// Interpret integer milliseconds since the Unix epoch
    pub fn from_millis(millis: i64) -> Self {
        DateTime::from_timestamp_millis(millis)
            .map(Self::at)
            .unwrap_or(Self::Invalid)
    }

    /// Parse a stored date string
    ///
    /// Accepts RFC 3339, naive date-times (taken as UTC) and plain
    /// `YYYY-MM-DD` dates. Anything else yields [`Timestamp::Invalid`].
    ///
    /// # Examples
    ///
    /// ```
    /// use chatshelf::session::Timestamp;
    ///
    /// assert!(Timestamp::parse("2024-03-01T10:00:00.000Z").is_valid());
    /// assert!(Timestamp::parse("2024-03-01").is_valid());
    /// assert!(!Timestamp::parse("last tuesday").is_valid());
    /// ```
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Self::at(instant.with_timezone(&Utc));
        }

        for layout in NAIVE_LAYOUTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
                return Self::at(naive.and_utc());
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self::at(naive.and_utc()))
            .unwrap_or(Self::Invalid)
    }

    /// Revive a timestamp from an arbitrary JSON value
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(raw) => Self::parse(raw),
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Self::from_millis)
                .unwrap_or(Self::Invalid),
            _ => Self::Invalid,
        }
    }

    /// The underlying instant, if valid
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Valid(instant) => Some(*instant),
            Self::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The later of two timestamps; a valid value always beats an invalid one
    pub fn latest(self, other: Self) -> Self {
        match (self, other) {
            (Self::Valid(a), Self::Valid(b)) => Self::Valid(a.max(b)),
            (Self::Valid(_), Self::Invalid) => self,
            (Self::Invalid, _) => other,
        }
    }

    /// RFC 3339 with milliseconds and a `Z` suffix, as written to storage
    pub fn to_rfc3339(&self) -> Option<String> {
        self.as_datetime()
            .map(|instant| instant.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::at(instant)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_rfc3339() {
            Some(text) => serializer.serialize_str(&text),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}
