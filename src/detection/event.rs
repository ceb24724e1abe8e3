//! Whistle events and capture timestamps

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Capture-clock timestamp split into whole seconds and microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub secs: i64,
    pub micros: u32,
}

impl Timestamp {
    pub fn new(secs: i64, micros: u32) -> Self {
        Self {
            secs: secs + (micros / 1_000_000) as i64,
            micros: micros % 1_000_000,
        }
    }

    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.secs, self.micros.checked_mul(1000)?).single()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::new(dt.timestamp(), dt.timestamp_subsec_micros())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.6f UTC")),
            None => write!(f, "{}.{:06}", self.secs, self.micros),
        }
    }
}

/// A confirmed whistle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhistleEvent {
    /// Capture timestamp of the chunk the whistle was confirmed in, if the source supplies one
    pub timestamp: Option<Timestamp>,
    /// Zero-based index of the confirming analysis window
    pub window_index: u64,
    /// Position in the analysed channel at the end of the confirming window
    #[serde(with = "duration_secs")]
    pub stream_offset: Duration,
}

impl fmt::Display for WhistleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "whistle at {:.3}s (window {})",
            self.stream_offset.as_secs_f64(),
            self.window_index
        )?;
        if let Some(ts) = &self.timestamp {
            write!(f, " [{}]", ts)?;
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_normalizes_micros() {
        let ts = Timestamp::new(10, 2_500_000);
        assert_eq!(ts, Timestamp { secs: 12, micros: 500_000 });
    }

    #[test]
    fn test_timestamp_datetime_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 7, 1, 12, 30, 5).unwrap();
        let ts = Timestamp::from(dt);
        assert_eq!(ts.to_datetime(), Some(dt));
        assert_eq!(ts.to_string(), "2024-07-01 12:30:05.000000 UTC");
    }

    #[test]
    fn test_unnormalized_micros_do_not_overflow() {
        let ts = Timestamp { secs: 10, micros: u32::MAX };
        assert_eq!(ts.to_datetime(), None);
        assert_eq!(ts.to_string(), format!("10.{:06}", u32::MAX));
    }

    #[test]
    fn test_event_json_shape() {
        let event = WhistleEvent {
            timestamp: None,
            window_index: 58,
            stream_offset: Duration::from_millis(1250),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["window_index"], 58);
        assert_eq!(json["stream_offset"], 1.25);
        assert!(json["timestamp"].is_null());
    }
}
