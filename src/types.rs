//! Core types for the sensor health core
//!
//! This module defines the records that flow between the stages: raw feature
//! triples, scored and labeled readings, the identity key used for deletion,
//! and the summary structures handed to the presentation shell.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text format for reading timestamps at the boundary and in snapshots
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Binary health status of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Status {
    /// Encoded as 0
    Unhealthy,
    /// Encoded as 1
    Healthy,
}

impl Status {
    pub fn as_u8(&self) -> u8 {
        match self {
            Status::Unhealthy => 0,
            Status::Healthy => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unhealthy => "unhealthy",
            Status::Healthy => "healthy",
        }
    }

    /// Class index used by the classifier (0 or 1)
    pub(crate) fn index(&self) -> usize {
        self.as_u8() as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        if index == 0 {
            Status::Unhealthy
        } else {
            Status::Healthy
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.as_u8()
    }
}

impl TryFrom<u8> for Status {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Status::Unhealthy),
            1 => Ok(Status::Healthy),
            other => Err(format!("status must be 0 or 1, got {other}")),
        }
    }
}

/// Where a reading's status came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    /// Seed dataset: externally supplied health score, labeled by threshold
    Seed,
    /// Added by the user: health score computed, labeled by threshold
    GroundTruth,
    /// Added by the user with the classifier's prediction as status
    Predicted,
}

/// The three physical measurements the classifier sees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    /// Temperature (°C)
    pub temperature: f64,
    /// Stress (MPa)
    pub stress: f64,
    /// Displacement (m)
    pub displacement: f64,
}

impl Features {
    pub const COUNT: usize = 3;

    pub fn new(temperature: f64, stress: f64, displacement: f64) -> Self {
        Self {
            temperature,
            stress,
            displacement,
        }
    }

    pub fn to_array(&self) -> [f64; Features::COUNT] {
        [self.temperature, self.stress, self.displacement]
    }
}

/// A single time-stamped sensor reading with its health score and status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    /// Minute-precision timestamp
    #[serde(with = "minute_timestamp")]
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub stress: f64,
    pub displacement: f64,
    /// Composite score in 0-100, two decimals
    pub health_score: f64,
    pub status: Status,
    pub label_source: LabelSource,
}

impl SensorReading {
    pub fn features(&self) -> Features {
        Features::new(self.temperature, self.stress, self.displacement)
    }

    pub fn key(&self) -> ReadingKey {
        ReadingKey {
            sensor_id: self.sensor_id.clone(),
            timestamp: self.timestamp,
            temperature: self.temperature,
        }
    }

    /// Exact match on the identity key. Temperature uses float equality, no tolerance.
    pub fn matches(&self, key: &ReadingKey) -> bool {
        self.sensor_id == key.sensor_id
            && self.timestamp == key.timestamp
            && self.temperature == key.temperature
    }
}

/// Identity of a reading as the presentation layer reads it back from a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingKey {
    pub sensor_id: String,
    #[serde(with = "minute_timestamp")]
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
}

/// A validated reading that has not been scored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub sensor_id: String,
    pub timestamp: NaiveDateTime,
    pub features: Features,
}

/// Result of the ground-truth add path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddOutcome {
    pub health_score: f64,
    /// Status stored with the reading (labeler)
    pub status: Status,
    /// Classifier's opinion, informational only
    pub predicted_status: Status,
}

/// Mean/min/max of one measurement within a sensor group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Aggregate statistics for one sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSummary {
    pub sensor_id: String,
    pub readings: usize,
    pub temperature: StatSummary,
    pub stress: StatSummary,
    pub displacement: StatSummary,
}

/// Statistical summary of the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    /// One entry per sensor, ordered by sensor id
    pub sensors: Vec<SensorSummary>,
    /// Sensor with the highest mean stress, first in sensor order on ties
    pub highest_mean_stress: Option<String>,
    /// Cutoff used for `high_temperature`
    pub high_temperature_cutoff: f64,
    /// Readings strictly above the cutoff, in store order
    pub high_temperature: Vec<SensorReading>,
}

/// Healthy/unhealthy counts across the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub healthy: usize,
    pub unhealthy: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.healthy + self.unhealthy
    }

    /// Percentage of healthy readings, None for an empty store
    pub fn healthy_pct(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.healthy as f64 / total as f64 * 100.0),
        }
    }
}

/// One point of a stress-over-time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressPoint {
    #[serde(with = "minute_timestamp")]
    pub timestamp: NaiveDateTime,
    pub stress: f64,
}

/// Stress readings of one sensor ordered by time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSeries {
    pub sensor_id: String,
    pub points: Vec<StressPoint>,
}

/// Serde adapter for `YYYY-MM-DD HH:MM` timestamps
pub mod minute_timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading() -> SensorReading {
        SensorReading {
            sensor_id: "S1".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2025, 4, 28)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            temperature: 35.2,
            stress: 12.1,
            displacement: 0.002,
            health_score: 99.5,
            status: Status::Healthy,
            label_source: LabelSource::Seed,
        }
    }

    #[test]
    fn test_status_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Status::Healthy).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Status::Unhealthy).unwrap(), "0");
        assert_eq!(serde_json::from_str::<Status>("1").unwrap(), Status::Healthy);
        assert!(serde_json::from_str::<Status>("2").is_err());
    }

    #[test]
    fn test_reading_json_uses_minute_timestamp() {
        let json = serde_json::to_value(reading()).unwrap();
        assert_eq!(json["timestamp"], "2025-04-28 10:00");
        assert_eq!(json["status"], 1);
        assert_eq!(json["label_source"], "seed");
    }

    #[test]
    fn test_key_matching_is_exact() {
        let r = reading();
        let mut key = r.key();
        assert!(r.matches(&key));

        key.temperature = 35.2000001;
        assert!(!r.matches(&key));
    }

    #[test]
    fn test_status_counts_percentage() {
        let counts = StatusCounts {
            healthy: 3,
            unhealthy: 1,
        };
        assert_eq!(counts.total(), 4);
        assert!((counts.healthy_pct().unwrap() - 75.0).abs() < 1e-9);
        assert_eq!(StatusCounts::default().healthy_pct(), None);
    }
}
