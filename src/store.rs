//! Reading store
//!
//! An ordered, in-memory collection of sensor readings. Insertion order is
//! preserved for display. There is no deduplication: several readings may share
//! an identity key, and deleting that key removes all of them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{
    ReadingKey, SensorReading, SensorSeries, SensorSummary, StatSummary, Status, StatusCounts,
    StoreSummary, StressPoint,
};

/// Default cutoff for the high-temperature listing (°C)
pub const DEFAULT_HIGH_TEMPERATURE_CUTOFF: f64 = 36.0;

/// Ordered collection of sensor readings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingStore {
    readings: Vec<SensorReading>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_readings(readings: Vec<SensorReading>) -> Self {
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Append a reading at the end
    pub fn insert(&mut self, reading: SensorReading) {
        self.readings.push(reading);
    }

    /// Remove every reading whose identity key equals `key`, returning how many were removed
    pub fn delete_matching(&mut self, key: &ReadingKey) -> usize {
        let before = self.readings.len();
        self.readings.retain(|r| !r.matches(key));
        before - self.readings.len()
    }

    /// Readings of one sensor in store order; an empty id returns everything
    pub fn filter_by_sensor(&self, sensor_id: &str) -> Vec<SensorReading> {
        if sensor_id.is_empty() {
            return self.snapshot();
        }
        self.readings
            .iter()
            .filter(|r| r.sensor_id == sensor_id)
            .cloned()
            .collect()
    }

    /// Full ordered contents
    pub fn snapshot(&self) -> Vec<SensorReading> {
        self.readings.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorReading> {
        self.readings.iter()
    }

    /// Per-sensor statistics, highest mean stress and high-temperature readings
    pub fn summary_by_sensor(&self, high_temperature_cutoff: f64) -> StoreSummary {
        let sensors: Vec<SensorSummary> = self
            .group_by_sensor()
            .into_iter()
            .map(|(sensor_id, group)| SensorSummary {
                sensor_id: sensor_id.to_string(),
                readings: group.len(),
                temperature: stat_summary(group.iter().map(|r| r.temperature)),
                stress: stat_summary(group.iter().map(|r| r.stress)),
                displacement: stat_summary(group.iter().map(|r| r.displacement)),
            })
            .collect();

        // Strict comparison keeps the first sensor on ties
        let mut highest: Option<&SensorSummary> = None;
        for summary in &sensors {
            match highest {
                Some(best) if summary.stress.mean <= best.stress.mean => {}
                _ => highest = Some(summary),
            }
        }
        let highest_mean_stress = highest.map(|s| s.sensor_id.clone());

        let high_temperature = self
            .readings
            .iter()
            .filter(|r| r.temperature > high_temperature_cutoff)
            .cloned()
            .collect();

        StoreSummary {
            sensors,
            highest_mean_stress,
            high_temperature_cutoff,
            high_temperature,
        }
    }

    /// Healthy vs unhealthy counts
    pub fn status_counts(&self) -> StatusCounts {
        self.readings
            .iter()
            .fold(StatusCounts::default(), |mut counts, r| {
                match r.status {
                    Status::Healthy => counts.healthy += 1,
                    Status::Unhealthy => counts.unhealthy += 1,
                }
                counts
            })
    }

    /// Stress over time, one series per sensor
    pub fn stress_series(&self) -> Vec<SensorSeries> {
        self.group_by_sensor()
            .into_iter()
            .map(|(sensor_id, group)| {
                let mut points: Vec<StressPoint> = group
                    .iter()
                    .map(|r| StressPoint {
                        timestamp: r.timestamp,
                        stress: r.stress,
                    })
                    .collect();
                // Stable sort keeps insertion order for equal timestamps
                points.sort_by_key(|p| p.timestamp);
                SensorSeries {
                    sensor_id: sensor_id.to_string(),
                    points,
                }
            })
            .collect()
    }

    /// Load a store from a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the store to a JSON snapshot
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    fn group_by_sensor(&self) -> BTreeMap<&str, Vec<&SensorReading>> {
        let mut groups: BTreeMap<&str, Vec<&SensorReading>> = BTreeMap::new();
        for reading in &self.readings {
            groups.entry(reading.sensor_id.as_str()).or_default().push(reading);
        }
        groups
    }
}

fn stat_summary(values: impl Iterator<Item = f64>) -> StatSummary {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for value in values {
        count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }

    StatSummary {
        mean: if count > 0 { sum / count as f64 } else { f64::NAN },
        min,
        max,
    }
}
