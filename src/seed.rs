//! Built-in seed dataset
//!
//! The seed health scores are externally supplied ground truth and are not
//! recomputed with the scoring formula.

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::Features;

/// A seed reading before labeling
#[derive(Debug, Clone, PartialEq)]
pub struct SeedReading {
    pub sensor_id: String,
    pub timestamp: NaiveDateTime,
    pub features: Features,
    pub health_score: f64,
}

impl SeedReading {
    pub fn new(
        sensor_id: &str,
        timestamp: NaiveDateTime,
        features: Features,
        health_score: f64,
    ) -> Self {
        Self {
            sensor_id: sensor_id.to_string(),
            timestamp,
            features,
            health_score,
        }
    }
}

// (sensor, hour, temperature, stress, displacement, health score), all on 2025-04-28
const SEED_ROWS: [(&str, u32, f64, f64, f64, f64); 6] = [
    ("S1", 10, 35.2, 12.1, 0.002, 99.5),
    ("S2", 10, 36.5, 14.0, 0.003, 92.5),
    ("S1", 11, 36.1, 12.5, 0.0021, 97.17),
    ("S3", 10, 34.0, 11.8, 0.0025, 97.17),
    ("S2", 11, 37.2, 14.3, 0.0031, 90.67),
    ("S1", 12, 37.0, 13.0, 0.0022, 94.67),
];

/// The fixed startup dataset
pub fn default_seed() -> Vec<SeedReading> {
    SEED_ROWS
        .iter()
        .filter_map(|&(sensor, hour, temperature, stress, displacement, score)| {
            let timestamp = NaiveDate::from_ymd_opt(2025, 4, 28)?.and_hms_opt(hour, 0, 0)?;
            Some(SeedReading::new(
                sensor,
                timestamp,
                Features::new(temperature, stress, displacement),
                score,
            ))
        })
        .collect()
}
