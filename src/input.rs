//! Boundary parsing
//!
//! The presentation shell hands over text fields exactly as the user typed
//! them. This module turns them into typed values and rejects anything
//! unparsable before it reaches scoring or the store.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MonitorError;
use crate::types::{Features, NewReading, ReadingKey, TIMESTAMP_FORMAT};

/// Raw text fields of an "add reading" form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingForm {
    pub sensor_id: String,
    pub timestamp: String,
    #[serde(deserialize_with = "text_field")]
    pub temperature: String,
    #[serde(deserialize_with = "text_field")]
    pub stress: String,
    #[serde(deserialize_with = "text_field")]
    pub displacement: String,
}

impl ReadingForm {
    /// Validate every field and produce a typed reading
    pub fn parse(&self) -> Result<NewReading, MonitorError> {
        let timestamp = parse_timestamp(&self.timestamp)?;
        let features = parse_features(&self.temperature, &self.stress, &self.displacement)?;

        Ok(NewReading {
            sensor_id: self.sensor_id.clone(),
            timestamp,
            features,
        })
    }
}

/// Raw text fields of a rendered row, used to build a delete selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSelection {
    pub sensor_id: String,
    pub timestamp: String,
    #[serde(deserialize_with = "text_field")]
    pub temperature: String,
}

impl RowSelection {
    pub fn parse(&self) -> Result<ReadingKey, MonitorError> {
        Ok(ReadingKey {
            sensor_id: self.sensor_id.clone(),
            timestamp: parse_timestamp(&self.timestamp)?,
            temperature: parse_measurement("temperature", &self.temperature)?,
        })
    }
}

/// Raw text fields of a "predict" or "score" form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementForm {
    #[serde(deserialize_with = "text_field")]
    pub temperature: String,
    #[serde(deserialize_with = "text_field")]
    pub stress: String,
    #[serde(deserialize_with = "text_field")]
    pub displacement: String,
}

impl MeasurementForm {
    pub fn parse(&self) -> Result<Features, MonitorError> {
        parse_features(&self.temperature, &self.stress, &self.displacement)
    }
}

/// Accept a measurement as JSON text or a JSON number; validation happens in `parse`
fn text_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(f64),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    })
}

/// Parse a `YYYY-MM-DD HH:MM` timestamp
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, MonitorError> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        MonitorError::InvalidTimestamp {
            value: text.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Parse a finite floating-point measurement, naming the field on failure
pub fn parse_measurement(field: &str, text: &str) -> Result<f64, MonitorError> {
    let invalid = || MonitorError::InvalidMeasurement {
        field: field.to_string(),
        value: text.to_string(),
    };

    let value: f64 = text.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

/// Parse the three classifier features
pub fn parse_features(
    temperature: &str,
    stress: &str,
    displacement: &str,
) -> Result<Features, MonitorError> {
    Ok(Features::new(
        parse_measurement("temperature", temperature)?,
        parse_measurement("stress", stress)?,
        parse_measurement("displacement", displacement)?,
    ))
}
