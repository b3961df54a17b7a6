//! Error types for the sensor health core

use thiserror::Error;

use crate::types::Status;

/// Errors that can occur while ingesting, training or querying
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Invalid timestamp '{value}': {reason} (expected YYYY-MM-DD HH:MM)")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Invalid {field}: '{value}' is not a finite number")]
    InvalidMeasurement { field: String, value: String },

    #[error("No rows selected")]
    EmptySelection,

    #[error("Insufficient training data: {0}")]
    InsufficientTrainingData(String),

    #[error("Training data is single-class: all {samples} readings are {status}")]
    SingleClassTraining { status: Status, samples: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl MonitorError {
    /// Stable machine-readable code for reporting across the shell boundary
    pub fn code(&self) -> &'static str {
        match self {
            MonitorError::InvalidTimestamp { .. } => "INVALID_TIMESTAMP",
            MonitorError::InvalidMeasurement { .. } => "INVALID_MEASUREMENT",
            MonitorError::EmptySelection => "EMPTY_SELECTION",
            MonitorError::InsufficientTrainingData(_) => "INSUFFICIENT_TRAINING_DATA",
            MonitorError::SingleClassTraining { .. } => "SINGLE_CLASS_TRAINING",
            MonitorError::InvalidConfig(_) => "INVALID_CONFIG",
            MonitorError::JsonError(_) => "JSON_ERROR",
        }
    }

    /// Whether the error came from user input rather than system state
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MonitorError::InvalidTimestamp { .. }
                | MonitorError::InvalidMeasurement { .. }
                | MonitorError::EmptySelection
        )
    }
}
