//! Status labeling
//!
//! Turns a health score into a binary status against a threshold:
//! healthy iff `health_score >= threshold`.

use crate::types::Status;

/// Default health threshold
pub const DEFAULT_THRESHOLD: f64 = 93.0;

/// Threshold labeler for ground-truth status
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusLabeler {
    threshold: f64,
}

impl Default for StatusLabeler {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl StatusLabeler {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Label a health score with this labeler's threshold
    pub fn label(&self, health_score: f64) -> Status {
        label(health_score, self.threshold)
    }
}

/// Label a health score against an explicit threshold
pub fn label(health_score: f64, threshold: f64) -> Status {
    if health_score >= threshold {
        Status::Healthy
    } else {
        Status::Unhealthy
    }
}
