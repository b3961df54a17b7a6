//! Sensor Health - scoring, labeling and status classification for structural sensors
//!
//! Readings of temperature, stress and displacement are turned into a 0-100
//! health score, labeled healthy/unhealthy against a threshold, and kept in an
//! ordered in-memory store. A random-forest classifier trained once at startup
//! predicts the status from the raw measurements alone.
//!
//! ## Modules
//!
//! - **Scoring**: `scorer` (health score) and `labeler` (threshold status)
//! - **Storage**: `store` (ordered readings, filters, summaries)
//! - **Learning**: `scaler`, `classifier` and the training pipeline in `pipeline`
//! - **Boundary**: `input` (text parsing) and `session` (request/response protocol)

pub mod classifier;
pub mod config;
pub mod error;
pub mod input;
pub mod labeler;
pub mod pipeline;
pub mod scaler;
pub mod scorer;
pub mod seed;
pub mod session;
pub mod store;
pub mod types;

pub use classifier::{ClassifierInfo, StatusClassifier};
pub use config::{ForestConfig, MonitorConfig};
pub use error::MonitorError;
pub use labeler::StatusLabeler;
pub use pipeline::{SensorMonitor, TrainingPipeline};
pub use scorer::HealthScorer;
pub use session::{Request, Response};
pub use store::ReadingStore;
pub use types::{Features, ReadingKey, SensorReading, Status};

/// Crate version reported by diagnostics
pub const MONITOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by diagnostics
pub const PRODUCER_NAME: &str = "sensor-health";
