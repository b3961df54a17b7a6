//! Pipeline orchestration
//!
//! This module provides the public API of the core. The training pipeline runs
//! once at startup; `SensorMonitor` then owns the reading store and the fitted
//! classifier and exposes the operations the presentation shell calls.

use crate::classifier::StatusClassifier;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::input::ReadingForm;
use crate::labeler::StatusLabeler;
use crate::scorer::HealthScorer;
use crate::seed::{default_seed, SeedReading};
use crate::store::ReadingStore;
use crate::types::{
    AddOutcome, Features, LabelSource, NewReading, ReadingKey, SensorReading, SensorSeries, Status,
    StatusCounts, StoreSummary,
};

/// Output of a training run: the fitted classifier and the labeled seed readings
#[derive(Debug)]
pub struct TrainedModel {
    pub classifier: StatusClassifier,
    pub readings: Vec<SensorReading>,
}

/// One-shot training from a labeled seed dataset.
///
/// Pipeline stages:
/// 1. Take the seed readings with their supplied health scores
/// 2. StatusLabeler - Derive status from each score
/// 3. StatusClassifier - Standardize features and fit the forest
pub struct TrainingPipeline {
    labeler: StatusLabeler,
    config: MonitorConfig,
}

impl TrainingPipeline {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            labeler: StatusLabeler::new(config.threshold),
            config,
        }
    }

    pub fn run(&self, seed: &[SeedReading]) -> Result<TrainedModel, MonitorError> {
        let readings: Vec<SensorReading> = seed
            .iter()
            .map(|s| SensorReading {
                sensor_id: s.sensor_id.clone(),
                timestamp: s.timestamp,
                temperature: s.features.temperature,
                stress: s.features.stress,
                displacement: s.features.displacement,
                health_score: s.health_score,
                status: self.labeler.label(s.health_score),
                label_source: LabelSource::Seed,
            })
            .collect();

        let features: Vec<Features> = readings.iter().map(SensorReading::features).collect();
        let labels: Vec<Status> = readings.iter().map(|r| r.status).collect();

        let classifier = StatusClassifier::fit(&features, &labels, &self.config.forest)?;

        Ok(TrainedModel {
            classifier,
            readings,
        })
    }
}

/// The core facade: reading store plus fitted classifier.
///
/// A concurrent host should put the whole monitor behind one mutex.
#[derive(Debug)]
pub struct SensorMonitor {
    store: ReadingStore,
    classifier: StatusClassifier,
    labeler: StatusLabeler,
    high_temperature_cutoff: f64,
}

impl SensorMonitor {
    /// Train on the built-in seed dataset and start with it in the store
    pub fn bootstrap(config: MonitorConfig) -> Result<Self, MonitorError> {
        Self::with_seed(config, &default_seed())
    }

    /// Train on a custom seed dataset and start with it in the store
    pub fn with_seed(config: MonitorConfig, seed: &[SeedReading]) -> Result<Self, MonitorError> {
        config.validate()?;
        let pipeline = TrainingPipeline::new(config.clone());
        let trained = pipeline.run(seed)?;

        Ok(Self {
            store: ReadingStore::from_readings(trained.readings),
            classifier: trained.classifier,
            labeler: StatusLabeler::new(config.threshold),
            high_temperature_cutoff: config.high_temperature_cutoff,
        })
    }

    /// Replace the store contents with a JSON snapshot. The classifier is untouched.
    pub fn load_snapshot(&mut self, json: &str) -> Result<usize, MonitorError> {
        self.store = ReadingStore::from_json(json)?;
        tracing::info!(readings = self.store.len(), "loaded reading snapshot");
        Ok(self.store.len())
    }

    /// Serialize the store to a JSON snapshot
    pub fn save_snapshot(&self) -> Result<String, MonitorError> {
        Ok(self.store.to_json()?)
    }

    /// Score, label and insert a reading; the labeler's status is stored and the
    /// classifier's prediction is reported alongside.
    pub fn add_reading(&mut self, reading: NewReading) -> AddOutcome {
        let health_score = HealthScorer::score_features(&reading.features);
        let status = self.labeler.label(health_score);
        let predicted_status = self.classifier.predict_features(&reading.features);

        tracing::debug!(
            sensor_id = %reading.sensor_id,
            timestamp = %reading.timestamp,
            health_score,
            status = %status,
            predicted = %predicted_status,
            "adding reading"
        );

        self.store.insert(SensorReading {
            sensor_id: reading.sensor_id,
            timestamp: reading.timestamp,
            temperature: reading.features.temperature,
            stress: reading.features.stress,
            displacement: reading.features.displacement,
            health_score,
            status,
            label_source: LabelSource::GroundTruth,
        });

        AddOutcome {
            health_score,
            status,
            predicted_status,
        }
    }

    /// Parse form text and add it; nothing is inserted on a parse error
    pub fn add_reading_form(&mut self, form: &ReadingForm) -> Result<AddOutcome, MonitorError> {
        let reading = form.parse()?;
        Ok(self.add_reading(reading))
    }

    /// Insert a reading labeled by the classifier instead of the threshold.
    ///
    /// The stored status may disagree with what the labeler would say for the
    /// computed health score.
    pub fn add_predicted(&mut self, reading: NewReading) -> Status {
        let health_score = HealthScorer::score_features(&reading.features);
        let status = self.classifier.predict_features(&reading.features);

        tracing::debug!(
            sensor_id = %reading.sensor_id,
            timestamp = %reading.timestamp,
            health_score,
            status = %status,
            "adding classifier-labeled reading"
        );

        self.store.insert(SensorReading {
            sensor_id: reading.sensor_id,
            timestamp: reading.timestamp,
            temperature: reading.features.temperature,
            stress: reading.features.stress,
            displacement: reading.features.displacement,
            health_score,
            status,
            label_source: LabelSource::Predicted,
        });

        status
    }

    /// Classifier prediction without touching the store
    pub fn predict_only(&self, features: &Features) -> Status {
        let status = self.classifier.predict_features(features);
        tracing::debug!(?features, status = %status, "prediction");
        status
    }

    /// Ground-truth score and status without touching the store
    pub fn score(&self, features: &Features) -> (f64, Status) {
        let health_score = HealthScorer::score_features(features);
        (health_score, self.labeler.label(health_score))
    }

    /// Delete every reading matching any selected key.
    ///
    /// An empty selection is reported as an error and changes nothing.
    pub fn delete(&mut self, selection: &[ReadingKey]) -> Result<usize, MonitorError> {
        if selection.is_empty() {
            return Err(MonitorError::EmptySelection);
        }

        let mut removed = 0;
        for key in selection {
            let n = self.store.delete_matching(key);
            if n == 0 {
                tracing::warn!(
                    sensor_id = %key.sensor_id,
                    timestamp = %key.timestamp,
                    temperature = key.temperature,
                    "selection matched no readings"
                );
            }
            removed += n;
        }

        tracing::debug!(selected = selection.len(), removed, "deleted readings");
        Ok(removed)
    }

    /// Readings of one sensor, or all readings for an empty id
    pub fn filter(&self, sensor_id: &str) -> Vec<SensorReading> {
        self.store.filter_by_sensor(sensor_id)
    }

    pub fn summary(&self) -> StoreSummary {
        self.store.summary_by_sensor(self.high_temperature_cutoff)
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.store.status_counts()
    }

    pub fn stress_series(&self) -> Vec<SensorSeries> {
        self.store.stress_series()
    }

    /// Full ordered contents for an external writer
    pub fn export_snapshot(&self) -> Vec<SensorReading> {
        self.store.snapshot()
    }

    pub fn store(&self) -> &ReadingStore {
        &self.store
    }

    pub fn classifier(&self) -> &StatusClassifier {
        &self.classifier
    }

    pub fn labeler(&self) -> &StatusLabeler {
        &self.labeler
    }
}
