//! Status classification
//!
//! A standardization transform followed by a random forest, predicting the
//! healthy/unhealthy status from (temperature, stress, displacement) alone.
//! The classifier is fitted once and has no mutating API afterwards.

mod forest;
mod tree;

pub use forest::RandomForest;
pub use tree::{DecisionTree, TreeParams, CLASSES};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ForestConfig;
use crate::error::MonitorError;
use crate::scaler::StandardScaler;
use crate::types::{Features, Status, StatusCounts};

/// Fewest labeled readings a classifier can be fitted on
pub const MIN_TRAINING_SAMPLES: usize = 2;

/// Diagnostic metadata about a fitted classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierInfo {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub trees: usize,
    pub training_samples: usize,
    pub class_counts: StatusCounts,
}

/// Fitted binary classifier over the three physical features
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    scaler: StandardScaler,
    forest: RandomForest,
    info: ClassifierInfo,
}

impl StatusClassifier {
    /// Fit on labeled features.
    ///
    /// Fails when there are fewer than [`MIN_TRAINING_SAMPLES`] readings or all
    /// labels are the same class.
    pub fn fit(
        features: &[Features],
        labels: &[Status],
        config: &ForestConfig,
    ) -> Result<Self, MonitorError> {
        if features.len() != labels.len() {
            return Err(MonitorError::InsufficientTrainingData(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if features.len() < MIN_TRAINING_SAMPLES {
            return Err(MonitorError::InsufficientTrainingData(format!(
                "need at least {} readings, got {}",
                MIN_TRAINING_SAMPLES,
                features.len()
            )));
        }

        let class_counts = labels.iter().fold(StatusCounts::default(), |mut c, s| {
            match s {
                Status::Healthy => c.healthy += 1,
                Status::Unhealthy => c.unhealthy += 1,
            }
            c
        });
        if class_counts.healthy == 0 || class_counts.unhealthy == 0 {
            return Err(MonitorError::SingleClassTraining {
                status: labels[0],
                samples: labels.len(),
            });
        }

        let raw: Vec<[f64; Features::COUNT]> = features.iter().map(Features::to_array).collect();
        let scaler = StandardScaler::fit(&raw);
        let scaled: Vec<[f64; Features::COUNT]> = raw.iter().map(|r| scaler.transform(r)).collect();
        let classes: Vec<usize> = labels.iter().map(Status::index).collect();

        let forest = RandomForest::fit(&scaled, &classes, config);

        let info = ClassifierInfo {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            trees: forest.len(),
            training_samples: features.len(),
            class_counts,
        };

        tracing::info!(
            model_id = %info.model_id,
            trees = info.trees,
            samples = info.training_samples,
            healthy = class_counts.healthy,
            unhealthy = class_counts.unhealthy,
            "status classifier trained"
        );

        Ok(Self {
            scaler,
            forest,
            info,
        })
    }

    /// Predict status from raw measurements
    pub fn predict(&self, temperature: f64, stress: f64, displacement: f64) -> Status {
        self.predict_features(&Features::new(temperature, stress, displacement))
    }

    pub fn predict_features(&self, features: &Features) -> Status {
        let scaled = self.scaler.transform(&features.to_array());
        Status::from_index(self.forest.predict(&scaled))
    }

    /// Probability of the healthy class
    pub fn healthy_probability(&self, features: &Features) -> f64 {
        let scaled = self.scaler.transform(&features.to_array());
        self.forest.predict_proba(&scaled)[Status::Healthy.index()]
    }

    pub fn info(&self) -> &ClassifierInfo {
        &self.info
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_set() -> (Vec<Features>, Vec<Status>) {
        let features = vec![
            Features::new(35.0, 12.0, 0.0020),
            Features::new(35.3, 12.2, 0.0021),
            Features::new(34.8, 11.9, 0.0019),
            Features::new(38.5, 15.0, 0.0032),
            Features::new(38.9, 15.4, 0.0035),
            Features::new(39.2, 15.1, 0.0033),
        ];
        let labels = vec![
            Status::Healthy,
            Status::Healthy,
            Status::Healthy,
            Status::Unhealthy,
            Status::Unhealthy,
            Status::Unhealthy,
        ];
        (features, labels)
    }

    #[test]
    fn test_tree_buildable_from_public_api() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let samples = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let params = TreeParams {
            max_depth: None,
            min_samples_split: 2,
            max_features: Features::COUNT,
        };
        let tree = DecisionTree::fit(
            &samples,
            &[0, 1],
            vec![0, 1],
            &params,
            &mut StdRng::seed_from_u64(7),
        );
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.predict_proba(&[1.0, 1.0, 1.0]), [0.0, 1.0]);
        assert_eq!(CLASSES, 2);
    }

    #[test]
    fn test_fit_and_predict() {
        let (features, labels) = training_set();
        let classifier =
            StatusClassifier::fit(&features, &labels, &ForestConfig::default()).unwrap();

        assert_eq!(classifier.predict(35.1, 12.1, 0.002), Status::Healthy);
        assert_eq!(classifier.predict(39.0, 15.2, 0.0034), Status::Unhealthy);
        assert!(classifier.healthy_probability(&Features::new(35.1, 12.1, 0.002)) > 0.5);

        let info = classifier.info();
        assert_eq!(info.trees, 100);
        assert_eq!(info.training_samples, 6);
        assert_eq!(info.class_counts.healthy, 3);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let (features, labels) = training_set();
        let config = ForestConfig::default();
        let a = StatusClassifier::fit(&features, &labels, &config).unwrap();
        let b = StatusClassifier::fit(&features, &labels, &config).unwrap();

        for t in [34.0, 36.0, 37.0, 40.0] {
            for s in [11.0, 13.5, 16.0] {
                let first = a.predict(t, s, 0.0025);
                assert_eq!(first, a.predict(t, s, 0.0025));
                assert_eq!(first, b.predict(t, s, 0.0025));
            }
        }
    }

    #[test]
    fn test_single_class_rejected() {
        let (features, _) = training_set();
        let labels = vec![Status::Healthy; features.len()];
        match StatusClassifier::fit(&features, &labels, &ForestConfig::default()) {
            Err(MonitorError::SingleClassTraining { status, samples }) => {
                assert_eq!(status, Status::Healthy);
                assert_eq!(samples, 6);
            }
            other => panic!("expected single-class error, got {other:?}"),
        }
    }

    #[test]
    fn test_too_small_rejected() {
        let features = vec![Features::new(35.0, 12.0, 0.002)];
        let labels = vec![Status::Healthy];
        assert!(matches!(
            StatusClassifier::fit(&features, &labels, &ForestConfig::default()),
            Err(MonitorError::InsufficientTrainingData(_))
        ));
        assert!(matches!(
            StatusClassifier::fit(&[], &[], &ForestConfig::default()),
            Err(MonitorError::InsufficientTrainingData(_))
        ));
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let (features, mut labels) = training_set();
        labels.pop();
        assert!(StatusClassifier::fit(&features, &labels, &ForestConfig::default()).is_err());
    }
}
