//! Random forest of CART trees
//!
//! Each tree is grown on a bootstrap sample with random feature subsets per
//! split. Prediction averages the trees' class probabilities; on an exact tie
//! the lower class (unhealthy) wins.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams, CLASSES};
use crate::config::ForestConfig;
use crate::types::Features;

/// Ensemble of fitted decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit on scaled samples and class indices. Deterministic for a given `config.seed`.
    pub fn fit(
        samples: &[[f64; Features::COUNT]],
        labels: &[usize],
        config: &ForestConfig,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            max_features: config.max_features.resolve(Features::COUNT),
        };

        let n = samples.len();
        let trees = (0..config.n_trees)
            .map(|_| {
                let indices: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(samples, labels, indices, &params, &mut rng)
            })
            .collect();

        Self { trees }
    }

    /// Mean class probabilities across trees
    pub fn predict_proba(&self, sample: &[f64; Features::COUNT]) -> [f64; CLASSES] {
        let mut total = [0.0; CLASSES];
        for tree in &self.trees {
            let proba = tree.predict_proba(sample);
            for (t, p) in total.iter_mut().zip(proba) {
                *t += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        total.map(|t| t / n)
    }

    /// Class index with the highest mean probability
    pub fn predict(&self, sample: &[f64; Features::COUNT]) -> usize {
        let proba = self.predict_proba(sample);
        if proba[1] > proba[0] {
            1
        } else {
            0
        }
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;

    fn separable() -> (Vec<[f64; 3]>, Vec<usize>) {
        let samples = vec![
            [-2.0, -1.5, -1.0],
            [-1.5, -1.0, -1.2],
            [-1.0, -2.0, -0.8],
            [1.0, 1.5, 1.1],
            [1.5, 1.0, 0.9],
            [2.0, 2.0, 1.3],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        (samples, labels)
    }

    fn config(n_trees: usize, seed: u64) -> ForestConfig {
        ForestConfig {
            n_trees,
            seed,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_builds_requested_trees() {
        let (samples, labels) = separable();
        let forest = RandomForest::fit(&samples, &labels, &config(25, 1));
        assert_eq!(forest.len(), 25);
        assert!(!forest.is_empty());
    }

    #[test]
    fn test_predicts_separated_clusters() {
        let (samples, labels) = separable();
        let forest = RandomForest::fit(&samples, &labels, &config(50, 42));

        assert_eq!(forest.predict(&[-3.0, -3.0, -3.0]), 0);
        assert_eq!(forest.predict(&[3.0, 3.0, 3.0]), 1);

        let proba = forest.predict_proba(&[3.0, 3.0, 3.0]);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (samples, labels) = separable();
        let a = RandomForest::fit(&samples, &labels, &config(20, 9));
        let b = RandomForest::fit(&samples, &labels, &config(20, 9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_without_bootstrap_fits_training_set() {
        let (samples, labels) = separable();
        let cfg = ForestConfig {
            n_trees: 5,
            bootstrap: false,
            max_features: MaxFeatures::All,
            ..ForestConfig::default()
        };
        let forest = RandomForest::fit(&samples, &labels, &cfg);
        for (sample, &label) in samples.iter().zip(&labels) {
            assert_eq!(forest.predict(sample), label);
        }
    }
}
