//! Feature standardization
//!
//! Zero-mean, unit-variance transform fitted on the training set and applied
//! unchanged at prediction time.

use serde::{Deserialize, Serialize};

use crate::types::Features;

/// Per-feature mean and standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: [f64; Features::COUNT],
    scales: [f64; Features::COUNT],
}

impl StandardScaler {
    /// Fit on a non-empty sample set.
    ///
    /// Uses the population standard deviation. A constant feature gets a scale
    /// of 1 so it maps to 0 instead of dividing by zero.
    pub fn fit(samples: &[[f64; Features::COUNT]]) -> Self {
        let n = samples.len().max(1) as f64;
        let mut means = [0.0; Features::COUNT];
        let mut scales = [1.0; Features::COUNT];

        for j in 0..Features::COUNT {
            let mean = samples.iter().map(|s| s[j]).sum::<f64>() / n;
            let variance = samples.iter().map(|s| (s[j] - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();

            means[j] = mean;
            if std > 0.0 {
                scales[j] = std;
            }
        }

        Self { means, scales }
    }

    pub fn transform(&self, sample: &[f64; Features::COUNT]) -> [f64; Features::COUNT] {
        let mut out = [0.0; Features::COUNT];
        for j in 0..Features::COUNT {
            out[j] = (sample[j] - self.means[j]) / self.scales[j];
        }
        out
    }

    pub fn means(&self) -> &[f64; Features::COUNT] {
        &self.means
    }

    pub fn scales(&self) -> &[f64; Features::COUNT] {
        &self.scales
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_transform_zero_mean_unit_variance() {
        let samples = [[1.0, 10.0, 0.001], [2.0, 20.0, 0.002], [3.0, 30.0, 0.003]];
        let scaler = StandardScaler::fit(&samples);

        let transformed: Vec<_> = samples.iter().map(|s| scaler.transform(s)).collect();
        for j in 0..Features::COUNT {
            let mean: f64 = transformed.iter().map(|t| t[j]).sum::<f64>() / 3.0;
            let var: f64 = transformed.iter().map(|t| t[j].powi(2)).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-9);
            assert!((var - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_feature_maps_to_zero() {
        let samples = [[5.0, 1.0, 0.0], [5.0, 2.0, 0.0]];
        let scaler = StandardScaler::fit(&samples);
        assert_eq!(scaler.scales()[0], 1.0);
        assert_eq!(scaler.transform(&[5.0, 1.5, 0.0]), [0.0, 0.0, 0.0]);
    }
}
