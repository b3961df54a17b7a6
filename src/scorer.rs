//! Health scoring
//!
//! Maps raw measurements to a 0-100 composite score. Each measurement gets a
//! sub-score that falls off linearly with distance from its nominal operating
//! point and is floored at 0; the result is the mean of the three sub-scores
//! rounded to two decimals.
//!
//! Displacement is penalized 1000x more steeply than temperature and stress
//! because its nominal magnitude is three orders smaller.

use crate::types::Features;

/// Nominal operating temperature (°C)
pub const NOMINAL_TEMPERATURE: f64 = 35.0;
/// Nominal stress (MPa)
pub const NOMINAL_STRESS: f64 = 12.0;
/// Nominal displacement (m)
pub const NOMINAL_DISPLACEMENT: f64 = 0.002;

const TEMPERATURE_PENALTY: f64 = 5.0;
const STRESS_PENALTY: f64 = 5.0;
const DISPLACEMENT_PENALTY: f64 = 5000.0;

/// Fixed, hand-tuned health scorer
pub struct HealthScorer;

impl HealthScorer {
    /// Composite health score for a set of measurements
    pub fn score(temperature: f64, stress: f64, displacement: f64) -> f64 {
        let temp_score = sub_score(temperature, NOMINAL_TEMPERATURE, TEMPERATURE_PENALTY);
        let stress_score = sub_score(stress, NOMINAL_STRESS, STRESS_PENALTY);
        let disp_score = sub_score(displacement, NOMINAL_DISPLACEMENT, DISPLACEMENT_PENALTY);

        round2((temp_score + stress_score + disp_score) / 3.0)
    }

    pub fn score_features(features: &Features) -> f64 {
        Self::score(features.temperature, features.stress, features.displacement)
    }
}

/// NaN input yields a NaN sub-score
fn sub_score(value: f64, nominal: f64, penalty: f64) -> f64 {
    if value.is_nan() {
        return f64::NAN;
    }
    (100.0 - (value - nominal).abs() * penalty).max(0.0)
}

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_is_perfect() {
        assert_eq!(HealthScorer::score(35.0, 12.0, 0.002), 100.0);
    }

    #[test]
    fn test_matches_seed_reading() {
        // (90 + 95 + 99) / 3
        assert_eq!(HealthScorer::score(37.0, 13.0, 0.0022), 94.67);
    }

    #[test]
    fn test_symmetric_in_deviation_sign() {
        let above = HealthScorer::score(37.0, 14.0, 0.0025);
        let below = HealthScorer::score(33.0, 10.0, 0.0015);
        assert!((above - below).abs() < 1e-9);
    }

    #[test]
    fn test_sub_scores_floor_at_zero() {
        // Every sub-score saturates at 0
        assert_eq!(HealthScorer::score(100.0, -50.0, 1.0), 0.0);
        // Only temperature saturates
        assert_eq!(HealthScorer::score(80.0, 12.0, 0.002), round2(200.0 / 3.0));
    }

    #[test]
    fn test_nan_measurement_gives_nan_score() {
        assert!(HealthScorer::score(f64::NAN, 12.0, 0.002).is_nan());
        assert!(HealthScorer::score(35.0, 12.0, f64::NAN).is_nan());
        // Infinitely far from nominal is simply a saturated sub-score
        assert_eq!(HealthScorer::score(f64::INFINITY, 12.0, 0.002), round2(200.0 / 3.0));
    }

    #[test]
    fn test_displacement_sensitivity() {
        // 0.001 m off nominal costs 5 points, same as 1 °C
        let disp = HealthScorer::score(35.0, 12.0, 0.003);
        let temp = HealthScorer::score(36.0, 12.0, 0.002);
        assert_eq!(disp, temp);
        assert_eq!(disp, 98.33);
    }

    #[test]
    fn test_range_over_plausible_inputs() {
        for t in [20.0, 30.0, 35.0, 40.0, 60.0] {
            for s in [0.0, 8.0, 12.0, 20.0, 40.0] {
                for d in [0.0, 0.001, 0.002, 0.01, 0.05] {
                    let score = HealthScorer::score(t, s, d);
                    assert!((0.0..=100.0).contains(&score), "score {score} out of range");
                    assert_eq!(score, HealthScorer::score(t, s, d));
                }
            }
        }
    }

    #[test]
    fn test_score_features() {
        let f = Features::new(37.0, 13.0, 0.0022);
        assert_eq!(HealthScorer::score_features(&f), 94.67);
    }
}
