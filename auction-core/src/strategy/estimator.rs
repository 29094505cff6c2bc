// Opaque value estimators used by model-backed strategies

use crate::item::Item;

/// Scalar-valued model over an item's feature vector.
///
/// Strategies never see the concrete model type; anything that maps a
/// feature slice to a value can be plugged in, including closures.
pub trait ValueEstimator: Send + Sync {
    fn estimate(&self, features: &[f64]) -> f64;
}

impl<F> ValueEstimator for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn estimate(&self, features: &[f64]) -> f64 {
        self(features)
    }
}

/// `intercept + Σ coefficient·feature`. Extra features (or coefficients)
/// beyond the shorter of the two are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearEstimator {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearEstimator {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl Default for LinearEstimator {
    /// Weights over `[batting_avg, strike_rate, economy]`.
    fn default() -> Self {
        Self::new(vec![0.1, 0.05, 0.2], 1.0)
    }
}

impl ValueEstimator for LinearEstimator {
    fn estimate(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

// === FEATURE EXTRACTION ===

/// `[batting_avg, strike_rate, economy]` with neutral defaults for
/// attributes the item's category doesn't carry.
pub fn batting_bowling_features(item: &Item) -> [f64; 3] {
    [
        item.stats.get_or("batting_avg", 20.0),
        item.stats.get_or("strike_rate", 120.0),
        item.stats.get_or("economy", 8.0),
    ]
}

/// Scaled features for budget-aware models, each roughly in `[0, 1]`.
pub fn normalized_features(item: &Item) -> [f64; 5] {
    [
        item.stats.get_or("batting_avg", 20.0) / 50.0,
        item.stats.get_or("strike_rate", 120.0) / 200.0,
        item.stats.get_or("economy", 8.0) / 15.0,
        item.stats.get_or("stars", 5.0) / 10.0,
        (item.floor_price / 5.0).clamp(0.0, 1.0),
    ]
}
