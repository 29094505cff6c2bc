// Stochastic model-backed strategy (the baseline bidder)

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::estimator::{LinearEstimator, ValueEstimator, batting_bowling_features};
use super::{BidContext, BiddingStrategy, raise};
use crate::item::Item;
use crate::types::Price;

/// Fraction of the estimate below which the strategy bids aggressively.
pub const AGGRESSIVE_FRACTION: f64 = 0.8;
pub const AGGRESSIVE_STEP: Price = 0.2;
pub const CONSERVATIVE_STEP: Price = 0.1;
/// Chance of nudging the price once it is past the aggressive zone.
pub const NUDGE_PROBABILITY: f64 = 0.3;

/// Values items with an injected estimator over
/// `[batting_avg, strike_rate, economy]`.
///
/// - current < 80% of estimate → +0.2
/// - current < estimate, with probability 0.3 → +0.1
/// - otherwise hold
///
/// Raises never pass the estimate or the agent's remaining budget.
pub struct LinearStrategy {
    estimator: Box<dyn ValueEstimator>,
    rng: StdRng,
}

impl LinearStrategy {
    pub fn new(estimator: Box<dyn ValueEstimator>, rng: StdRng) -> Self {
        Self { estimator, rng }
    }

    /// Default linear model with a seeded generator.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(
            Box::new(LinearEstimator::default()),
            StdRng::seed_from_u64(seed),
        )
    }

    /// Never below the floor price.
    pub fn estimate_value(&self, item: &Item) -> Price {
        self.estimator
            .estimate(&batting_bowling_features(item))
            .max(item.floor_price)
    }
}

impl BiddingStrategy for LinearStrategy {
    fn decide_bid(&mut self, item: &Item, ctx: &BidContext) -> Price {
        let estimate = self.estimate_value(item);
        let cap = estimate.min(ctx.remaining_budget);
        let current = ctx.current_price;

        if current < AGGRESSIVE_FRACTION * estimate {
            raise(current, AGGRESSIVE_STEP, cap)
        } else if current < estimate && self.rng.random::<f64>() < NUDGE_PROBABILITY {
            raise(current, CONSERVATIVE_STEP, cap)
        } else {
            current
        }
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}
