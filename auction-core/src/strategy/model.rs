// Deterministic model-backed strategy

use super::estimator::{ValueEstimator, batting_bowling_features};
use super::linear::{AGGRESSIVE_FRACTION, AGGRESSIVE_STEP, CONSERVATIVE_STEP};
use super::{BidContext, BiddingStrategy, raise};
use crate::item::Item;
use crate::types::Price;

/// Like [`LinearStrategy`](super::LinearStrategy) without the coin flip:
/// below 80% of the estimate it steps by 0.2, below the estimate by 0.1,
/// and holds at or above it. Suited to pre-trained regressors.
pub struct ModelBackedStrategy {
    estimator: Box<dyn ValueEstimator>,
}

impl ModelBackedStrategy {
    pub fn new(estimator: Box<dyn ValueEstimator>) -> Self {
        Self { estimator }
    }

    pub fn estimate_value(&self, item: &Item) -> Price {
        self.estimator
            .estimate(&batting_bowling_features(item))
            .max(item.floor_price)
    }
}

impl BiddingStrategy for ModelBackedStrategy {
    fn decide_bid(&mut self, item: &Item, ctx: &BidContext) -> Price {
        let estimate = self.estimate_value(item);
        let cap = estimate.min(ctx.remaining_budget);
        let current = ctx.current_price;

        if current < AGGRESSIVE_FRACTION * estimate {
            raise(current, AGGRESSIVE_STEP, cap)
        } else if current < estimate {
            raise(current, CONSERVATIVE_STEP, cap)
        } else {
            current
        }
    }

    fn name(&self) -> &'static str {
        "model"
    }
}
