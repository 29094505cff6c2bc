// Budget-aware model-backed strategy with randomized steps

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::estimator::{LinearEstimator, ValueEstimator, normalized_features};
use super::{BidContext, BiddingStrategy, raise};
use crate::item::Item;
use crate::types::Price;

/// Below this fraction of the ceiling the strategy takes large steps.
const EARLY_FRACTION: f64 = 0.7;

/// Tracks its own total spend and bids against
/// `min(estimate, total_budget - spent)`.
///
/// Each estimate is scaled by a random market factor in `[0.9, 1.1)`.
/// Steps are drawn from `[0.2, 0.5)` early and `[0.05, 0.2)` near the ceiling.
pub struct BudgetAwareStrategy {
    estimator: Box<dyn ValueEstimator>,
    total_budget: Price,
    spent: Price,
    rng: StdRng,
}

impl BudgetAwareStrategy {
    pub fn new(estimator: Box<dyn ValueEstimator>, total_budget: Price, rng: StdRng) -> Self {
        Self {
            estimator,
            total_budget,
            spent: 0.0,
            rng,
        }
    }

    pub fn with_seed(total_budget: Price, seed: u64) -> Self {
        Self::new(
            Box::new(Self::default_estimator()),
            total_budget,
            StdRng::seed_from_u64(seed),
        )
    }

    /// Weights over the normalized feature vector: batting dominates, then
    /// strike rate, then economy.
    pub fn default_estimator() -> LinearEstimator {
        LinearEstimator::new(vec![8.0, 5.0, 3.0, 0.0, 0.0], 1.0)
    }

    pub fn spent(&self) -> Price {
        self.spent
    }

    pub fn remaining(&self) -> Price {
        self.total_budget - self.spent
    }

    /// Draws the market factor, so successive calls differ.
    pub fn estimate_value(&mut self, item: &Item) -> Price {
        let base = self.estimator.estimate(&normalized_features(item));
        let market_factor = self.rng.random_range(0.9..1.1);
        (base * market_factor).max(item.floor_price)
    }
}

impl BiddingStrategy for BudgetAwareStrategy {
    fn decide_bid(&mut self, item: &Item, ctx: &BidContext) -> Price {
        let estimate = self.estimate_value(item);
        let max_allowed = estimate.min(self.remaining());
        let cap = max_allowed.min(ctx.remaining_budget);
        let current = ctx.current_price;

        if current < EARLY_FRACTION * max_allowed {
            let step = self.rng.random_range(0.2..0.5);
            raise(current, step, cap)
        } else if current < max_allowed {
            let step = self.rng.random_range(0.05..0.2);
            raise(current, step, cap)
        } else {
            current
        }
    }

    fn update_spent(&mut self, _item: &Item, price: Price) {
        self.spent += price;
    }

    fn name(&self) -> &'static str {
        "budget-aware"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn early_steps_are_large_and_bounded() {
        let mut s = BudgetAwareStrategy::new(Box::new(|_: &[f64]| 10.0), 40.0, StdRng::seed_from_u64(5));
        let item = Item::new("Opener", Category::Batsman, 1.0);
        for _ in 0..50 {
            let bid = s.decide_bid(&item, &BidContext::new(1.0, 40.0));
            assert!((1.2..=1.5).contains(&bid), "bid {bid}");
        }
    }

    #[test]
    fn spending_lowers_the_ceiling() {
        let mut s = BudgetAwareStrategy::new(Box::new(|_: &[f64]| 10.0), 5.0, StdRng::seed_from_u64(5));
        let item = Item::new("Opener", Category::Batsman, 1.0);
        s.update_spent(&item, 4.0);
        assert_eq!(s.remaining(), 1.0);
        // ceiling is 1.0 now, nothing left to raise into
        assert_eq!(s.decide_bid(&item, &BidContext::new(1.0, 40.0)), 1.0);
    }

    #[test]
    fn market_factor_stays_within_ten_percent() {
        let mut s = BudgetAwareStrategy::new(Box::new(|_: &[f64]| 10.0), 40.0, StdRng::seed_from_u64(2));
        let item = Item::new("Opener", Category::Batsman, 1.0);
        for _ in 0..100 {
            let v = s.estimate_value(&item);
            assert!((9.0..11.0).contains(&v), "estimate {v}");
        }
    }

    #[test]
    fn seeded_runs_repeat() {
        let item = Item::new("Opener", Category::Batsman, 1.0);
        let bids = |seed| {
            let mut s = BudgetAwareStrategy::with_seed(40.0, seed);
            (0..20)
                .map(|i| s.decide_bid(&item, &BidContext::new(1.0 + i as f64 * 0.3, 40.0)))
                .collect::<Vec<_>>()
        };
        assert_eq!(bids(3), bids(3));
    }
}
