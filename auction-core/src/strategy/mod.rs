//! Bidding strategies.
//!
//! A strategy answers one question per call: given the item on the block and
//! the current price, what price would this agent move to? Returning anything
//! not strictly above the current price is a pass.
//!
//! Strategies estimate what an item is worth, but the estimate only caps how
//! high they go. Each accepted call moves the price by a bounded increment:
//! - current well below the cap → aggressive step
//! - current below the cap → small (possibly random) step
//! - otherwise → hold
//!
//! Stochastic strategies own a seeded [`StdRng`](rand::rngs::StdRng), so a
//! run is replayable from its seeds.

pub mod budgeted;
pub mod estimator;
pub mod fixed;
pub mod linear;
pub mod model;
pub mod statistical;

pub use budgeted::BudgetAwareStrategy;
pub use estimator::{LinearEstimator, ValueEstimator};
pub use fixed::FixedStepStrategy;
pub use linear::LinearStrategy;
pub use model::ModelBackedStrategy;
pub use statistical::{StatisticalStrategy, StrategyEvaluation};

use crate::item::Item;
use crate::types::{Price, round_price};

/// What an agent sees when asked to bid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidContext {
    pub current_price: Price,
    /// The bidding agent's own remaining budget
    pub remaining_budget: Price,
}

impl BidContext {
    pub fn new(current_price: Price, remaining_budget: Price) -> Self {
        Self {
            current_price,
            remaining_budget,
        }
    }
}

pub trait BiddingStrategy: Send {
    /// Propose a price for `item`. A value `<= ctx.current_price` passes.
    fn decide_bid(&mut self, item: &Item, ctx: &BidContext) -> Price;

    /// Called on the winner's strategy once an item settles.
    fn update_spent(&mut self, _item: &Item, _price: Price) {}

    fn name(&self) -> &'static str;
}

impl<S: BiddingStrategy + ?Sized> BiddingStrategy for Box<S> {
    fn decide_bid(&mut self, item: &Item, ctx: &BidContext) -> Price {
        (**self).decide_bid(item, ctx)
    }

    fn update_spent(&mut self, item: &Item, price: Price) {
        (**self).update_spent(item, price)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// `current + step`, quoted to two decimals and never above `cap`.
/// Falls back to `current` (a pass) when the cap leaves no room.
pub(crate) fn raise(current: Price, step: Price, cap: Price) -> Price {
    let proposed = round_price((current + step).min(cap));
    if proposed > current { proposed } else { current }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_is_capped_and_rounded() {
        assert_eq!(raise(1.0, 0.2, 10.0), 1.2);
        assert_eq!(raise(1.0, 0.2, 1.1), 1.1);
        assert_eq!(raise(1.0, 0.2, 1.0), 1.0);
        assert_eq!(raise(1.0, 0.2, 0.5), 1.0);
    }
}
