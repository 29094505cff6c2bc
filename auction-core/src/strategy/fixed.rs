// Fixed valuation, fixed step

use super::{BidContext, BiddingStrategy};
use crate::item::Item;
use crate::types::Price;

type Valuation = Box<dyn Fn(&Item) -> Price + Send>;

/// Deterministic reference strategy: values each item at a fixed amount and
/// raises by a constant step while the raised price stays strictly below
/// both that value and the agent's remaining budget.
pub struct FixedStepStrategy {
    valuation: Valuation,
    step: Price,
}

impl FixedStepStrategy {
    pub fn new(valuation: Price, step: Price) -> Self {
        Self::with_valuation(move |_| valuation, step)
    }

    pub fn with_valuation(valuation: impl Fn(&Item) -> Price + Send + 'static, step: Price) -> Self {
        Self {
            valuation: Box::new(valuation),
            step,
        }
    }

    pub fn valuation(&self, item: &Item) -> Price {
        (self.valuation)(item)
    }
}

impl BiddingStrategy for FixedStepStrategy {
    fn decide_bid(&mut self, item: &Item, ctx: &BidContext) -> Price {
        let cap = self.valuation(item).min(ctx.remaining_budget);
        let next = ctx.current_price + self.step;
        if self.step > 0.0 && next < cap {
            next
        } else {
            ctx.current_price
        }
    }

    fn name(&self) -> &'static str {
        "fixed-step"
    }
}
