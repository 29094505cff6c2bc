//! Statistical bidding with a per-role budget split.
//!
//! The total budget is split across categories in proportion to a target
//! roster (4 batsmen, 4 bowlers, 2 all-rounders, 1 keeper by default). Each
//! item is priced from its role's headline stats, and the strategy never
//! commits more to a role than that role's share.
//!
//! Fair price = `floor + adjustment + star_factor`, never below the floor:
//! - batsman/keeper: `(bat_avg - 30)/10 + (strike_rate - 120)/50`
//! - bowler: `(30 - bowl_avg)/10 + (8 - economy)/2`
//! - all-rounder: mean of the batting (baseline 25) and bowling terms
//! - star factor: `(stars - 5) * 0.2`

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::linear::{AGGRESSIVE_FRACTION, AGGRESSIVE_STEP, CONSERVATIVE_STEP, NUDGE_PROBABILITY};
use super::{BidContext, BiddingStrategy, raise};
use crate::item::Item;
use crate::types::{Category, Price};

/// Premium per star above the benchmark rating of 5.
pub const STAR_PREMIUM: Price = 0.2;

pub fn default_roster_requirements() -> BTreeMap<Category, u32> {
    BTreeMap::from([
        (Category::Batsman, 4),
        (Category::Bowler, 4),
        (Category::AllRounder, 2),
        (Category::WicketKeeper, 1),
    ])
}

/// How well a roster's spend translated into predicted value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyEvaluation {
    pub total_predicted_value: Price,
    pub total_spent: Price,
    pub category_spent: BTreeMap<Category, Price>,
    /// predicted value / spent; 0 when nothing was spent
    pub efficiency: f64,
}

pub struct StatisticalStrategy {
    total_budget: Price,
    category_budget: BTreeMap<Category, Price>,
    spent: BTreeMap<Category, Price>,
    rng: StdRng,
}

impl StatisticalStrategy {
    pub fn new(total_budget: Price, rng: StdRng) -> Self {
        Self::with_requirements(total_budget, &default_roster_requirements(), rng)
    }

    pub fn with_seed(total_budget: Price, seed: u64) -> Self {
        Self::new(total_budget, StdRng::seed_from_u64(seed))
    }

    /// Split `total_budget` in proportion to the per-category headcount.
    pub fn with_requirements(
        total_budget: Price,
        requirements: &BTreeMap<Category, u32>,
        rng: StdRng,
    ) -> Self {
        let headcount: u32 = requirements.values().sum();
        let category_budget = requirements
            .iter()
            .map(|(&category, &count)| {
                let share = if headcount > 0 {
                    total_budget * count as f64 / headcount as f64
                } else {
                    0.0
                };
                (category, share)
            })
            .collect();
        let spent = requirements.keys().map(|&c| (c, 0.0)).collect();

        Self {
            total_budget,
            category_budget,
            spent,
            rng,
        }
    }

    pub fn category_budget(&self, category: Category) -> Price {
        // Roles outside the target roster draw on the whole budget
        self.category_budget
            .get(&category)
            .copied()
            .unwrap_or(self.total_budget)
    }

    pub fn spent(&self, category: Category) -> Price {
        self.spent.get(&category).copied().unwrap_or(0.0)
    }

    pub fn predict_price(&self, item: &Item) -> Price {
        let stats = &item.stats;
        let stars = stats.get_or("stars", 5.0);

        let adjustment = match item.category {
            Category::Batsman | Category::WicketKeeper => {
                batting_adjustment(stats.get_or("batting_avg", 30.0), stats.get_or("strike_rate", 120.0), 30.0)
            }
            Category::Bowler => {
                bowling_adjustment(stats.get_or("bowling_avg", 30.0), stats.get_or("economy", 8.0))
            }
            Category::AllRounder => {
                let batting = batting_adjustment(
                    stats.get_or("batting_avg", 25.0),
                    stats.get_or("strike_rate", 120.0),
                    25.0,
                );
                let bowling =
                    bowling_adjustment(stats.get_or("bowling_avg", 30.0), stats.get_or("economy", 8.0));
                (batting + bowling) / 2.0
            }
        };

        let star_factor = (stars - 5.0) * STAR_PREMIUM;
        (item.floor_price + adjustment + star_factor).max(item.floor_price)
    }

    /// The most this strategy will pay: the fair price, limited by what is
    /// left of the item's category share.
    pub fn allowed_bid(&self, item: &Item) -> Price {
        let remaining = self.category_budget(item.category) - self.spent(item.category);
        self.predict_price(item).min(remaining)
    }

    pub fn evaluate<'a>(&self, acquired: impl IntoIterator<Item = (&'a Item, Price)>) -> StrategyEvaluation {
        let mut eval = StrategyEvaluation::default();
        for (item, price) in acquired {
            eval.total_predicted_value += self.predict_price(item);
            eval.total_spent += price;
            *eval.category_spent.entry(item.category).or_insert(0.0) += price;
        }
        eval.efficiency = if eval.total_spent > 0.0 {
            eval.total_predicted_value / eval.total_spent
        } else {
            0.0
        };
        eval
    }
}

fn batting_adjustment(bat_avg: f64, strike_rate: f64, baseline_avg: f64) -> f64 {
    (bat_avg - baseline_avg) / 10.0 + (strike_rate - 120.0) / 50.0
}

fn bowling_adjustment(bowl_avg: f64, economy: f64) -> f64 {
    (30.0 - bowl_avg) / 10.0 + (8.0 - economy) / 2.0
}

impl BiddingStrategy for StatisticalStrategy {
    fn decide_bid(&mut self, item: &Item, ctx: &BidContext) -> Price {
        let allowed = self.allowed_bid(item);
        let cap = allowed.min(ctx.remaining_budget);
        let current = ctx.current_price;

        if current < AGGRESSIVE_FRACTION * allowed {
            raise(current, AGGRESSIVE_STEP, cap)
        } else if current < allowed && self.rng.random::<f64>() < NUDGE_PROBABILITY {
            raise(current, CONSERVATIVE_STEP, cap)
        } else {
            current
        }
    }

    fn update_spent(&mut self, item: &Item, price: Price) {
        *self.spent.entry(item.category).or_insert(0.0) += price;
    }

    fn name(&self) -> &'static str {
        "statistical"
    }
}
