// Run configuration: agents, their strategies and the auction's knobs

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::auction::{Allocation, Auction};
use crate::error::{AuctionError, AuctionResult};
use crate::item::Catalog;
use crate::order::{CatalogOrder, ItemOrder, SeededShuffle};
use crate::strategy::{
    BiddingStrategy, BudgetAwareStrategy, FixedStepStrategy, LinearEstimator, LinearStrategy,
    ModelBackedStrategy, StatisticalStrategy,
};
use crate::types::{AgentId, Category, Price};

/// Upper bound on bidding passes per item before the run is aborted.
pub const DEFAULT_MAX_PASSES: usize = 10_000;

/// Budget per team in the reference set-up (crore).
pub const DEFAULT_BUDGET: Price = 40.0;

/// Roster size per team in the reference set-up.
pub const DEFAULT_CAPACITY: usize = 11;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionConfig {
    pub max_passes: usize,
    /// Shuffle seed for the item order; `None` keeps catalog order
    pub order_seed: Option<u64>,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            order_seed: None,
        }
    }
}

impl AuctionConfig {
    pub fn item_order(&self) -> Box<dyn ItemOrder> {
        match self.order_seed {
            Some(seed) => Box::new(SeededShuffle::new(seed)),
            None => Box::new(CatalogOrder),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    FixedStep {
        valuation: Price,
        step: Price,
    },
    Linear {
        seed: u64,
        #[serde(default)]
        model: Option<LinearModel>,
    },
    ModelBacked {
        #[serde(default)]
        model: Option<LinearModel>,
    },
    Statistical {
        seed: u64,
        #[serde(default)]
        requirements: Option<BTreeMap<Category, u32>>,
    },
    BudgetAware {
        seed: u64,
        #[serde(default)]
        model: Option<LinearModel>,
    },
}

/// Linear weights handed to model-backed strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl From<&LinearModel> for LinearEstimator {
    fn from(model: &LinearModel) -> Self {
        LinearEstimator::new(model.coefficients.clone(), model.intercept)
    }
}

impl StrategyConfig {
    /// `budget` is the owning agent's starting budget, which budget-tracking
    /// strategies partition.
    pub fn build(&self, agent: &str, budget: Price) -> AuctionResult<Box<dyn BiddingStrategy>> {
        let invalid = |reason: &str| AuctionError::InvalidStrategy {
            agent: agent.to_string(),
            reason: reason.to_string(),
        };

        let strategy: Box<dyn BiddingStrategy> = match self {
            StrategyConfig::FixedStep { valuation, step } => {
                if !(step.is_finite() && *step > 0.0) {
                    return Err(invalid("step must be positive"));
                }
                Box::new(FixedStepStrategy::new(*valuation, *step))
            }
            StrategyConfig::Linear { seed, model } => {
                let estimator = model.as_ref().map(LinearEstimator::from).unwrap_or_default();
                Box::new(LinearStrategy::new(
                    Box::new(estimator),
                    StdRng::seed_from_u64(*seed),
                ))
            }
            StrategyConfig::ModelBacked { model } => {
                let estimator = model.as_ref().map(LinearEstimator::from).unwrap_or_default();
                Box::new(ModelBackedStrategy::new(Box::new(estimator)))
            }
            StrategyConfig::Statistical { seed, requirements } => {
                let rng = StdRng::seed_from_u64(*seed);
                match requirements {
                    Some(reqs) if reqs.values().sum::<u32>() == 0 => {
                        return Err(invalid("roster requirements must name at least one slot"));
                    }
                    Some(reqs) => Box::new(StatisticalStrategy::with_requirements(budget, reqs, rng)),
                    None => Box::new(StatisticalStrategy::new(budget, rng)),
                }
            }
            StrategyConfig::BudgetAware { seed, model } => {
                let estimator = model
                    .as_ref()
                    .map(LinearEstimator::from)
                    .unwrap_or_else(BudgetAwareStrategy::default_estimator);
                Box::new(BudgetAwareStrategy::new(
                    Box::new(estimator),
                    budget,
                    StdRng::seed_from_u64(*seed),
                ))
            }
        };
        Ok(strategy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub budget: Price,
    pub capacity: usize,
    pub strategy: StrategyConfig,
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, budget: Price, capacity: usize, strategy: StrategyConfig) -> Self {
        Self {
            name: name.into(),
            budget,
            capacity,
            strategy,
        }
    }

    pub fn build(&self, id: AgentId) -> AuctionResult<(Agent, Box<dyn BiddingStrategy>)> {
        let agent = Agent::new(id, self.name.clone(), self.budget, self.capacity);
        agent.validate()?;
        let strategy = self.strategy.build(&self.name, self.budget)?;
        Ok((agent, strategy))
    }
}

/// Everything needed to run an auction over a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionSetup {
    #[serde(default)]
    pub config: AuctionConfig,
    pub agents: Vec<AgentConfig>,
}

impl AuctionSetup {
    pub fn from_json(json: &str) -> AuctionResult<Self> {
        serde_json::from_str(json).map_err(|e| AuctionError::Setup(e.to_string()))
    }

    /// Four teams with equal budgets, one per strategy family.
    pub fn four_teams(order_seed: u64) -> Self {
        let team = |name: &str, strategy| AgentConfig::new(name, DEFAULT_BUDGET, DEFAULT_CAPACITY, strategy);
        Self {
            config: AuctionConfig {
                order_seed: Some(order_seed),
                ..AuctionConfig::default()
            },
            agents: vec![
                team("Team A", StrategyConfig::Linear { seed: order_seed ^ 0xA, model: None }),
                team("Team B", StrategyConfig::ModelBacked { model: None }),
                team("Team C", StrategyConfig::Statistical { seed: order_seed ^ 0xC, requirements: None }),
                team("Team D", StrategyConfig::BudgetAware { seed: order_seed ^ 0xD, model: None }),
            ],
        }
    }

    pub fn build(&self, catalog: Catalog) -> AuctionResult<Auction> {
        let mut agents = Vec::with_capacity(self.agents.len());
        let mut strategies = Vec::with_capacity(self.agents.len());
        for (i, cfg) in self.agents.iter().enumerate() {
            let (agent, strategy) = cfg.build(AgentId::new(i as u32))?;
            agents.push(agent);
            strategies.push(strategy);
        }
        Auction::new(catalog, agents, strategies, &self.config)
    }

    /// Build, run in the configured item order, and hand back the result.
    pub fn run(&self, catalog: Catalog) -> AuctionResult<Allocation> {
        let mut auction = self.build(catalog)?;
        let mut order = self.config.item_order();
        auction.run(order.as_mut())?;
        Ok(auction.into_parts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_parses_from_json() {
        let json = r#"{
            "config": { "order_seed": 7 },
            "agents": [
                { "name": "Team A", "budget": 40.0, "capacity": 11,
                  "strategy": { "kind": "fixed_step", "valuation": 5.0, "step": 0.5 } },
                { "name": "Team C", "budget": 40.0, "capacity": 11,
                  "strategy": { "kind": "statistical", "seed": 3,
                                "requirements": { "batsman": 6, "bowler": 5 } } }
            ]
        }"#;
        let setup = AuctionSetup::from_json(json).unwrap();
        assert_eq!(setup.config.order_seed, Some(7));
        assert_eq!(setup.config.max_passes, DEFAULT_MAX_PASSES);
        assert_eq!(setup.agents.len(), 2);
        assert!(setup.build(Catalog::new()).is_ok());
    }

    #[test]
    fn bad_agent_rejected_before_running() {
        let setup = AuctionSetup {
            config: AuctionConfig::default(),
            agents: vec![AgentConfig::new(
                "Broke",
                -1.0,
                11,
                StrategyConfig::ModelBacked { model: None },
            )],
        };
        assert!(matches!(
            setup.build(Catalog::new()),
            Err(AuctionError::InvalidBudget { .. })
        ));
    }

    #[test]
    fn zero_step_rejected() {
        let cfg = StrategyConfig::FixedStep {
            valuation: 5.0,
            step: 0.0,
        };
        assert!(matches!(
            cfg.build("Team A", 40.0),
            Err(AuctionError::InvalidStrategy { .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_setup_error() {
        assert!(matches!(
            AuctionSetup::from_json("{ \"agents\": 3 }"),
            Err(AuctionError::Setup(_))
        ));
    }

    #[test]
    fn four_teams_all_build() {
        let setup = AuctionSetup::four_teams(1);
        let auction = setup.build(Catalog::new()).unwrap();
        assert_eq!(auction.agents().len(), 4);
        assert!(auction.agents().iter().all(|a| a.remaining() == DEFAULT_BUDGET));
    }
}
