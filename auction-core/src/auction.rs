//! Sequential ascending-price auction.
//!
//! Items are sold one at a time. For each item:
//! 1. Open: price = floor price, no leader
//! 2. A pass asks every eligible agent (budget >= price, roster not full), in
//!    index order, for a price. A proposal strictly above the current price
//!    and within the agent's remaining budget becomes the new price and its
//!    agent the leader (Contested).
//! 3. Passes repeat until one accepts no raise (Stable).
//! 4. Closed: the leader pays and takes the item, or the item is recorded
//!    unsold at its floor price.
//!
//! Every accepted raise strictly increases the price and no agent can raise
//! past its own budget, so an item stabilizes in finitely many passes. The
//! pass ceiling turns a violation of that argument into an error instead of
//! a hang.
//!
//! Agents are only mutated at settlement, and only the winner.

use crate::agent::Agent;
use crate::config::AuctionConfig;
use crate::error::{AuctionError, AuctionResult};
use crate::item::{Catalog, Item, Settlement};
use crate::ledger::{Ledger, LedgerEntry, Outcome};
use crate::order::ItemOrder;
use crate::strategy::{BidContext, BiddingStrategy};
use crate::types::{AgentId, ItemId, Price};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Contested,
    Stable,
    Closed,
}

/// Transient state of one item's bidding.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub item: ItemId,
    pub price: Price,
    pub leader: Option<AgentId>,
    pub phase: Phase,
    pub passes: usize,
}

impl Round {
    fn open(item: ItemId, floor_price: Price) -> Self {
        Self {
            item,
            price: floor_price,
            leader: None,
            phase: Phase::Open,
            passes: 0,
        }
    }
}

/// Final state of a run.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub catalog: Catalog,
    pub agents: Vec<Agent>,
    pub ledger: Ledger,
}

pub struct Auction {
    catalog: Catalog,
    agents: Vec<Agent>,
    strategies: Vec<Box<dyn BiddingStrategy>>,
    ledger: Ledger,
    max_passes: usize,
}

impl Auction {
    /// Validate the setup and take ownership of it.
    ///
    /// `strategies[i]` bids for `agents[i]`. Agent ids are reassigned to
    /// their index.
    pub fn new(
        catalog: Catalog,
        mut agents: Vec<Agent>,
        strategies: Vec<Box<dyn BiddingStrategy>>,
        config: &AuctionConfig,
    ) -> AuctionResult<Self> {
        if agents.is_empty() {
            return Err(AuctionError::NoAgents);
        }
        if agents.len() != strategies.len() {
            return Err(AuctionError::StrategyCountMismatch {
                agents: agents.len(),
                strategies: strategies.len(),
            });
        }
        if config.max_passes == 0 {
            return Err(AuctionError::InvalidPassCeiling);
        }
        for (i, agent) in agents.iter_mut().enumerate() {
            agent.validate()?;
            agent.id = AgentId::new(i as u32);
        }
        catalog.validate()?;

        Ok(Self {
            catalog,
            agents,
            strategies,
            ledger: Ledger::new(),
            max_passes: config.max_passes,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn is_complete(&self) -> bool {
        self.ledger.len() == self.catalog.len()
    }

    pub fn into_parts(self) -> Allocation {
        Allocation {
            catalog: self.catalog,
            agents: self.agents,
            ledger: self.ledger,
        }
    }

    /// Resolve every unsettled item in the order `order` arranges them.
    ///
    /// An error aborts the run; items resolved before it stay settled.
    pub fn run<O: ItemOrder + ?Sized>(&mut self, order: &mut O) -> AuctionResult<&Ledger> {
        let mut queue: Vec<ItemId> = self.catalog.unsettled().collect();
        order.arrange(&mut queue);

        for id in queue {
            self.resolve_item(id)?;
        }
        Ok(&self.ledger)
    }

    /// Run the bidding state machine for one item and settle it.
    pub fn resolve_item(&mut self, id: ItemId) -> AuctionResult<Outcome> {
        let round = self.contest(id)?;
        self.close(round)
    }

    /// Bidding passes until stable. No agent is mutated here.
    fn contest(&mut self, id: ItemId) -> AuctionResult<Round> {
        let item = self.catalog.get(id).ok_or(AuctionError::UnknownItem(id))?;
        if item.is_settled() || self.ledger.contains(id) {
            return Err(AuctionError::AlreadySettled(item.name.clone()));
        }

        let mut round = Round::open(id, item.floor_price);
        loop {
            if round.passes >= self.max_passes {
                return Err(AuctionError::PassLimitExceeded {
                    item: item.name.clone(),
                    passes: round.passes,
                });
            }
            round.passes += 1;

            let mut raised = false;
            for (agent, strategy) in self.agents.iter().zip(self.strategies.iter_mut()) {
                if !agent.can_bid(round.price) {
                    continue;
                }
                let ctx = BidContext::new(round.price, agent.remaining());
                let proposed = strategy.decide_bid(item, &ctx);
                // Overreach or non-improving price: a pass
                if !(proposed.is_finite() && proposed > round.price && agent.can_afford(proposed)) {
                    continue;
                }

                #[cfg(feature = "instrument")]
                tracing::info!(
                    target: "bid",
                    item = item.name.as_str(),
                    agent = agent.id.0,
                    strategy = strategy.name(),
                    pass = round.passes as u64,
                    from = round.price,
                    to = proposed,
                );

                round.price = proposed;
                round.leader = Some(agent.id);
                round.phase = Phase::Contested;
                raised = true;
            }

            if !raised {
                round.phase = Phase::Stable;
                return Ok(round);
            }
        }
    }

    /// Commit a stable round: item, winner, winner's strategy, ledger.
    fn close(&mut self, mut round: Round) -> AuctionResult<Outcome> {
        let item = self
            .catalog
            .get_mut(round.item)
            .ok_or(AuctionError::UnknownItem(round.item))?;

        let outcome = match round.leader {
            Some(leader) => Outcome::Sold {
                agent: leader,
                price: round.price,
            },
            None => Outcome::Unsold {
                floor_price: item.floor_price,
            },
        };
        item.settle(Settlement {
            winner: outcome.winner(),
            price: outcome.price(),
        })?;

        if let Some(leader) = round.leader {
            self.agents[leader.index()].acquire(round.item, &item.name, item.category, round.price);
            self.strategies[leader.index()].update_spent(item, round.price);
        }
        round.phase = Phase::Closed;
        log_close(item, &round, &outcome);

        let recorded = self.ledger.record(LedgerEntry {
            item: round.item,
            name: item.name.clone(),
            outcome,
            passes: round.passes,
        });
        debug_assert!(recorded, "item {} entered the ledger twice", item.name);
        Ok(outcome)
    }
}

#[cfg(feature = "instrument")]
fn log_close(item: &Item, round: &Round, outcome: &Outcome) {
    match outcome {
        Outcome::Sold { agent, price } => tracing::info!(
            target: "settlement",
            item = item.name.as_str(),
            category = item.category.as_str(),
            agent = agent.0,
            floor_price = item.floor_price,
            price = *price,
            passes = round.passes as u64,
        ),
        Outcome::Unsold { floor_price } => tracing::info!(
            target: "unsold",
            item = item.name.as_str(),
            category = item.category.as_str(),
            floor_price = *floor_price,
        ),
    }
}

#[cfg(not(feature = "instrument"))]
fn log_close(_item: &Item, _round: &Round, _outcome: &Outcome) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::CatalogOrder;
    use crate::strategy::FixedStepStrategy;
    use crate::types::Category;

    fn fixed(valuation: Price) -> Box<dyn BiddingStrategy> {
        Box::new(FixedStepStrategy::new(valuation, 1.0))
    }

    fn auction(items: Vec<Item>, budgets: &[Price], capacity: usize) -> Auction {
        let agents = budgets
            .iter()
            .enumerate()
            .map(|(i, &b)| Agent::new(AgentId(i as u32), format!("Team {i}"), b, capacity))
            .collect();
        let strategies = budgets.iter().map(|_| fixed(10.0)).collect();
        Auction::new(
            items.into_iter().collect(),
            agents,
            strategies,
            &AuctionConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn richer_agent_outlasts() {
        let mut a = auction(vec![Item::new("Opener", Category::Batsman, 1.0)], &[5.0, 3.0], 11);
        let id = a.catalog().ids()[0];

        let outcome = a.resolve_item(id).unwrap();
        assert_eq!(
            outcome,
            Outcome::Sold {
                agent: AgentId(0),
                price: 4.0
            }
        );
        assert_eq!(a.agents()[0].remaining(), 1.0);
        assert_eq!(a.agents()[1].remaining(), 3.0);
    }

    #[test]
    fn unaffordable_floor_goes_unsold() {
        let mut a = auction(vec![Item::new("Star", Category::AllRounder, 5.0)], &[4.0, 4.0], 11);
        let id = a.catalog().ids()[0];

        assert_eq!(a.resolve_item(id).unwrap(), Outcome::Unsold { floor_price: 5.0 });
        assert!(a.agents().iter().all(|ag| ag.remaining() == 4.0 && ag.roster().is_empty()));
        assert_eq!(a.ledger().get(id).unwrap().passes, 1);
    }

    #[test]
    fn resolving_twice_is_an_error() {
        let mut a = auction(vec![Item::new("Opener", Category::Batsman, 1.0)], &[5.0], 11);
        let id = a.catalog().ids()[0];
        let first = a.resolve_item(id).unwrap();
        assert!(matches!(a.resolve_item(id), Err(AuctionError::AlreadySettled(_))));
        assert_eq!(a.ledger().len(), 1);
        assert_eq!(a.ledger().get(id).map(|e| e.outcome), Some(first));
    }

    #[test]
    fn full_roster_sits_out() {
        let items = vec![
            Item::new("First", Category::Batsman, 1.0),
            Item::new("Second", Category::Batsman, 1.0),
        ];
        let mut a = auction(items, &[20.0, 3.0], 1);
        a.run(&mut CatalogOrder).unwrap();

        let ledger = a.ledger();
        assert_eq!(ledger.entries()[0].outcome.winner(), Some(AgentId(0)));
        // Team 0 is full, so the poorer team takes the second item
        assert_eq!(ledger.entries()[1].outcome.winner(), Some(AgentId(1)));
        assert!(a.is_complete());
    }

    #[test]
    fn setup_is_validated() {
        let catalog: Catalog = [Item::new("Opener", Category::Batsman, 1.0)].into_iter().collect();
        let agents = vec![Agent::new(AgentId(0), "A", 5.0, 11)];

        let mismatch = Auction::new(catalog.clone(), agents.clone(), vec![], &AuctionConfig::default());
        assert!(matches!(mismatch, Err(AuctionError::StrategyCountMismatch { .. })));

        let none = Auction::new(catalog.clone(), vec![], vec![], &AuctionConfig::default());
        assert!(matches!(none, Err(AuctionError::NoAgents)));

        let zero_passes = AuctionConfig {
            max_passes: 0,
            ..AuctionConfig::default()
        };
        let ceiling = Auction::new(catalog, agents, vec![fixed(10.0)], &zero_passes);
        assert!(matches!(ceiling, Err(AuctionError::InvalidPassCeiling)));
    }

    #[test]
    fn overreaching_bid_is_a_pass() {
        struct AllIn;
        impl BiddingStrategy for AllIn {
            fn decide_bid(&mut self, _item: &Item, ctx: &BidContext) -> Price {
                ctx.remaining_budget + 1.0
            }
            fn name(&self) -> &'static str {
                "all-in"
            }
        }

        let catalog: Catalog = [Item::new("Opener", Category::Batsman, 1.0)].into_iter().collect();
        let agents = vec![Agent::new(AgentId(0), "A", 5.0, 11)];
        let mut a = Auction::new(catalog, agents, vec![Box::new(AllIn)], &AuctionConfig::default()).unwrap();
        let id = a.catalog().ids()[0];

        assert_eq!(a.resolve_item(id).unwrap(), Outcome::Unsold { floor_price: 1.0 });
    }
}
