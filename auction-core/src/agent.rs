// Bidding agents (teams): budget and roster bookkeeping

use serde::{Deserialize, Serialize};

use crate::error::{AuctionError, AuctionResult};
use crate::types::{AgentId, Category, ItemId, Price};

/// One acquired item and what was paid for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub item: ItemId,
    pub name: String,
    pub category: Category,
    pub price: Price,
}

/// A budget- and capacity-constrained bidder.
///
/// Invariants, maintained by [`Agent::acquire`]:
/// - `remaining >= 0`
/// - `roster.len() <= capacity`
/// - `initial_budget - remaining == sum of roster prices`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    initial_budget: Price,
    remaining: Price,
    capacity: usize,
    roster: Vec<RosterEntry>,
}

impl Agent {
    pub fn new(id: AgentId, name: impl Into<String>, budget: Price, capacity: usize) -> Self {
        Self {
            id,
            name: name.into(),
            initial_budget: budget,
            remaining: budget,
            capacity,
            roster: Vec::new(),
        }
    }

    /// Rejects configurations the auction cannot run with.
    pub fn validate(&self) -> AuctionResult<()> {
        if !(self.initial_budget.is_finite() && self.initial_budget > 0.0) {
            return Err(AuctionError::InvalidBudget {
                agent: self.name.clone(),
                budget: self.initial_budget,
            });
        }
        if self.capacity == 0 {
            return Err(AuctionError::InvalidCapacity {
                agent: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn initial_budget(&self) -> Price {
        self.initial_budget
    }

    pub fn remaining(&self) -> Price {
        self.remaining
    }

    pub fn spent(&self) -> Price {
        self.initial_budget - self.remaining
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn open_slots(&self) -> usize {
        self.capacity.saturating_sub(self.roster.len())
    }

    pub fn can_afford(&self, price: Price) -> bool {
        self.remaining >= price
    }

    pub fn is_full(&self) -> bool {
        self.roster.len() >= self.capacity
    }

    /// Eligible to take part in a pass at `price`.
    pub fn can_bid(&self, price: Price) -> bool {
        self.can_afford(price) && !self.is_full()
    }

    /// Add a won item to the roster and pay for it.
    ///
    /// # Panics
    ///
    /// If the agent cannot afford `price` or the roster is full. The
    /// coordinator only settles with an eligible leader, so this is a bug in
    /// the caller rather than a runtime condition.
    pub fn acquire(&mut self, item: ItemId, name: &str, category: Category, price: Price) {
        assert!(
            self.can_bid(price),
            "{} cannot acquire '{}' at {}: remaining={}, roster={}/{}",
            self.name,
            name,
            price,
            self.remaining,
            self.roster.len(),
            self.capacity
        );
        self.remaining -= price;
        self.roster.push(RosterEntry {
            item,
            name: name.to_string(),
            category,
            price,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_id() -> ItemId {
        let mut ids = slotmap::SlotMap::<ItemId, ()>::with_key();
        ids.insert(())
    }

    #[test]
    fn budget_equal_to_price_is_affordable() {
        let agent = Agent::new(AgentId(0), "Team A", 4.0, 2);
        assert!(agent.can_afford(4.0));
        assert!(!agent.can_afford(4.01));
    }

    #[test]
    fn acquire_deducts_exact_price() {
        let mut agent = Agent::new(AgentId(0), "Team A", 40.0, 11);
        agent.acquire(item_id(), "Opener", Category::Batsman, 2.5);
        agent.acquire(item_id(), "Spinner", Category::Bowler, 1.5);

        assert_eq!(agent.remaining(), 36.0);
        assert_eq!(agent.spent(), 4.0);
        let roster_total: f64 = agent.roster().iter().map(|e| e.price).sum();
        assert_eq!(roster_total, agent.spent());
        assert_eq!(agent.open_slots(), 9);
    }

    #[test]
    fn full_roster_cannot_bid() {
        let mut agent = Agent::new(AgentId(0), "Team A", 40.0, 1);
        agent.acquire(item_id(), "Keeper", Category::WicketKeeper, 1.0);
        assert!(agent.is_full());
        assert!(!agent.can_bid(0.5));
    }

    #[test]
    #[should_panic(expected = "cannot acquire")]
    fn acquire_beyond_budget_panics() {
        let mut agent = Agent::new(AgentId(0), "Team A", 1.0, 3);
        agent.acquire(item_id(), "Star", Category::AllRounder, 1.5);
    }

    #[test]
    fn validate_rejects_bad_setup() {
        assert!(matches!(
            Agent::new(AgentId(0), "Broke", 0.0, 11).validate(),
            Err(AuctionError::InvalidBudget { .. })
        ));
        assert!(matches!(
            Agent::new(AgentId(0), "Empty", 10.0, 0).validate(),
            Err(AuctionError::InvalidCapacity { .. })
        ));
        assert!(Agent::new(AgentId(0), "Fine", 10.0, 11).validate().is_ok());
    }
}
