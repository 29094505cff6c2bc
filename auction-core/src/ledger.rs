// Append-only record of how each item was resolved

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{AgentId, ItemId, Price};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Sold { agent: AgentId, price: Price },
    /// Nobody met the floor; the floor price is kept for the record
    Unsold { floor_price: Price },
}

impl Outcome {
    pub fn winner(&self) -> Option<AgentId> {
        match self {
            Outcome::Sold { agent, .. } => Some(*agent),
            Outcome::Unsold { .. } => None,
        }
    }

    /// Settlement price, or the floor price for an unsold item.
    pub fn price(&self) -> Price {
        match self {
            Outcome::Sold { price, .. } => *price,
            Outcome::Unsold { floor_price } => *floor_price,
        }
    }

    pub fn is_sold(&self) -> bool {
        matches!(self, Outcome::Sold { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub item: ItemId,
    pub name: String,
    pub outcome: Outcome,
    /// Bidding passes it took to stabilize
    pub passes: usize,
}

/// Item → outcome, in resolution order. Each item appears at most once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "StoredLedger")]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    #[serde(skip)]
    index: HashMap<ItemId, usize>,
}

// Serialized shape of `Ledger`; the index is rebuilt on load
#[derive(Deserialize)]
struct StoredLedger {
    entries: Vec<LedgerEntry>,
}

impl From<StoredLedger> for Ledger {
    fn from(stored: StoredLedger) -> Self {
        let mut ledger = Ledger::new();
        for entry in stored.entries {
            ledger.record(entry);
        }
        ledger
    }
}

impl PartialEq for Ledger {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` (and records nothing) if the item is already present.
    pub(crate) fn record(&mut self, entry: LedgerEntry) -> bool {
        if self.index.contains_key(&entry.item) {
            return false;
        }
        self.index.insert(entry.item, self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn get(&self, item: ItemId) -> Option<&LedgerEntry> {
        self.index.get(&item).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.index.contains_key(&item)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sold(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(|e| e.outcome.is_sold())
    }

    pub fn unsold(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(|e| !e.outcome.is_sold())
    }

    pub fn won_by(&self, agent: AgentId) -> impl Iterator<Item = &LedgerEntry> {
        self.entries
            .iter()
            .filter(move |e| e.outcome.winner() == Some(agent))
    }

    /// Sum of settlement prices over sold items.
    pub fn revenue(&self) -> Price {
        self.sold().map(|e| e.outcome.price()).sum()
    }
}
