// Auctionable items and the catalog that owns them

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::error::{AuctionError, AuctionResult};
use crate::types::{AgentId, Attributes, Category, ItemId, Price};

/// Result of an item's auction, written once by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// `None` when the item went unsold
    pub winner: Option<AgentId>,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub category: Category,
    pub age: u32,
    pub nationality: String,
    pub stats: Attributes,
    /// Free-text columns (career span, high score, ...)
    pub text: BTreeMap<String, String>,
    pub floor_price: Price,
    settlement: Option<Settlement>,
}

impl Item {
    pub fn new(name: impl Into<String>, category: Category, floor_price: Price) -> Self {
        Self {
            name: name.into(),
            category,
            age: 0,
            nationality: String::new(),
            stats: Attributes::new(),
            text: BTreeMap::new(),
            floor_price,
            settlement: None,
        }
    }

    pub fn with_stat(mut self, name: impl Into<String>, value: f64) -> Self {
        self.stats.insert(name, value);
        self
    }

    pub fn with_stats(mut self, stats: Attributes) -> Self {
        self.stats = stats;
        self
    }

    pub fn settlement(&self) -> Option<Settlement> {
        self.settlement
    }

    pub fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }

    pub fn winner(&self) -> Option<AgentId> {
        self.settlement.and_then(|s| s.winner)
    }

    /// Star rating, the default ranking metric of rosters.
    pub fn stars(&self) -> f64 {
        self.stats.get_or("stars", 0.0)
    }

    /// Records the auction result. Only the coordinator settles items, and
    /// only once.
    pub(crate) fn settle(&mut self, settlement: Settlement) -> AuctionResult<()> {
        if self.settlement.is_some() {
            return Err(AuctionError::AlreadySettled(self.name.clone()));
        }
        self.settlement = Some(settlement);
        Ok(())
    }
}

/// Every item of a run, in ingestion order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: SlotMap<ItemId, Item>,
    order: Vec<ItemId>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: Item) -> ItemId {
        let id = self.items.insert(item);
        self.order.push(id);
        id
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    /// Item ids in ingestion order.
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.order.iter().filter_map(|&id| self.items.get(id).map(|item| (id, item)))
    }

    pub fn unsettled(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.iter()
            .filter(|(_, item)| !item.is_settled())
            .map(|(id, _)| id)
    }

    pub fn find(&self, name: &str) -> Option<ItemId> {
        self.iter().find(|(_, item)| item.name == name).map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rejects items that could never be auctioned.
    pub fn validate(&self) -> AuctionResult<()> {
        for (_, item) in self.iter() {
            if !(item.floor_price.is_finite() && item.floor_price > 0.0) {
                return Err(AuctionError::InvalidFloorPrice {
                    item: item.name.clone(),
                    floor: item.floor_price,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<Item> for Catalog {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        let mut catalog = Catalog::new();
        for item in iter {
            catalog.insert(item);
        }
        catalog
    }
}
