// Core ID types, prices and item categories

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

// === TYPE ALIASES ===

/// Currency amount, in the catalog's unit (crore in the reference data).
pub type Price = f64;

// === IDS ===

new_key_type! {
    /// Generational key of an item in the [`Catalog`](crate::Catalog).
    pub struct ItemId;
}

/// Stable index of an agent in the auction's agent list.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Round to two decimals, the granularity bids are quoted in.
pub fn round_price(price: Price) -> Price {
    (price * 100.0).round() / 100.0
}

// === CATEGORIES ===

/// Playing role of an item. Decides which attribute columns exist and how
/// role-aware strategies partition their budget.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Batsman,
    Bowler,
    AllRounder,
    WicketKeeper,
}

impl Category {
    pub fn all() -> impl Iterator<Item = Category> {
        [
            Category::Batsman,
            Category::Bowler,
            Category::AllRounder,
            Category::WicketKeeper,
        ]
        .into_iter()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Batsman => "batsman",
            Category::Bowler => "bowler",
            Category::AllRounder => "allrounder",
            Category::WicketKeeper => "wicketkeeper",
        }
    }

    /// Batsmen, keepers and all-rounders carry batting columns.
    pub fn bats(&self) -> bool {
        matches!(
            self,
            Category::Batsman | Category::WicketKeeper | Category::AllRounder
        )
    }

    /// Bowlers and all-rounders carry bowling columns.
    pub fn bowls(&self) -> bool {
        matches!(self, Category::Bowler | Category::AllRounder)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "batsman" | "batter" => Ok(Category::Batsman),
            "bowler" => Ok(Category::Bowler),
            "allrounder" => Ok(Category::AllRounder),
            "wicketkeeper" | "keeper" => Ok(Category::WicketKeeper),
            _ => Err(format!("unknown category '{s}'")),
        }
    }
}

// === ATTRIBUTES ===

/// Numeric attribute bundle of an item, keyed by attribute name.
///
/// Ingestion fills every column known for the item's category (zero when the
/// source cell is missing). Strategies read with [`Attributes::get_or`] so that
/// an attribute the category never had falls back to the strategy's own
/// neutral value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes(pub BTreeMap<String, f64>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
