//! Sequential ascending-price auction of a fixed item catalog among
//! budget-constrained agents, each bidding through a pluggable strategy.
//!
//! ```ignore
//! let catalog = Catalog::from_json(&rows)?;
//! let result = AuctionSetup::four_teams(7).run(catalog)?;
//! for summary in report::summaries(&result.agents) {
//!     println!("{summary}");
//! }
//! ```

pub mod agent;
pub mod auction;
pub mod catalog;
pub mod config;
pub mod error;
pub mod item;
pub mod ledger;
pub mod order;
pub mod report;
pub mod strategy;
pub mod types;
pub mod wasm;

pub use agent::{Agent, RosterEntry};
pub use auction::{Allocation, Auction, Phase, Round};
pub use catalog::Row;
pub use config::{AgentConfig, AuctionConfig, AuctionSetup, LinearModel, StrategyConfig};
pub use error::{AuctionError, AuctionResult, CatalogError};
pub use item::{Catalog, Item, Settlement};
pub use ledger::{Ledger, LedgerEntry, Outcome};
pub use order::{CatalogOrder, ItemOrder, SeededShuffle};
pub use strategy::{BidContext, BiddingStrategy, ValueEstimator};
pub use types::*;
pub use wasm::AuctionSimulation;

#[cfg(feature = "instrument")]
pub use instrument;
