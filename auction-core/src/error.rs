use thiserror::Error;

use crate::types::{ItemId, Price};

/// Setup and run failures of an auction.
///
/// Unsold items and rejected (overreaching) bids are not errors; they are
/// ordinary outcomes of the bidding loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuctionError {
    #[error("agent '{agent}' has invalid budget {budget}: budgets must be positive and finite")]
    InvalidBudget { agent: String, budget: Price },

    #[error("agent '{agent}' has roster capacity 0: capacity must be at least 1")]
    InvalidCapacity { agent: String },

    #[error("item '{item}' has invalid floor price {floor}: floor prices must be positive")]
    InvalidFloorPrice { item: String, floor: Price },

    #[error("auction needs at least one agent")]
    NoAgents,

    #[error("{agents} agents but {strategies} strategies: every agent needs exactly one strategy")]
    StrategyCountMismatch { agents: usize, strategies: usize },

    #[error("pass ceiling must be at least 1")]
    InvalidPassCeiling,

    #[error("strategy configuration for '{agent}' is invalid: {reason}")]
    InvalidStrategy { agent: String, reason: String },

    #[error("invalid auction setup: {0}")]
    Setup(String),

    #[error("item {0:?} is not in the catalog")]
    UnknownItem(ItemId),

    #[error("item '{0}' has already been settled")]
    AlreadySettled(String),

    /// Internal invariant violation: prices strictly increase and budgets are
    /// finite, so a well-formed run never reaches the pass ceiling.
    #[error("item '{item}' still contested after {passes} passes; aborting run")]
    PassLimitExceeded { item: String, passes: usize },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Failures while turning tabular rows into catalog items.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("row {row}: missing required column '{column}'")]
    MissingColumn { row: usize, column: &'static str },

    #[error("row {row}: column '{column}' is not numeric: {value}")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("catalog source is not valid JSON rows: {0}")]
    Json(String),
}

pub type AuctionResult<T> = std::result::Result<T, AuctionError>;
