// ============================================================================
// WASM API - drive an auction from JS
// ============================================================================

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use crate::agent::Agent;
use crate::auction::Auction;
use crate::catalog::Row;
use crate::config::AuctionSetup;
use crate::item::Catalog;
use crate::ledger::{Ledger, Outcome};
use crate::report::{AgentSummary, star_standings};
use crate::types::ItemId;

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
pub struct LedgerRow {
    pub item: String,
    pub category: String,
    pub winner: Option<String>,
    pub price: f64,
    pub passes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct LedgerSnapshot {
    pub rows: Vec<LedgerRow>,
    pub revenue: f64,
    pub sold: u32,
    pub unsold: u32,
}

impl LedgerSnapshot {
    pub fn build(ledger: &Ledger, catalog: &Catalog, agents: &[Agent]) -> Self {
        let rows = ledger
            .entries()
            .iter()
            .map(|entry| LedgerRow {
                item: entry.name.clone(),
                category: catalog
                    .get(entry.item)
                    .map(|i| i.category.to_string())
                    .unwrap_or_default(),
                winner: match entry.outcome {
                    Outcome::Sold { agent, .. } => agents.get(agent.index()).map(|a| a.name.clone()),
                    Outcome::Unsold { .. } => None,
                },
                price: entry.outcome.price(),
                passes: entry.passes as u32,
            })
            .collect();

        Self {
            rows,
            revenue: ledger.revenue(),
            sold: ledger.sold().count() as u32,
            unsold: ledger.unsold().count() as u32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
pub struct PlayerSnapshot {
    pub name: String,
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
pub struct TeamSnapshot {
    pub name: String,
    pub remaining: f64,
    pub spent: f64,
    pub stars: f64,
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct TeamsSnapshot {
    /// Ranked by total stars, best first
    pub teams: Vec<TeamSnapshot>,
}

impl TeamsSnapshot {
    pub fn build(agents: &[Agent], catalog: &Catalog) -> Self {
        let teams = star_standings(agents, catalog)
            .into_iter()
            .filter_map(|standing| {
                let agent = agents.get(standing.agent.index())?;
                let summary = AgentSummary::from(agent);
                Some(TeamSnapshot {
                    name: summary.name,
                    remaining: summary.remaining,
                    spent: summary.spent,
                    stars: standing.score,
                    players: summary
                        .roster
                        .into_iter()
                        .map(|e| PlayerSnapshot {
                            name: e.name,
                            category: e.category.to_string(),
                            price: e.price,
                        })
                        .collect(),
                })
            })
            .collect();
        Self { teams }
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

#[wasm_bindgen]
pub struct AuctionSimulation {
    auction: Auction,
    queue: Vec<ItemId>,
    cursor: usize,
}

#[wasm_bindgen]
impl AuctionSimulation {
    /// `setup`: an `AuctionSetup` object; `rows`: catalog rows with a `Role` column.
    #[wasm_bindgen(constructor)]
    pub fn new(setup: JsValue, rows: JsValue) -> Result<AuctionSimulation, JsValue> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        let setup: AuctionSetup = serde_wasm_bindgen::from_value(setup).map_err(to_js)?;
        let rows: Vec<Row> = serde_wasm_bindgen::from_value(rows).map_err(to_js)?;
        Self::from_parts(&setup, &rows).map_err(to_js)
    }

    /// Four equally funded teams, one per strategy family.
    #[wasm_bindgen(js_name = withFourTeams)]
    pub fn with_four_teams(seed: u64, rows: JsValue) -> Result<AuctionSimulation, JsValue> {
        console_error_panic_hook::set_once();

        let rows: Vec<Row> = serde_wasm_bindgen::from_value(rows).map_err(to_js)?;
        Self::from_parts(&AuctionSetup::four_teams(seed), &rows).map_err(to_js)
    }

    /// Resolve the next item. Returns `false` once every item is settled.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<bool, JsValue> {
        let Some(&id) = self.queue.get(self.cursor) else {
            return Ok(false);
        };
        self.auction.resolve_item(id).map_err(to_js)?;
        self.cursor += 1;
        Ok(true)
    }

    /// Resolve all remaining items.
    #[wasm_bindgen]
    pub fn run(&mut self) -> Result<(), JsValue> {
        while self.step()? {}
        Ok(())
    }

    #[wasm_bindgen]
    pub fn remaining_items(&self) -> u32 {
        (self.queue.len() - self.cursor) as u32
    }

    #[wasm_bindgen]
    pub fn ledger(&self) -> LedgerSnapshot {
        LedgerSnapshot::build(
            self.auction.ledger(),
            self.auction.catalog(),
            self.auction.agents(),
        )
    }

    #[wasm_bindgen]
    pub fn summaries(&self) -> TeamsSnapshot {
        TeamsSnapshot::build(self.auction.agents(), self.auction.catalog())
    }

    /// Team with the most stars, if anything was sold.
    #[wasm_bindgen]
    pub fn winner(&self) -> Option<String> {
        if self.auction.ledger().sold().next().is_none() {
            return None;
        }
        star_standings(self.auction.agents(), self.auction.catalog())
            .into_iter()
            .next()
            .map(|s| s.name)
    }

    /// Human-readable per-team summary.
    #[wasm_bindgen]
    pub fn summary_text(&self) -> String {
        self.auction
            .agents()
            .iter()
            .map(|a| AgentSummary::from(a).to_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl AuctionSimulation {
    pub fn from_parts(setup: &AuctionSetup, rows: &[Row]) -> crate::AuctionResult<Self> {
        let catalog = Catalog::from_rows(rows)?;
        let auction = setup.build(catalog)?;
        let mut queue: Vec<ItemId> = auction.catalog().unsettled().collect();
        setup.config.item_order().arrange(&mut queue);
        Ok(Self {
            auction,
            queue,
            cursor: 0,
        })
    }
}
