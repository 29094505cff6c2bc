// Order in which catalog items go under the hammer

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::types::ItemId;

/// Arranges the item sequence of a run in place.
pub trait ItemOrder {
    fn arrange(&mut self, items: &mut Vec<ItemId>);
}

/// Keeps catalog (ingestion) order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogOrder;

impl ItemOrder for CatalogOrder {
    fn arrange(&mut self, _items: &mut Vec<ItemId>) {}
}

/// Uniform shuffle from a seeded generator; equal seeds give equal orders.
#[derive(Debug, Clone)]
pub struct SeededShuffle {
    rng: StdRng,
}

impl SeededShuffle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_rng(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl ItemOrder for SeededShuffle {
    fn arrange(&mut self, items: &mut Vec<ItemId>) {
        items.shuffle(&mut self.rng);
    }
}

impl<F> ItemOrder for F
where
    F: FnMut(&mut Vec<ItemId>),
{
    fn arrange(&mut self, items: &mut Vec<ItemId>) {
        self(items)
    }
}
