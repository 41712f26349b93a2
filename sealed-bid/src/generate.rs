//! Random bid tables for demos and timing runs. Randomness always comes from
//! a caller-supplied generator so runs are reproducible from a seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AllocationResult;
use crate::matrix::ValuationMatrix;
use crate::types::Bid;

/// Bids are drawn uniformly from `low, low + step, ..` strictly below `high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidGrid {
    pub low: u32,
    pub high: u32,
    pub step: u32,
}

impl Default for BidGrid {
    fn default() -> Self {
        Self {
            low: 0,
            high: 60,
            step: 5,
        }
    }
}

impl BidGrid {
    /// Grid the demo front end uses for its "random bids" button.
    pub fn demo() -> Self {
        Self {
            low: 30,
            high: 60,
            step: 5,
        }
    }

    fn levels(&self) -> u32 {
        let step = self.step.max(1);
        self.high.saturating_sub(self.low).div_ceil(step).max(1)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Bid {
        let level = rng.random_range(0..self.levels());
        (self.low + level * self.step.max(1)) as Bid
    }
}

pub fn random_rows<R: Rng>(
    rng: &mut R,
    agents: usize,
    items: usize,
    grid: BidGrid,
) -> Vec<Vec<Bid>> {
    (0..agents)
        .map(|_| (0..items).map(|_| grid.sample(rng)).collect())
        .collect()
}

/// Seeded `size` x `size` table on the demo grid.
pub fn demo_rows(size: usize, seed: u64) -> Vec<Vec<Bid>> {
    random_rows(&mut StdRng::seed_from_u64(seed), size, size, BidGrid::demo())
}

pub fn random_matrix<R: Rng>(
    rng: &mut R,
    agents: usize,
    items: usize,
    grid: BidGrid,
) -> AllocationResult<ValuationMatrix> {
    ValuationMatrix::from_rows(&random_rows(rng, agents, items, grid))
}
