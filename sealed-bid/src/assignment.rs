//! Item assignment: every item goes to its highest bidder.
//!
//! Columns are resolved independently of each other, which is what lets the
//! parallel strategy split work by item. Ties go to the lowest agent index,
//! so the assignment is a pure function of the matrix.

use serde::{Deserialize, Serialize};

use crate::error::{AllocationResult, MatrixDefect};
use crate::execution::ExecutionStrategy;
use crate::matrix::ValuationMatrix;
use crate::types::{AgentId, ItemId};

/// Item -> winning agent, indexed by item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    winners: Vec<AgentId>,
}

impl Assignment {
    pub fn from_winners(winners: Vec<AgentId>) -> Self {
        Self { winners }
    }

    pub fn winner(&self, item: ItemId) -> AgentId {
        self.winners[item.index()]
    }

    pub fn winners(&self) -> &[AgentId] {
        &self.winners
    }

    pub fn num_items(&self) -> usize {
        self.winners.len()
    }

    /// Check that every item of `matrix` has exactly one winner and every
    /// winner is an agent of `matrix`.
    pub fn check_against(&self, matrix: &ValuationMatrix) -> AllocationResult<()> {
        if self.winners.len() != matrix.num_items() {
            return Err(MatrixDefect::LengthMismatch {
                expected: matrix.num_items(),
                found: self.winners.len(),
            }
            .into());
        }
        let n = matrix.num_agents();
        if let Some(bad) = self.winners.iter().find(|w| w.index() >= n) {
            return Err(MatrixDefect::IndexOutOfRange {
                axis: "agent",
                index: bad.index(),
                len: n,
            }
            .into());
        }
        Ok(())
    }

    /// Agent -> items won, each list in ascending item order.
    pub fn bundles(&self, num_agents: usize) -> Vec<Vec<ItemId>> {
        let mut bundles = vec![Vec::new(); num_agents];
        for (item, agent) in self.winners.iter().enumerate() {
            bundles[agent.index()].push(ItemId(item as u32));
        }
        bundles
    }

    pub fn items_won_by(&self, agent: AgentId) -> Vec<ItemId> {
        self.winners
            .iter()
            .enumerate()
            .filter(|&(_, &winner)| winner == agent)
            .map(|(item, _)| ItemId(item as u32))
            .collect()
    }
}

/// Highest bidder for one item; lowest agent index among equal bids.
///
/// Panics if `item` is not a column of `matrix`.
pub fn column_winner(matrix: &ValuationMatrix, item: ItemId) -> AgentId {
    let mut best = AgentId(0);
    let mut best_bid = matrix.bid(best, item);
    for agent in matrix.agents().skip(1) {
        let bid = matrix.bid(agent, item);
        // strict: an equal bid never displaces an earlier agent
        if bid > best_bid {
            best = agent;
            best_bid = bid;
        }
    }
    best
}

/// Resolve every item to its winner.
pub fn assign(matrix: &ValuationMatrix, strategy: &ExecutionStrategy) -> Assignment {
    let winners = strategy.map_range(matrix.num_items(), |item| {
        column_winner(matrix, ItemId(item as u32))
    });
    Assignment { winners }
}
