//! Fair-share benchmark: each agent's own valuation of everything, split
//! evenly across all agents (divided by agent count, not item count).

use crate::execution::ExecutionStrategy;
use crate::matrix::ValuationMatrix;
use crate::types::{AgentId, Money};

/// Fair share per agent, indexed by agent.
pub fn fair_shares(matrix: &ValuationMatrix, strategy: &ExecutionStrategy) -> Vec<Money> {
    let n = matrix.num_agents() as f64;
    strategy.map_range(matrix.num_agents(), |agent| {
        matrix.row_total(AgentId(agent as u32)) / n
    })
}
