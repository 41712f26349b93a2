//! Bidding for envy-freeness: the sealed-bid compensation procedure.
//!
//! Pipeline: matrix -> assignment -> fair shares -> ledger -> allocation.
//! Every agent ends with `fair share + surplus / n`, measured with its own
//! bids, and the payments sum to zero.
//!
//! Instrumentation events (feature `instrument`) are emitted from the calling
//! thread only, after each parallel phase has joined:
//! - `allocation`: agents, items, pot, deficit, surplus, parallel
//! - `ledger`: one row per agent

use crate::allocation::Allocation;
use crate::assignment::assign;
use crate::config::AllocationConfig;
use crate::error::AllocationResult;
use crate::fair_share::fair_shares;
use crate::ledger::settle;
use crate::matrix::ValuationMatrix;

/// Run the procedure serially with default settings.
pub fn bidding_for_envy_freeness(matrix: &ValuationMatrix) -> AllocationResult<Allocation> {
    bidding_for_envy_freeness_with(matrix, &AllocationConfig::default())
}

pub fn bidding_for_envy_freeness_with(
    matrix: &ValuationMatrix,
    config: &AllocationConfig,
) -> AllocationResult<Allocation> {
    config.validate()?;

    let (assignment, shares, ledger) = config.strategy.install(|| {
        let assignment = assign(matrix, &config.strategy);
        let shares = fair_shares(matrix, &config.strategy);
        let ledger = settle(matrix, &assignment, &shares, config);
        (assignment, shares, ledger)
    })?;

    #[cfg(feature = "instrument")]
    {
        if let Err(err) = &ledger {
            tracing::warn!(
                target: "allocation",
                agents = matrix.num_agents() as u64,
                items = matrix.num_items() as u64,
                error = %err,
            );
        }
    }
    let ledger = ledger?;
    let allocation = Allocation::build(matrix, &assignment, &shares, &ledger)?;

    #[cfg(feature = "instrument")]
    {
        tracing::info!(
            target: "allocation",
            agents = matrix.num_agents() as u64,
            items = matrix.num_items() as u64,
            pot = ledger.pot,
            deficit = ledger.deficit,
            surplus = ledger.surplus,
            parallel = config.strategy.is_parallel(),
        );
        for outcome in allocation.agents() {
            tracing::info!(
                target: "ledger",
                agent = outcome.agent.0 as u64,
                items_won = outcome.items.len() as u64,
                fair_share = outcome.fair_share,
                raw_adjustment = outcome.raw_adjustment,
                net_payment = outcome.net_payment,
                perceived_value = outcome.perceived_value,
            );
        }
    }

    Ok(allocation)
}
