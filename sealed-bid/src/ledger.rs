//! Compensation ledger: turns an assignment and fair shares into balanced
//! monetary transfers.
//!
//! Per agent:
//! - raw adjustment = value of items won (own bids) - fair share
//!   (positive owes into the pot, negative is owed from it)
//! - net payment = -raw adjustment + surplus / n
//!
//! Pot = sum of positive adjustments, deficit = sum of |negative adjustments|,
//! surplus = pot - deficit. With highest-bid assignment the surplus is never
//! negative; observing one means the assignment or the input is inconsistent
//! and the whole computation is rejected.

use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::config::AllocationConfig;
use crate::error::{AllocationError, AllocationResult};
use crate::matrix::ValuationMatrix;
use crate::types::{AgentId, Money};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Own-bid value of each agent's bundle
    pub values_won: Vec<Money>,
    pub raw_adjustments: Vec<Money>,
    pub net_payments: Vec<Money>,
    pub pot: Money,
    pub deficit: Money,
    pub surplus: Money,
    /// surplus / n, paid to every agent
    pub surplus_share: Money,
}

impl Ledger {
    /// Sum of net payments. Zero up to rounding.
    pub fn balance(&self) -> Money {
        self.net_payments.iter().sum()
    }
}

/// Pot and deficit contributed by one partition of agents.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PotPartial {
    pot: Money,
    deficit: Money,
}

impl PotPartial {
    fn merge(self, other: Self) -> Self {
        Self {
            pot: self.pot + other.pot,
            deficit: self.deficit + other.deficit,
        }
    }
}

/// Surplus from pot and deficit, rejecting a negative one.
///
/// `tolerance` is relative to `max(1, pot + deficit)` and only absorbs
/// rounding; the returned surplus is never clamped.
pub fn checked_surplus(pot: Money, deficit: Money, tolerance: f64) -> AllocationResult<Money> {
    let surplus = pot - deficit;
    let scale = (pot + deficit).max(1.0);
    if surplus < -tolerance * scale {
        return Err(AllocationError::ComputationInvariant {
            pot,
            deficit,
            surplus,
        });
    }
    Ok(surplus)
}

pub fn settle(
    matrix: &ValuationMatrix,
    assignment: &Assignment,
    fair_shares: &[Money],
    config: &AllocationConfig,
) -> AllocationResult<Ledger> {
    assignment.check_against(matrix)?;
    matrix.check_per_agent(fair_shares.len())?;

    let strategy = &config.strategy;
    let n = matrix.num_agents();
    let bundles = assignment.bundles(n);

    let values_won = strategy.map_range(n, |agent| {
        matrix.agent_value_for_bundle(AgentId(agent as u32), &bundles[agent])
    });
    let raw_adjustments: Vec<Money> = values_won
        .iter()
        .zip(fair_shares)
        .map(|(won, share)| won - share)
        .collect();

    // Partition-then-merge; partials merge in partition order.
    let totals = strategy
        .map_partitions(n, config.partition_size, |range| {
            raw_adjustments[range]
                .iter()
                .fold(PotPartial::default(), |acc, &raw| {
                    if raw > 0.0 {
                        PotPartial {
                            pot: acc.pot + raw,
                            ..acc
                        }
                    } else {
                        PotPartial {
                            deficit: acc.deficit - raw,
                            ..acc
                        }
                    }
                })
        })
        .into_iter()
        .fold(PotPartial::default(), PotPartial::merge);

    let surplus = checked_surplus(totals.pot, totals.deficit, config.tolerance)?;
    let surplus_share = surplus / n as f64;
    let net_payments = strategy.map_range(n, |agent| -raw_adjustments[agent] + surplus_share);

    Ok(Ledger {
        values_won,
        raw_adjustments,
        net_payments,
        pot: totals.pot,
        deficit: totals.deficit,
        surplus,
        surplus_share,
    })
}
