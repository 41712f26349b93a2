//! Uniform entry point for fair-division algorithms.
//!
//! Each algorithm declares once, in [`REGISTRY`], what input it takes. The
//! dispatcher reads that declaration instead of inspecting the algorithm, and
//! wraps raw outputs into an [`Allocation`] when the algorithm did not build
//! one itself.

use serde::{Deserialize, Serialize};

use crate::allocation::Allocation;
use crate::assignment::Assignment;
use crate::config::AllocationConfig;
use crate::error::{AllocationError, AllocationResult};
use crate::execution::ExecutionStrategy;
use crate::fair_share::fair_shares;
use crate::input::Instance;
use crate::ledger::Ledger;
use crate::matrix::ValuationMatrix;
use crate::procedure::bidding_for_envy_freeness_with;
use crate::types::{AgentId, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    BiddingForEnvyFreeness,
}

/// What an algorithm wants to be called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A validated valuation matrix
    NormalizedMatrix,
    /// The instance exactly as the caller supplied it
    RawInstance,
}

#[derive(Debug, Clone, Copy)]
pub struct AlgorithmDescriptor {
    pub algorithm: Algorithm,
    pub name: &'static str,
    pub input: InputKind,
}

const BIDDING_FOR_ENVY_FREENESS: AlgorithmDescriptor = AlgorithmDescriptor {
    algorithm: Algorithm::BiddingForEnvyFreeness,
    name: "bidding_for_envy_freeness",
    input: InputKind::NormalizedMatrix,
};

pub static REGISTRY: &[AlgorithmDescriptor] = &[BIDDING_FOR_ENVY_FREENESS];

pub fn descriptor(algorithm: Algorithm) -> &'static AlgorithmDescriptor {
    match algorithm {
        Algorithm::BiddingForEnvyFreeness => &BIDDING_FOR_ENVY_FREENESS,
    }
}

pub fn find(name: &str) -> Option<&'static AlgorithmDescriptor> {
    REGISTRY.iter().find(|d| d.name == name)
}

/// Either a bare item -> agent mapping with payments, or a finished result.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmOutput {
    Raw {
        winners: Vec<AgentId>,
        payments: Vec<Money>,
    },
    Wrapped(Allocation),
}

impl AlgorithmOutput {
    pub fn into_allocation(self, matrix: &ValuationMatrix) -> AllocationResult<Allocation> {
        match self {
            AlgorithmOutput::Wrapped(allocation) => Ok(allocation),
            AlgorithmOutput::Raw { winners, payments } => wrap_raw(matrix, winners, payments),
        }
    }
}

/// Build an allocation around payments someone else computed.
fn wrap_raw(
    matrix: &ValuationMatrix,
    winners: Vec<AgentId>,
    payments: Vec<Money>,
) -> AllocationResult<Allocation> {
    let n = matrix.num_agents();
    let assignment = Assignment::from_winners(winners);
    assignment.check_against(matrix)?;
    matrix.check_per_agent(payments.len())?;

    let shares = fair_shares(matrix, &ExecutionStrategy::Serial);
    let bundles = assignment.bundles(n);
    let values_won: Vec<Money> = matrix
        .agents()
        .map(|agent| matrix.agent_value_for_bundle(agent, &bundles[agent.index()]))
        .collect();
    let raw_adjustments: Vec<Money> = values_won
        .iter()
        .zip(&shares)
        .map(|(won, share)| won - share)
        .collect();
    let pot: Money = raw_adjustments.iter().filter(|r| **r > 0.0).sum();
    let deficit: Money = raw_adjustments.iter().filter(|r| **r < 0.0).map(|r| -r).sum();
    let surplus = pot - deficit;

    let ledger = Ledger {
        values_won,
        raw_adjustments,
        net_payments: payments,
        pot,
        deficit,
        surplus,
        surplus_share: surplus / n as f64,
    };
    Allocation::build(matrix, &assignment, &shares, &ledger)
}

impl Algorithm {
    pub fn descriptor(self) -> &'static AlgorithmDescriptor {
        descriptor(self)
    }

    pub fn allocate(
        self,
        matrix: &ValuationMatrix,
        config: &AllocationConfig,
    ) -> AllocationResult<AlgorithmOutput> {
        match self {
            Algorithm::BiddingForEnvyFreeness => {
                bidding_for_envy_freeness_with(matrix, config).map(AlgorithmOutput::Wrapped)
            }
        }
    }
}

/// Run `algorithm` on a caller-supplied instance and return a full allocation.
pub fn divide(
    algorithm: Algorithm,
    instance: Instance,
    config: &AllocationConfig,
) -> AllocationResult<Allocation> {
    match algorithm.descriptor().input {
        InputKind::NormalizedMatrix => {
            let matrix = instance.into_matrix()?;
            algorithm.allocate(&matrix, config)?.into_allocation(&matrix)
        }
        InputKind::RawInstance => Err(AllocationError::Config(format!(
            "{} has no raw-instance entry point",
            algorithm.descriptor().name
        ))),
    }
}
