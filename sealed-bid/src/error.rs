//! Allocation errors

use thiserror::Error;

use crate::types::Money;

/// Error raised by the compensation procedure.
///
/// Input validation errors are raised before any computation starts, so a
/// caller never receives a partial allocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] MatrixDefect),

    #[error("empty instance: {agents} agents, {items} items")]
    EmptyInstance { agents: usize, items: usize },

    #[error("negative surplus {surplus} (pot {pot}, deficit {deficit})")]
    ComputationInvariant {
        pot: Money,
        deficit: Money,
        surplus: Money,
    },

    #[error("worker pool: {0}")]
    WorkerPool(String),

    #[error("config: {0}")]
    Config(String),
}

/// What exactly is wrong with a bid table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixDefect {
    #[error("agent {agent} has {found} bids, expected {expected}")]
    Ragged {
        agent: usize,
        expected: usize,
        found: usize,
    },

    #[error("agent {agent} bid {value} on item {item}")]
    NegativeBid { agent: usize, item: usize, value: f64 },

    #[error("agent {agent} bid on item {item} is not finite")]
    NonFiniteBid { agent: usize, item: usize },

    #[error("agent {agent:?} has no bid for item {item:?}")]
    MissingBid { agent: String, item: String },

    #[error("expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("expected {expected} {axis} names, found {found}")]
    NameCount {
        axis: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unreadable instance: {0}")]
    Unreadable(String),

    #[error("{axis} index {index} out of range (len {len})")]
    IndexOutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },
}

/// Result type for allocation operations
pub type AllocationResult<T> = Result<T, AllocationError>;
