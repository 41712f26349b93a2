//! Sealed-bid compensation procedure ("bidding for envy-freeness").
//!
//! Every item goes to its highest bidder; money then flows through a
//! compensation pot so that each agent ends up with at least its fair share
//! (its own valuation of everything divided by the number of agents), plus an
//! equal cut of whatever surplus the bidding produced. Payments sum to zero.
//!
//! ```
//! use sealed_bid::{bidding_for_envy_freeness, AgentId, ValuationMatrix};
//!
//! let bids = ValuationMatrix::from_rows(&[vec![10.0, 2.0], vec![4.0, 8.0]]).unwrap();
//! let allocation = bidding_for_envy_freeness(&bids).unwrap();
//! assert_eq!(allocation.net_payment(AgentId(0)), -1.0);
//! assert_eq!(allocation.net_payment(AgentId(1)), 1.0);
//! ```

pub mod allocation;
pub mod assignment;
pub mod config;
pub mod error;
pub mod execution;
pub mod fair_share;
pub mod generate;
pub mod input;
pub mod ledger;
pub mod matrix;
pub mod procedure;
pub mod registry;
pub mod types;
mod wasm;

#[cfg(feature = "instrument")]
pub use instrument;

pub use allocation::{AgentOutcome, Allocation};
pub use assignment::{Assignment, assign, column_winner};
pub use config::AllocationConfig;
pub use error::{AllocationError, AllocationResult, MatrixDefect};
pub use execution::ExecutionStrategy;
pub use fair_share::fair_shares;
pub use input::Instance;
pub use ledger::{Ledger, checked_surplus, settle};
pub use matrix::ValuationMatrix;
pub use procedure::{bidding_for_envy_freeness, bidding_for_envy_freeness_with};
pub use registry::{Algorithm, AlgorithmOutput, InputKind, divide};
pub use types::{AgentId, Bid, ItemId, Money};
pub use wasm::{allocate_bids, random_bids};
