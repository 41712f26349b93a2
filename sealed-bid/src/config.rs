use serde::{Deserialize, Serialize};

use crate::error::{AllocationError, AllocationResult};
use crate::execution::ExecutionStrategy;

/// Knobs for one run of the compensation procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    pub strategy: ExecutionStrategy,
    /// Relative tolerance for the surplus check (scaled by pot + deficit).
    pub tolerance: f64,
    /// Agents per partition in the pot/deficit reduction.
    pub partition_size: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            strategy: ExecutionStrategy::Serial,
            tolerance: 1e-9,
            partition_size: 256,
        }
    }
}

impl AllocationConfig {
    pub fn parallel() -> Self {
        Self {
            strategy: ExecutionStrategy::parallel(),
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> AllocationResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AllocationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AllocationResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(AllocationError::Config(format!(
                "tolerance must be finite and >= 0, got {}",
                self.tolerance
            )));
        }
        if self.partition_size == 0 {
            return Err(AllocationError::Config("partition_size must be >= 1".into()));
        }
        if let ExecutionStrategy::Parallel { threads: Some(0) } = self.strategy {
            return Err(AllocationError::Config("threads must be >= 1".into()));
        }
        Ok(())
    }
}
