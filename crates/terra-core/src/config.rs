//! Configuration types for the simulation.

use serde::{Deserialize, Serialize};

/// Grid construction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of rows in the grid
    pub rows: u32,
    /// Number of columns in the grid
    pub cols: u32,
    /// Seed string driving all randomness; generated when absent
    pub seed: Option<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 50,
            cols: 50,
            seed: None,
        }
    }
}

/// Parameters for running a simulation to completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Safety bound on the number of ticks a full run may take
    pub max_ticks: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { max_ticks: 10_000 }
    }
}
