//! Parameter grid for the sweep
//!
//! The sweep is the full Cartesian product of the two parameter lists,
//! iterated in a fixed nested order so runs are reproducible.

use itertools::Itertools;

/// Breakout ATR buffer values swept when none are given on the CLI.
pub const DEFAULT_BUFFERS: &[f64] = &[0.25, 0.30, 0.35];

/// Trailing-stop ATR multipliers swept when none are given on the CLI.
pub const DEFAULT_TRAIL_MULTS: &[f64] = &[0.90, 1.10, 1.30];

/// The two swept parameter axes
#[derive(Debug, Clone)]
pub struct ParamGrid {
    pub buffers: Vec<f64>,
    pub trail_multipliers: Vec<f64>,
}

impl ParamGrid {
    pub fn new(buffers: Vec<f64>, trail_multipliers: Vec<f64>) -> Self {
        ParamGrid {
            buffers,
            trail_multipliers,
        }
    }

    /// Grid used when the CLI overrides neither axis
    pub fn default_grid() -> Self {
        ParamGrid::new(DEFAULT_BUFFERS.to_vec(), DEFAULT_TRAIL_MULTS.to_vec())
    }

    /// All cells in sweep order: outer loop over buffers, inner over trail
    /// multipliers
    pub fn cells(&self) -> Vec<(f64, f64)> {
        self.buffers
            .iter()
            .cartesian_product(self.trail_multipliers.iter())
            .map(|(&buf, &trail)| (buf, trail))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.buffers.len() * self.trail_multipliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty() || self.trail_multipliers.is_empty()
    }
}
