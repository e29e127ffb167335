//! Configuration for bracket reseeding
//!
//! Level 4 - Utilities and configuration

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Limits and switches for `BracketTree::sort_with`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Maximum swaps applied over the whole sort
    pub max_swaps: usize,
    /// Maximum leaf-pass/branch-pass round trips
    pub max_rounds: usize,
    /// Residuals and ratings at or below this magnitude count as zero
    pub tolerance: f64,
    /// Run the branch-adjustment pass after the leaf pass
    pub branch_pass: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            max_swaps: 10_000,
            max_rounds: 64,
            tolerance: 1e-9,
            branch_pass: true,
        }
    }
}

impl SortConfig {
    /// Set the swap cap
    pub fn with_max_swaps(mut self, max_swaps: usize) -> Self {
        self.max_swaps = max_swaps;
        self
    }

    /// Set the round cap
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the zero tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Only adjust leaves
    pub fn leaves_only(mut self) -> Self {
        self.branch_pass = false;
        self
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sort config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid sort config {}", path.display()))
    }
}
