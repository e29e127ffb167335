//! Reseed Core - Bracket tree and reseeding search
//!
//! This crate provides the single-elimination bracket model:
//! - Ranked entries (participants with a seed-like rank)
//! - Phase geometry (expected rank window and slot count per round)
//! - Bracket nodes and the arena-backed bracket tree
//! - Greedy swap search that reseeds a tree toward a canonical bracket
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: BracketTree::sort (orchestration)
//! - Level 2: leaf and branch adjustment passes, reposition
//! - Level 3: rate_swap, find_swap_candidate, swap
//! - Level 4: phase arithmetic, rendering, configuration

pub mod config;
pub mod entry;
pub mod error;
pub mod node;
pub mod phase;
pub mod render;
pub mod sort;
pub mod tree;

// Re-exports for convenient access
pub use config::SortConfig;
pub use entry::RankedEntry;
pub use error::StructuralError;
pub use node::{BracketNode, NodeId, NodeKind, Slot};
pub use phase::{bracket_size, bye_count, first_round_matches, round_count, PhaseInfo};
pub use render::render;
pub use sort::{SortReport, SwapEvent, SwapObserver, SwapPass, TracingObserver};
pub use tree::{BracketTree, Traverse};
