//! Reseeding search - greedy swaps toward a canonical seeded bracket
//!
//! Level 1 - Orchestration and Level 2 - Passes
//!
//! The search is a local one: it stops at the first arrangement where no
//! single swap improves the residuals of the two pairings it touches.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::SortConfig;
use crate::error::StructuralError;
use crate::node::NodeId;
use crate::tree::BracketTree;

/// Which adjustment pass produced a swap
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapPass {
    /// Leaves inside two-entry or entry-plus-match pairings
    Leaf,
    /// Anything below a pairing of five or more nodes
    Branch,
}

/// A swap applied during a sort
#[derive(Clone, Debug, PartialEq)]
pub struct SwapEvent {
    pub pass: SwapPass,
    pub first: NodeId,
    pub second: NodeId,
    pub rating: f64,
}

/// Summary of a sort
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SortReport {
    pub leaf_swaps: usize,
    pub branch_swaps: usize,
    /// Leaf-pass/branch-pass round trips
    pub rounds: usize,
    /// No improving swap remains, or the passes came back to an
    /// arrangement they had already produced
    pub converged: bool,
    /// The passes undid each other's swaps
    pub cycled: bool,
}

impl SortReport {
    /// Total swaps applied
    pub fn swaps(&self) -> usize {
        self.leaf_swaps + self.branch_swaps
    }
}

/// Receives progress from a running sort
pub trait SwapObserver {
    fn on_swap(&mut self, tree: &BracketTree, event: &SwapEvent) {
        let _ = (tree, event);
    }

    fn on_round(&mut self, tree: &BracketTree, report: &SortReport) {
        let _ = (tree, report);
    }
}

impl SwapObserver for () {}

/// Logs swaps at `debug` and the rendered bracket at `trace`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl SwapObserver for TracingObserver {
    fn on_swap(&mut self, tree: &BracketTree, event: &SwapEvent) {
        tracing::debug!(
            "{:?} swap {} <-> {} (rating {:.2})",
            event.pass,
            describe(tree, event.first),
            describe(tree, event.second),
            event.rating
        );
    }

    fn on_round(&mut self, tree: &BracketTree, report: &SortReport) {
        tracing::trace!("After round {}:\n{}", report.rounds, tree);
    }
}

fn describe(tree: &BracketTree, id: NodeId) -> String {
    match tree.entry(id) {
        Some(entry) => format!("{} ({})", entry.name, entry.rank),
        None => format!("match {:?} (rank {})", id, tree.rank(id)),
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

impl BracketTree {
    /// Reseed the bracket with default limits, logging through `tracing`
    pub fn sort(&mut self) -> Result<SortReport, StructuralError> {
        self.sort_with(&SortConfig::default(), &mut TracingObserver)
    }

    /// Reseed the bracket.
    ///
    /// Each round runs the leaf pass to a fixed point, then the branch pass.
    /// Rounds repeat until the branch pass finds nothing. With tied ranks
    /// the two passes can trade the same swaps back and forth, so the sort
    /// also stops once a round ends on an arrangement of ranks seen before.
    pub fn sort_with<O: SwapObserver>(
        &mut self,
        config: &SortConfig,
        observer: &mut O,
    ) -> Result<SortReport, StructuralError> {
        let mut report = SortReport::default();
        let mut budget = config.max_swaps;
        let mut seen = FxHashSet::default();
        seen.insert(self.arrangement());

        while report.rounds < config.max_rounds {
            report.rounds += 1;

            let leaf_swaps = self.adjust(SwapPass::Leaf, config, &mut budget, observer)?;
            let branch_swaps = if config.branch_pass {
                self.adjust(SwapPass::Branch, config, &mut budget, observer)?
            } else {
                0
            };
            report.leaf_swaps += leaf_swaps;
            report.branch_swaps += branch_swaps;
            observer.on_round(self, &report);

            if budget == 0 {
                tracing::warn!("Swap limit of {} reached", config.max_swaps);
                report.converged = self.is_settled(config);
                break;
            }
            if branch_swaps == 0 {
                report.converged = true;
                break;
            }
            if !seen.insert(self.arrangement()) {
                tracing::debug!("Round {} repeated an earlier arrangement", report.rounds);
                report.converged = true;
                report.cycled = true;
                break;
            }
        }

        if !report.converged && report.rounds >= config.max_rounds {
            tracing::warn!("Sort stopped after {} rounds without settling", report.rounds);
        }

        tracing::info!(
            "Sorted bracket: {} leaf swaps, {} branch swaps, {} rounds, total residual {}",
            report.leaf_swaps,
            report.branch_swaps,
            report.rounds,
            self.total_residual()
        );
        Ok(report)
    }

    // ========================================================================
    // Level 2 - Passes
    // ========================================================================

    /// Apply the best swap for the first unsettled pairing until none remains
    fn adjust<O: SwapObserver>(
        &mut self,
        pass: SwapPass,
        config: &SortConfig,
        budget: &mut usize,
        observer: &mut O,
    ) -> Result<usize, StructuralError> {
        let mut swaps = 0;

        while *budget > 0 {
            let Some((first, second, rating)) = self.next_swap(pass, config.tolerance) else {
                break;
            };
            self.swap(first, second)?;
            *budget -= 1;
            swaps += 1;

            let event = SwapEvent { pass, first, second, rating };
            observer.on_swap(self, &event);
        }

        Ok(swaps)
    }

    /// Shape and rank of every node in traversal order
    fn arrangement(&self) -> Vec<(usize, u64)> {
        self.traverse()
            .map(|id| (self.count(id), self.rank(id).to_bits()))
            .collect()
    }

    /// Does neither pass have an improving swap left?
    fn is_settled(&self, config: &SortConfig) -> bool {
        self.next_swap(SwapPass::Leaf, config.tolerance).is_none()
            && (!config.branch_pass || self.next_swap(SwapPass::Branch, config.tolerance).is_none())
    }

    // ========================================================================
    // Level 3 - Steps
    // ========================================================================

    /// First pairing with a nonzero residual that has an improving partner
    fn next_swap(&self, pass: SwapPass, tolerance: f64) -> Option<(NodeId, NodeId, f64)> {
        let pairs = self.swap_pairs(pass);

        for &(node, parent) in &pairs {
            if self.residual(parent).abs() <= tolerance {
                continue;
            }

            let mut best: Option<(NodeId, f64)> = None;
            for &(other, other_parent) in &pairs {
                if other == node {
                    continue;
                }
                let rating = self.rate_swap(node, parent, other, other_parent);
                if rating > tolerance && best.map_or(true, |(_, top)| rating > top) {
                    best = Some((other, rating));
                }
            }

            if let Some((other, rating)) = best {
                return Some((node, other, rating));
            }
        }

        None
    }

    /// `(node, parent)` pairs a pass may move, in traversal order
    fn swap_pairs(&self, pass: SwapPass) -> Vec<(NodeId, NodeId)> {
        self.traverse()
            .filter_map(|id| {
                let parent = self.parent(id)?;
                let slot = self.get(id);
                let eligible = match pass {
                    SwapPass::Leaf => slot.is_leaf() && matches!(self.count(parent), 3 | 5),
                    SwapPass::Branch => !matches!(self.count(parent), 1 | 3),
                };
                eligible.then_some((id, parent))
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
