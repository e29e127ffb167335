//! Bracket nodes
//!
//! `BracketNode` is the owned, recursive form used to describe a bracket
//! before it is handed to a `BracketTree` (and to snapshot subtrees out of
//! one). Inside a tree every node lives in an arena `Slot` that caches its
//! rank, counts and phase.

use serde::{Deserialize, Serialize};

use crate::entry::RankedEntry;
use crate::phase::PhaseInfo;

// ============================================================================
// OWNED NODES
// ============================================================================

/// A bracket slot: either a participant or the winner of a two-way match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BracketNode {
    Leaf(RankedEntry),
    Branch(Box<BracketNode>, Box<BracketNode>),
}

impl BracketNode {
    pub fn leaf(name: impl Into<String>, rank: f64) -> Self {
        BracketNode::Leaf(RankedEntry::new(name, rank))
    }

    pub fn branch(left: BracketNode, right: BracketNode) -> Self {
        BracketNode::Branch(Box::new(left), Box::new(right))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BracketNode::Leaf(_))
    }

    /// Lowest rank beneath this node
    pub fn rank(&self) -> f64 {
        match self {
            BracketNode::Leaf(entry) => entry.rank,
            BracketNode::Branch(left, right) => left.rank().min(right.rank()),
        }
    }

    /// Nodes in this subtree, including this one.
    ///
    /// Every branch has exactly two children, so equal counts mean equal shape.
    pub fn count(&self) -> usize {
        match self {
            BracketNode::Leaf(_) => 1,
            BracketNode::Branch(left, right) => left.count() + right.count() + 1,
        }
    }

    /// Leaves in this subtree
    pub fn count_ranked(&self) -> usize {
        match self {
            BracketNode::Leaf(_) => 1,
            BracketNode::Branch(left, right) => left.count_ranked() + right.count_ranked(),
        }
    }

    /// Sum of the two members' ranks; `None` for a leaf
    pub fn sum_members(&self) -> Option<f64> {
        match self {
            BracketNode::Leaf(_) => None,
            BracketNode::Branch(left, right) => Some(left.rank() + right.rank()),
        }
    }

    pub fn compare_structure(&self, other: &BracketNode) -> bool {
        self.count() == other.count()
    }

    /// Deviation from ideal seeding if this node sat in `phase`
    pub fn residual(&self, phase: &PhaseInfo) -> f64 {
        match self {
            BracketNode::Leaf(entry) => leaf_residual(entry.rank, phase),
            BracketNode::Branch(left, right) => {
                branch_residual(left.rank() + right.rank(), phase)
            }
        }
    }

    /// Entries in bracket order (left to right)
    pub fn entries(&self) -> Vec<&RankedEntry> {
        let mut out = Vec::with_capacity(self.count_ranked());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                BracketNode::Leaf(entry) => out.push(entry),
                BracketNode::Branch(left, right) => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }
}

/// Signed distance of `rank` outside the phase's rank window
pub(crate) fn leaf_residual(rank: f64, phase: &PhaseInfo) -> f64 {
    if phase.admits(rank) {
        0.0
    } else if rank < phase.min_rank() {
        rank - phase.min_rank()
    } else {
        rank - phase.max_rank()
    }
}

/// Deviation of a pairing's rank sum from the ideal `2 * size + 1`
pub(crate) fn branch_residual(sum_members: f64, phase: &PhaseInfo) -> f64 {
    sum_members - 1.0 - 2.0 * phase.size()
}

// ============================================================================
// ARENA NODES
// ============================================================================

/// Node identifier (index into a tree's arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Payload of an arena node
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Leaf(RankedEntry),
    Branch { left: NodeId, right: NodeId },
}

/// A node stored in a `BracketTree`
#[derive(Clone, Debug)]
pub struct Slot {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) phase: PhaseInfo,
    pub(crate) rank: f64,
    pub(crate) count: usize,
    pub(crate) count_ranked: usize,
}

impl Slot {
    pub(crate) fn new(kind: NodeKind, parent: Option<NodeId>, phase: PhaseInfo) -> Self {
        Self {
            kind,
            parent,
            phase,
            rank: 0.0,
            count: 1,
            count_ranked: 1,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent link; bookkeeping only, the tree owns every node
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn phase(&self) -> PhaseInfo {
        self.phase
    }

    pub fn rank(&self) -> f64 {
        self.rank
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn count_ranked(&self) -> usize {
        self.count_ranked
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn entry(&self) -> Option<&RankedEntry> {
        match &self.kind {
            NodeKind::Leaf(entry) => Some(entry),
            NodeKind::Branch { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Branch { left, right } => Some((left, right)),
        }
    }

    pub fn compare_structure(&self, other: &Slot) -> bool {
        self.count == other.count
    }
}
