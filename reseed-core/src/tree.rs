//! Bracket tree structure and swap search
//!
//! Uses arena allocation: every node lives in one `Vec<Slot>` owned by the
//! tree and is addressed by `NodeId`. Parent links are plain ids.
//!
//! ## Architecture
//! - Level 2: Tree operations (build, swap, reposition)
//! - Level 3: Swap rating and candidate search
//! - Level 4: Cached aggregates, phase assignment, accessors

use crate::entry::RankedEntry;
use crate::error::StructuralError;
use crate::node::{branch_residual, leaf_residual, BracketNode, NodeId, NodeKind, Slot};
use crate::phase::PhaseInfo;

// ============================================================================
// BRACKET TREE (Level 2 - Tree Operations)
// ============================================================================

/// Single-elimination bracket with arena-allocated nodes
#[derive(Clone, Debug)]
pub struct BracketTree {
    /// Arena storage for nodes
    nodes: Vec<Slot>,
    root: NodeId,
    participants: usize,
    root_phase: PhaseInfo,
}

impl BracketTree {
    /// Take ownership of a bracket and annotate every node
    pub fn build(root: BracketNode) -> Self {
        let participants = root.count_ranked();
        let root_phase = PhaseInfo::outermost(participants).shifted_to_top();

        let mut nodes = Vec::with_capacity(root.count());
        let root_id = flatten(&mut nodes, root, None, root_phase);

        let mut tree = Self {
            nodes,
            root: root_id,
            participants,
            root_phase,
        };
        tree.recompute(root_id);
        tree.set_phase(root_id, root_phase);

        tracing::debug!(
            "Built bracket: {} participants, {} nodes, {} phases",
            participants,
            tree.len(),
            root_phase.index() + 1
        );
        tree
    }

    /// Swap the contents of two nodes in place.
    ///
    /// Leaves exchange their entries, branches exchange their children. The
    /// nodes themselves keep their position, parent and phase.
    pub fn swap(&mut self, a: NodeId, b: NodeId) -> Result<(), StructuralError> {
        // A node counts as nested in itself
        if a == b || self.is_ancestor(a, b) {
            return Err(StructuralError::Nested { outer: a, inner: b });
        }
        if self.is_ancestor(b, a) {
            return Err(StructuralError::Nested { outer: b, inner: a });
        }
        match (self.get(a).is_leaf(), self.get(b).is_leaf()) {
            (true, false) => return Err(StructuralError::KindMismatch { leaf: a, branch: b }),
            (false, true) => return Err(StructuralError::KindMismatch { leaf: b, branch: a }),
            _ => {}
        }

        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        std::mem::swap(&mut head[lo].kind, &mut tail[0].kind);

        for id in [a, b] {
            if let Some((left, right)) = self.get(id).children() {
                self.get_mut(left).parent = Some(id);
                self.get_mut(right).parent = Some(id);
                let phase = self.get(id).phase;
                self.set_phase(id, phase);
            }
            self.refresh_upward(id);
        }

        Ok(())
    }

    /// Reposition `node` and everything beneath it.
    ///
    /// Children settle first; then the whole tree is searched for the best
    /// partner for `node` and the swap is applied if it improves the bracket.
    /// Returns the number of swaps applied.
    pub fn reposition(&mut self, node: NodeId) -> Result<usize, StructuralError> {
        let mut swaps = 0;

        if let Some((left, right)) = self.get(node).children() {
            swaps += self.reposition(left)?;
            swaps += self.reposition(right)?;
        }

        if let Some(candidate) = self.find_swap_candidate(self.root, node) {
            self.swap(node, candidate)?;
            swaps += 1;
        }

        Ok(swaps)
    }

    /// Assign `phase` to a node and cascade to its descendants
    pub fn set_phase(&mut self, id: NodeId, phase: PhaseInfo) {
        let mut stack = vec![(id, phase)];
        while let Some((current, phase)) = stack.pop() {
            let slot = self.get_mut(current);
            slot.phase = phase;
            if let Some((left, right)) = slot.children() {
                stack.push((right, phase.shifted(-1)));
                stack.push((left, phase.shifted(-1)));
            }
        }
    }

    // ========================================================================
    // Level 3: Swap Rating
    // ========================================================================

    /// Rate swapping `a` (under `a_parent`) with `b` (under `b_parent`).
    ///
    /// Positive means the swap lowers the parents' combined absolute residual.
    /// Nodes of different shape are never swapped and rate 0.
    pub fn rate_swap(&self, a: NodeId, a_parent: NodeId, b: NodeId, b_parent: NodeId) -> f64 {
        if a == b || !self.compare_structure(a, b) {
            return 0.0;
        }

        let residual_a = self.residual(a_parent);
        let residual_b = self.residual(b_parent);
        let rank_a = self.rank(a);
        let rank_b = self.rank(b);

        residual_a.abs() + residual_b.abs()
            - (residual_a - rank_a + rank_b).abs()
            - (residual_b - rank_b + rank_a).abs()
    }

    /// Rate a swap using each node's current parent; the root rates 0
    pub fn swap_rating(&self, a: NodeId, b: NodeId) -> f64 {
        match (self.parent(a), self.parent(b)) {
            (Some(a_parent), Some(b_parent)) => self.rate_swap(a, a_parent, b, b_parent),
            _ => 0.0,
        }
    }

    /// Best strictly improving swap partner for `target` beneath `under`
    pub fn find_swap_candidate(&self, under: NodeId, target: NodeId) -> Option<NodeId> {
        let mut best = None;
        let mut best_rating = 0.0;

        for candidate in self.traverse_from(under) {
            let rating = self.swap_rating(candidate, target);
            if rating > best_rating {
                best_rating = rating;
                best = Some(candidate);
            }
        }

        best
    }

    // ========================================================================
    // Level 3: Traversal and Export
    // ========================================================================

    /// Depth-first traversal of the whole tree, parents before children
    pub fn traverse(&self) -> Traverse<'_> {
        self.traverse_from(self.root)
    }

    /// Depth-first traversal of the subtree rooted at `id`
    pub fn traverse_from(&self, id: NodeId) -> Traverse<'_> {
        Traverse {
            tree: self,
            stack: vec![id],
        }
    }

    /// Nodes currently assigned to the phase with the given index
    pub fn phase_nodes(&self, index: i32) -> Vec<NodeId> {
        self.traverse()
            .filter(|&id| self.get(id).phase.index() == index)
            .collect()
    }

    /// Entries in bracket order (left to right)
    pub fn leaves(&self) -> Vec<&RankedEntry> {
        self.traverse().filter_map(|id| self.get(id).entry()).collect()
    }

    /// Entries grouped by round, the phase nearest the final first.
    ///
    /// Byes come before first-round players; bracket order is kept within a
    /// phase. This is the order a sequential-pairing host expects.
    pub fn entries_by_phase(&self) -> Vec<&RankedEntry> {
        let mut leaves: Vec<(i32, &RankedEntry)> = self
            .traverse()
            .filter_map(|id| {
                let slot = self.get(id);
                slot.entry().map(|entry| (slot.phase.index(), entry))
            })
            .collect();
        leaves.sort_by_key(|&(index, _)| std::cmp::Reverse(index));
        leaves.into_iter().map(|(_, entry)| entry).collect()
    }

    /// Rebuild an owned copy of the subtree rooted at `id`
    pub fn to_node(&self, id: NodeId) -> BracketNode {
        match &self.get(id).kind {
            NodeKind::Leaf(entry) => BracketNode::Leaf(entry.clone()),
            NodeKind::Branch { left, right } => {
                BracketNode::branch(self.to_node(*left), self.to_node(*right))
            }
        }
    }

    /// Sum of absolute residuals over every node
    pub fn total_residual(&self) -> f64 {
        self.traverse().map(|id| self.residual(id).abs()).sum()
    }

    // ========================================================================
    // Level 4: Node Accessors
    // ========================================================================

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn participants(&self) -> usize {
        self.participants
    }

    pub fn root_phase(&self) -> PhaseInfo {
        self.root_phase
    }

    /// Get a reference to a node
    pub fn get(&self, id: NodeId) -> &Slot {
        &self.nodes[id.0]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Slot {
        &mut self.nodes[id.0]
    }

    /// Get the number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A bracket always holds at least one entry
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn rank(&self, id: NodeId) -> f64 {
        self.get(id).rank
    }

    pub fn count(&self, id: NodeId) -> usize {
        self.get(id).count
    }

    pub fn count_ranked(&self, id: NodeId) -> usize {
        self.get(id).count_ranked
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        self.get(id).children()
    }

    pub fn entry(&self, id: NodeId) -> Option<&RankedEntry> {
        self.get(id).entry()
    }

    /// Sum of both members' ranks; `None` for a leaf
    pub fn sum_members(&self, id: NodeId) -> Option<f64> {
        self.children(id)
            .map(|(left, right)| self.rank(left) + self.rank(right))
    }

    /// Deviation of a node from ideal seeding at its assigned phase
    pub fn residual(&self, id: NodeId) -> f64 {
        let slot = self.get(id);
        match self.sum_members(id) {
            Some(sum) => branch_residual(sum, &slot.phase),
            None => leaf_residual(slot.rank, &slot.phase),
        }
    }

    pub fn compare_structure(&self, a: NodeId, b: NodeId) -> bool {
        self.get(a).compare_structure(self.get(b))
    }

    /// Is `ancestor` a strict ancestor of `node`?
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    // ========================================================================
    // Level 4: Cached Aggregates
    // ========================================================================

    /// Recompute rank and counts for a whole subtree
    fn recompute(&mut self, id: NodeId) {
        if let Some((left, right)) = self.children(id) {
            self.recompute(left);
            self.recompute(right);
        }
        self.refresh(id);
    }

    /// Recompute rank and counts from a node up to the root
    fn refresh_upward(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            self.refresh(node_id);
            current = self.parent(node_id);
        }
    }

    /// Recompute one node from its (already current) children
    fn refresh(&mut self, id: NodeId) {
        let (rank, count, count_ranked) = match &self.get(id).kind {
            NodeKind::Leaf(entry) => (entry.rank, 1, 1),
            NodeKind::Branch { left, right } => {
                let left = self.get(*left);
                let right = self.get(*right);
                (
                    left.rank.min(right.rank),
                    left.count + right.count + 1,
                    left.count_ranked + right.count_ranked,
                )
            }
        };

        let slot = self.get_mut(id);
        slot.rank = rank;
        slot.count = count;
        slot.count_ranked = count_ranked;
    }
}

/// Move an owned subtree into the arena, returning its id
fn flatten(
    nodes: &mut Vec<Slot>,
    node: BracketNode,
    parent: Option<NodeId>,
    phase: PhaseInfo,
) -> NodeId {
    let id = NodeId(nodes.len());
    match node {
        BracketNode::Leaf(entry) => nodes.push(Slot::new(NodeKind::Leaf(entry), parent, phase)),
        BracketNode::Branch(left, right) => {
            // Children are linked once their ids are known
            nodes.push(Slot::new(NodeKind::Branch { left: id, right: id }, parent, phase));
            let left = flatten(nodes, *left, Some(id), phase.shifted(-1));
            let right = flatten(nodes, *right, Some(id), phase.shifted(-1));
            nodes[id.0].kind = NodeKind::Branch { left, right };
        }
    }
    id
}

/// Pre-order iterator over node ids (self, left subtree, right subtree)
pub struct Traverse<'a> {
    tree: &'a BracketTree,
    stack: Vec<NodeId>,
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some((left, right)) = self.tree.children(id) {
            self.stack.push(right);
            self.stack.push(left);
        }
        Some(id)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, rank: f64) -> BracketNode {
        BracketNode::leaf(name, rank)
    }

    fn seeded(rank: u32) -> BracketNode {
        BracketNode::Leaf(RankedEntry::seeded(rank))
    }

    fn pair(a: BracketNode, b: BracketNode) -> BracketNode {
        BracketNode::branch(a, b)
    }

    /// {{1, 2}, {7, 16}}
    fn four_fixture() -> BracketNode {
        pair(pair(seeded(1), seeded(2)), pair(seeded(7), seeded(16)))
    }

    /// {George, {Charles, Anakin}}
    fn george_fixture() -> BracketTree {
        BracketTree::build(pair(
            leaf("George", 3.0),
            pair(leaf("Charles", 1.0), leaf("Anakin", 2.0)),
        ))
    }

    fn name(tree: &BracketTree, id: usize) -> &str {
        tree.entry(NodeId(id)).map(|e| e.name.as_str()).unwrap_or("")
    }

    #[test]
    fn test_build_annotates_nodes() {
        let tree = BracketTree::build(four_fixture());

        assert_eq!(tree.participants(), 4);
        assert_eq!(tree.root(), NodeId(0));
        assert_eq!(tree.root_phase().size(), 1.0);
        assert_eq!(tree.count(tree.root()), 7);
        assert_eq!(tree.count_ranked(tree.root()), 4);
        assert_eq!(tree.rank(NodeId(4)), 7.0);
        assert_eq!(tree.sum_members(NodeId(4)), Some(23.0));
        assert_eq!(tree.parent(NodeId(5)), Some(NodeId(4)));
    }

    #[test]
    fn test_children_phase_is_one_step_out() {
        let tree = BracketTree::build(pair(seeded(1), seeded(2)));
        let (left, right) = tree.children(tree.root()).unwrap();

        assert_eq!(tree.get(tree.root()).phase().size(), 1.0);
        assert_eq!(tree.get(left).phase().size(), 2.0);
        assert_eq!(tree.get(left).phase(), tree.get(right).phase());
    }

    #[test]
    fn test_residuals_four_participants() {
        let tree = BracketTree::build(four_fixture());
        let residuals: Vec<f64> = tree.traverse().map(|id| tree.residual(id)).collect();

        // root, {1,2}, 1, 2, {7,16}, 7, 16
        assert_eq!(residuals, vec![5.0, -2.0, 0.0, 0.0, 18.0, 3.0, 12.0]);
    }

    #[test]
    fn test_residuals_six_participants() {
        let tree = BracketTree::build(pair(four_fixture(), pair(seeded(6), seeded(7))));
        let residuals: Vec<f64> = tree.traverse().map(|id| tree.residual(id)).collect();

        // root, {{1,2},{7,16}}, {1,2}, 1, 2, {7,16}, 7, 16, {6,7}, 6, 7
        assert_eq!(
            residuals,
            vec![4.0, 3.0, -6.0, -2.0, -1.0, 14.0, 0.0, 8.0, 8.0, 4.0, 5.0]
        );
    }

    #[test]
    fn test_count_matches_leaf_count() {
        for tree in [
            BracketTree::build(seeded(1)),
            BracketTree::build(four_fixture()),
            BracketTree::build(pair(four_fixture(), seeded(3))),
        ] {
            let root = tree.root();
            assert_eq!(tree.count(root), 2 * tree.count_ranked(root) - 1);
            assert_eq!(tree.count_ranked(root), tree.participants());
        }
    }

    #[test]
    fn test_traverse_covers_every_node_once() {
        let tree = BracketTree::build(pair(
            pair(seeded(5), pair(seeded(1), seeded(2))),
            pair(seeded(6), pair(seeded(3), seeded(4))),
        ));

        let mut seen: Vec<NodeId> = tree.traverse().collect();
        assert_eq!(seen.len(), tree.len());
        assert_eq!(seen[0], tree.root());

        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), tree.len());

        // Restartable
        assert_eq!(tree.traverse().count(), tree.len());
    }

    #[test]
    fn test_swap_leaves() {
        let mut tree = george_fixture();
        // 0 root, 1 George, 2 {Charles, Anakin}, 3 Charles, 4 Anakin
        assert_eq!(name(&tree, 1), "George");

        tree.swap(NodeId(3), NodeId(1)).unwrap();
        assert_eq!(name(&tree, 1), "Charles");
        assert_eq!(tree.rank(NodeId(1)), 1.0);
        assert_eq!(name(&tree, 3), "George");
        assert_eq!(tree.rank(NodeId(2)), 2.0);
        assert_eq!(tree.rank(tree.root()), 1.0);

        tree.swap(NodeId(1), NodeId(3)).unwrap();
        assert_eq!(name(&tree, 1), "George");
        assert_eq!(name(&tree, 3), "Charles");
    }

    #[test]
    fn test_swap_nested_fails_and_leaves_tree_unchanged() {
        let mut tree = george_fixture();
        let before = tree.to_node(tree.root());

        let err = tree.swap(NodeId(0), NodeId(2)).unwrap_err();
        assert_eq!(err, StructuralError::Nested { outer: NodeId(0), inner: NodeId(2) });

        let err = tree.swap(NodeId(4), NodeId(2)).unwrap_err();
        assert_eq!(err, StructuralError::Nested { outer: NodeId(2), inner: NodeId(4) });

        let err = tree.swap(NodeId(3), NodeId(3)).unwrap_err();
        assert_eq!(err, StructuralError::Nested { outer: NodeId(3), inner: NodeId(3) });

        assert_eq!(tree.to_node(tree.root()), before);
    }

    #[test]
    fn test_swap_kind_mismatch() {
        let mut tree = george_fixture();
        let before = tree.to_node(tree.root());

        let err = tree.swap(NodeId(2), NodeId(1)).unwrap_err();
        assert_eq!(err, StructuralError::KindMismatch { leaf: NodeId(1), branch: NodeId(2) });
        assert_eq!(tree.to_node(tree.root()), before);
    }

    #[test]
    fn test_swap_branches_of_different_shape() {
        // 0 root, 1 {a, {b, c}}, 2 a, 3 {b, c}, 4 b, 5 c, 6 {d, e}, 7 d, 8 e
        let mut tree = BracketTree::build(pair(
            pair(leaf("a", 1.0), pair(leaf("b", 2.0), leaf("c", 3.0))),
            pair(leaf("d", 4.0), leaf("e", 5.0)),
        ));

        tree.swap(NodeId(1), NodeId(6)).unwrap();

        assert_eq!(tree.count(NodeId(1)), 3);
        assert_eq!(tree.count(NodeId(6)), 5);
        assert_eq!(tree.count(tree.root()), 9);
        assert_eq!(tree.rank(NodeId(1)), 4.0);
        assert_eq!(tree.rank(NodeId(6)), 1.0);
        assert_eq!(tree.parent(NodeId(7)), Some(NodeId(1)));
        assert_eq!(tree.parent(NodeId(2)), Some(NodeId(6)));
        assert_eq!(tree.get(NodeId(7)).phase().index(), 1);
        assert_eq!(tree.get(NodeId(4)).phase().index(), 0);

        let names: Vec<_> = tree.leaves().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["d", "e", "a", "b", "c"]);
    }

    #[test]
    fn test_swap_twice_restores_tree() {
        let mut tree = BracketTree::build(pair(four_fixture(), pair(seeded(6), seeded(7))));
        let before = tree.to_node(tree.root());

        // {7,16} with {6,7}, then back
        tree.swap(NodeId(5), NodeId(8)).unwrap();
        assert_ne!(tree.to_node(tree.root()), before);
        tree.swap(NodeId(8), NodeId(5)).unwrap();
        assert_eq!(tree.to_node(tree.root()), before);

        tree.swap(NodeId(3), NodeId(10)).unwrap();
        tree.swap(NodeId(3), NodeId(10)).unwrap();
        assert_eq!(tree.to_node(tree.root()), before);
    }

    #[test]
    fn test_rate_swap_shape_mismatch_is_zero() {
        let tree = BracketTree::build(pair(
            pair(seeded(9), pair(seeded(1), seeded(2))),
            pair(seeded(3), seeded(30)),
        ));
        // 0 root, 1 {9,{1,2}}, 2 9, 3 {1,2}, 4 1, 5 2, 6 {3,30}, 7 3, 8 30
        for (a, b) in [(3, 7), (3, 2), (1, 6), (6, 8)] {
            let (a, b) = (NodeId(a), NodeId(b));
            let (pa, pb) = (tree.parent(a).unwrap(), tree.parent(b).unwrap());
            assert_eq!(tree.rate_swap(a, pa, b, pb), 0.0);
        }
        assert_eq!(tree.rate_swap(NodeId(4), NodeId(3), NodeId(4), NodeId(3)), 0.0);
    }

    #[test]
    fn test_find_swap_candidate() {
        let tree = BracketTree::build(pair(
            pair(seeded(1), seeded(2)),
            pair(seeded(3), seeded(4)),
        ));
        // 0 root, 1 {1,2}, 2 1, 3 2, 4 {3,4}, 5 3, 6 4
        assert_eq!(tree.swap_rating(NodeId(5), NodeId(2)), 4.0);
        assert_eq!(tree.swap_rating(NodeId(6), NodeId(2)), 2.0);
        assert_eq!(tree.find_swap_candidate(tree.root(), NodeId(2)), Some(NodeId(5)));
        assert_eq!(tree.find_swap_candidate(NodeId(1), NodeId(2)), None);
        assert_eq!(tree.find_swap_candidate(tree.root(), tree.root()), None);
    }

    #[test]
    fn test_reposition() {
        let mut tree = BracketTree::build(pair(
            pair(seeded(1), seeded(2)),
            pair(seeded(3), seeded(4)),
        ));
        assert!(tree.total_residual() > 0.0);

        let swaps = tree.reposition(tree.root()).unwrap();
        assert_eq!(swaps, 1);
        assert_eq!(tree.total_residual(), 0.0);
        assert_eq!(tree.reposition(tree.root()).unwrap(), 0);
    }

    #[test]
    fn test_phase_nodes_and_export_order() {
        // Five players: 1, 2, 3 get byes, 4 plays 5
        let tree = BracketTree::build(pair(
            pair(seeded(1), pair(seeded(4), seeded(5))),
            pair(seeded(2), seeded(3)),
        ));

        assert_eq!(tree.phase_nodes(3), vec![tree.root()]);
        assert_eq!(tree.phase_nodes(2).len(), 2);
        assert_eq!(tree.phase_nodes(0).len(), 2);

        let bracket: Vec<_> = tree.leaves().iter().map(|e| e.rank).collect();
        assert_eq!(bracket, vec![1.0, 4.0, 5.0, 2.0, 3.0]);

        let by_phase: Vec<_> = tree.entries_by_phase().iter().map(|e| e.rank).collect();
        assert_eq!(by_phase, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(tree.total_residual(), 0.0);
    }
}
