//! Standard seeded layout from a flat participant list
//!
//! Seed 1 meets the lowest seed, seed 2 the second lowest, and so on, with
//! the top seeds kept apart until the latest possible round. Seeds beyond
//! the participant count are byes: their opponent moves up a round.

use reseed_core::{bracket_size, BracketNode, RankedEntry};

use crate::error::ImportError;
use crate::ranking::assign_ranks;
use crate::records::ParticipantRecord;

/// Seed numbers in bracket order for `size` slots (a power of two)
pub fn seed_positions(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let total = order.len() * 2 + 1;
        order = order.iter().flat_map(|&seed| [seed, total - seed]).collect();
    }
    order
}

/// Lay entries into a bracket, the entry at index `i` taking seed `i + 1`
pub fn seeded_bracket(entries: &[RankedEntry]) -> Result<BracketNode, ImportError> {
    let positions = seed_positions(bracket_size(entries.len()));
    grow(entries, &positions)
        .ok_or_else(|| ImportError::Malformed("bracket has no participants".to_string()))
}

/// Rank the records and lay them out best rank first
pub fn ranked_bracket(participants: &[ParticipantRecord]) -> Result<BracketNode, ImportError> {
    let mut entries = assign_ranks(participants);
    entries.sort_by(|a, b| a.rank.total_cmp(&b.rank));
    seeded_bracket(&entries)
}

fn grow(entries: &[RankedEntry], positions: &[usize]) -> Option<BracketNode> {
    if let [seed] = positions {
        return entries.get(seed - 1).cloned().map(BracketNode::Leaf);
    }

    let (left, right) = positions.split_at(positions.len() / 2);
    match (grow(entries, left), grow(entries, right)) {
        (Some(left), Some(right)) => Some(BracketNode::branch(left, right)),
        (left, right) => left.or(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: u32) -> Vec<RankedEntry> {
        (1..=n).map(RankedEntry::seeded).collect()
    }

    fn ranks(node: &BracketNode) -> Vec<f64> {
        node.entries().iter().map(|e| e.rank).collect()
    }

    #[test]
    fn test_seed_positions() {
        assert_eq!(seed_positions(1), vec![1]);
        assert_eq!(seed_positions(2), vec![1, 2]);
        assert_eq!(seed_positions(4), vec![1, 4, 2, 3]);
        assert_eq!(seed_positions(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
    }

    #[test]
    fn test_power_of_two_layout() {
        let node = seeded_bracket(&entries(8)).unwrap();
        assert_eq!(node.count(), 15);
        assert_eq!(ranks(&node), vec![1.0, 8.0, 4.0, 5.0, 2.0, 7.0, 3.0, 6.0]);
    }

    #[test]
    fn test_byes_promote_top_seeds() {
        let node = seeded_bracket(&entries(5)).unwrap();
        assert_eq!(node.count(), 9);

        let expected = BracketNode::branch(
            BracketNode::branch(
                BracketNode::Leaf(RankedEntry::seeded(1)),
                BracketNode::branch(
                    BracketNode::Leaf(RankedEntry::seeded(4)),
                    BracketNode::Leaf(RankedEntry::seeded(5)),
                ),
            ),
            BracketNode::branch(
                BracketNode::Leaf(RankedEntry::seeded(2)),
                BracketNode::Leaf(RankedEntry::seeded(3)),
            ),
        );
        assert_eq!(node, expected);
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(seeded_bracket(&entries(1)).unwrap(), BracketNode::Leaf(RankedEntry::seeded(1)));
        assert!(matches!(seeded_bracket(&[]), Err(ImportError::Malformed(_))));
    }

    #[test]
    fn test_ranked_bracket_orders_by_rank() {
        let records = vec![
            ParticipantRecord::new("a", "Schubert", None),
            ParticipantRecord::new("b", "Chopin", Some(2.0)),
            ParticipantRecord::new("c", "Britten", Some(1.0)),
        ];
        let node = ranked_bracket(&records).unwrap();
        let names: Vec<_> = node.entries().iter().map(|e| e.name.as_str()).collect();
        // Britten takes the bye
        assert_eq!(names, vec!["Britten", "Chopin", "Schubert"]);
        assert_eq!(node.count(), 5);
    }
}
