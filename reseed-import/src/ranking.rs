//! Rank assignment for participant records

use reseed_core::RankedEntry;

use crate::records::ParticipantRecord;

/// Rank given to every unranked participant.
///
/// Unranked entrants share the average of the places after the last ranked
/// one: `max_rank + (unranked + 1) / 2`.
pub fn unranked_rank(participants: &[ParticipantRecord]) -> f64 {
    let max_rank = participants
        .iter()
        .filter_map(|p| p.rank)
        .fold(0.0, f64::max);
    let unranked = participants.iter().filter(|p| p.rank.is_none()).count();

    max_rank + (unranked as f64 + 1.0) / 2.0
}

/// Turn records into entries, in input order
pub fn assign_ranks(participants: &[ParticipantRecord]) -> Vec<RankedEntry> {
    let fallback = unranked_rank(participants);

    participants
        .iter()
        .map(|p| RankedEntry {
            name: p.name.clone(),
            rank: p.rank.unwrap_or(fallback),
            tags: p.tags.clone(),
        })
        .collect()
}
