//! Bracket construction from match records
//!
//! The final is resolved first; each slot either recurses into the
//! prerequisite match feeding it or bottoms out at a participant.

use reseed_core::{BracketNode, BracketTree, RankedEntry};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::ImportError;
use crate::ranking::assign_ranks;
use crate::records::{MatchRecord, SlotRef, TournamentRecords};

/// Build and annotate a bracket tree from tournament records
pub fn build_tree(records: &TournamentRecords) -> Result<BracketTree, ImportError> {
    Ok(BracketTree::build(build_bracket(records)?))
}

/// Resolve tournament records into an owned bracket
pub fn build_bracket(records: &TournamentRecords) -> Result<BracketNode, ImportError> {
    let entries = index_entries(records)?;

    if records.matches.is_empty() {
        // A lone entrant has no matches to play
        let mut entries = entries.into_values();
        return match (entries.next(), entries.next()) {
            (Some(entry), None) => Ok(BracketNode::Leaf(entry)),
            _ => Err(ImportError::NoFinal),
        };
    }

    let matches = index_matches(records)?;
    let final_match = find_final(&records.matches)?;
    tracing::debug!(
        "Resolving bracket from final {} (round {})",
        final_match.id,
        final_match.round
    );

    let mut resolver = Resolver {
        matches,
        entries,
        placed: FxHashSet::default(),
        visited: FxHashSet::default(),
    };
    let bracket = resolver.resolve_match(final_match)?;

    if !resolver.entries.is_empty() {
        let mut unplaced: Vec<_> = resolver.entries.keys().copied().collect();
        unplaced.sort_unstable();
        return Err(ImportError::Malformed(format!(
            "participants not reached from the final: {}",
            unplaced.join(", ")
        )));
    }
    tracing::debug!(
        "Resolved {} matches, {} participants",
        resolver.visited.len(),
        resolver.placed.len()
    );

    Ok(bracket)
}

/// The final is the latest-round match that feeds no other match
fn find_final(matches: &[MatchRecord]) -> Result<&MatchRecord, ImportError> {
    let referenced: FxHashSet<&str> = matches.iter().flat_map(|m| m.prerequisites()).collect();

    let mut candidates = matches.iter().filter(|m| !referenced.contains(m.id.as_str()));
    let first = candidates.next().ok_or(ImportError::NoFinal)?;

    let mut best = first;
    let mut tied = false;
    for candidate in candidates {
        if candidate.round > best.round {
            best = candidate;
            tied = false;
        } else if candidate.round == best.round {
            tied = true;
        }
    }

    if tied {
        return Err(ImportError::Malformed(format!(
            "several unreferenced matches in round {}",
            best.round
        )));
    }
    Ok(best)
}

fn index_entries(records: &TournamentRecords) -> Result<FxHashMap<&str, RankedEntry>, ImportError> {
    let mut entries = FxHashMap::default();
    for (record, entry) in records.participants.iter().zip(assign_ranks(&records.participants)) {
        if entries.insert(record.id.as_str(), entry).is_some() {
            return Err(ImportError::Malformed(format!("duplicate participant id {}", record.id)));
        }
    }
    Ok(entries)
}

fn index_matches(records: &TournamentRecords) -> Result<FxHashMap<&str, &MatchRecord>, ImportError> {
    let mut matches = FxHashMap::default();
    for record in &records.matches {
        if matches.insert(record.id.as_str(), record).is_some() {
            return Err(ImportError::Malformed(format!("duplicate match id {}", record.id)));
        }
    }
    Ok(matches)
}

struct Resolver<'a> {
    matches: FxHashMap<&'a str, &'a MatchRecord>,
    /// Entries not yet placed
    entries: FxHashMap<&'a str, RankedEntry>,
    placed: FxHashSet<&'a str>,
    visited: FxHashSet<&'a str>,
}

impl<'a> Resolver<'a> {
    fn resolve_match(&mut self, record: &'a MatchRecord) -> Result<BracketNode, ImportError> {
        if !self.visited.insert(record.id.as_str()) {
            return Err(ImportError::Malformed(format!(
                "match {} is reached more than once",
                record.id
            )));
        }

        let left = self.resolve_slot(record, record.player1.as_ref(), 1)?;
        let right = self.resolve_slot(record, record.player2.as_ref(), 2)?;
        Ok(BracketNode::branch(left, right))
    }

    fn resolve_slot(
        &mut self,
        record: &'a MatchRecord,
        slot: Option<&'a SlotRef>,
        position: u8,
    ) -> Result<BracketNode, ImportError> {
        match slot {
            None => Err(ImportError::MissingSlot {
                match_id: record.id.clone(),
                slot: position,
            }),
            Some(SlotRef::Match(id)) => {
                let prerequisite = self.matches.get(id.as_str()).copied().ok_or_else(|| {
                    ImportError::UnknownMatch {
                        match_id: record.id.clone(),
                        reference: id.clone(),
                    }
                })?;
                self.resolve_match(prerequisite)
            }
            Some(SlotRef::Participant(id)) => {
                if let Some(entry) = self.entries.remove(id.as_str()) {
                    self.placed.insert(id.as_str());
                    Ok(BracketNode::Leaf(entry))
                } else if self.placed.contains(id.as_str()) {
                    Err(ImportError::Malformed(format!(
                        "participant {} is placed more than once",
                        id
                    )))
                } else {
                    Err(ImportError::UnknownParticipant {
                        match_id: record.id.clone(),
                        participant: id.clone(),
                    })
                }
            }
        }
    }
}
