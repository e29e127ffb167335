//! Reseed Import - Building brackets from tournament records
//!
//! This crate turns externally supplied tournament data into bracket trees:
//! - Participant and match records (JSON)
//! - Rank interpolation for unranked participants
//! - Match-tree resolution from the final down to participants
//! - Standard seeded layout from a flat participant list

mod builder;
mod error;
mod layout;
mod ranking;
mod records;

pub use builder::{build_bracket, build_tree};
pub use error::ImportError;
pub use layout::{ranked_bracket, seed_positions, seeded_bracket};
pub use ranking::{assign_ranks, unranked_rank};
pub use records::{MatchRecord, ParticipantRecord, SlotRef, TournamentRecords};
