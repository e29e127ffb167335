//! Phase geometry - expected rank windows per bracket round
//!
//! Phase 0 is the outermost round, where `size()` equals the full bracket
//! size. Each step toward the final halves the size; the final match sits
//! in the phase whose size is 1.
//!
//! Level 4 - Utilities

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Smallest power of two that holds `participants` slots (at least 1)
pub fn bracket_size(participants: usize) -> usize {
    participants.max(1).next_power_of_two()
}

/// Number of rounds needed to reduce `participants` to one winner
pub fn round_count(participants: usize) -> u32 {
    bracket_size(participants).trailing_zeros()
}

/// Number of first-round byes
pub fn bye_count(participants: usize) -> usize {
    if participants == 0 {
        return 0;
    }
    bracket_size(participants) - participants
}

/// Number of matches played in the outermost round
pub fn first_round_matches(participants: usize) -> usize {
    if participants < 2 {
        return 0;
    }
    participants - bracket_size(participants) / 2
}

/// Structural information for one round of a bracket
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PhaseInfo {
    participants: usize,
    index: i32,
}

impl PhaseInfo {
    /// Create a phase for a bracket of `participants`.
    ///
    /// Negative indices count back from the final: `-1` is the final itself.
    pub fn new(participants: usize, index: i32) -> Self {
        let index = if index < 0 {
            index + Self::phase_count(participants)
        } else {
            index
        };
        Self { participants, index }
    }

    /// Outermost phase for a bracket of `participants`
    pub fn outermost(participants: usize) -> Self {
        Self::new(participants, 0)
    }

    /// Number of distinct phases from the outermost round to the final
    fn phase_count(participants: usize) -> i32 {
        round_count(participants) as i32 + 1
    }

    pub fn participants(&self) -> usize {
        self.participants
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    /// Number of slots in this phase
    pub fn size(&self) -> f64 {
        bracket_size(self.participants) as f64 * 2f64.powi(-self.index)
    }

    /// Lowest rank expected in this phase under standard seeding
    pub fn min_rank(&self) -> f64 {
        let size = self.size();
        let n = self.participants as f64;
        match self.index {
            0 => size - n + 1.0,
            1 => (2.0 * size - n).min(1.0),
            i if i < 0 => (size / 2.0).floor() + 1.0,
            _ => 0.0,
        }
    }

    /// Highest rank expected in this phase under standard seeding
    pub fn max_rank(&self) -> f64 {
        let size = self.size();
        let n = self.participants as f64;
        match self.index {
            0 => size,
            1 => (2.0 * size - n).max(0.0),
            _ => 0.0,
        }
    }

    /// Move by `offset` phases; positive moves toward the final.
    pub fn shifted(&self, offset: i32) -> Self {
        Self {
            participants: self.participants,
            index: self.index + offset,
        }
    }

    /// The phase of the final match (size 1)
    pub fn shifted_to_top(&self) -> Self {
        Self {
            participants: self.participants,
            index: round_count(self.participants) as i32,
        }
    }

    /// Does `rank` fall inside this phase's expected window?
    pub fn admits(&self, rank: f64) -> bool {
        rank >= self.min_rank() && rank <= self.max_rank()
    }
}

// Size is a function of the index, so comparing indices compares sizes.
impl PartialEq for PhaseInfo {
    fn eq(&self, other: &Self) -> bool {
        self.participants == other.participants && self.index == other.index
    }
}

impl Eq for PhaseInfo {}

impl Hash for PhaseInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.participants.hash(state);
        self.index.hash(state);
    }
}
