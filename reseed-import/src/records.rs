//! Tournament record types as delivered by a bracket host

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::ImportError;

/// A registered participant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: String,
    pub name: String,
    /// Seed or rating position; `None` for unranked entrants
    #[serde(default)]
    pub rank: Option<f64>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl ParticipantRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rank: Option<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rank,
            tags: BTreeSet::new(),
        }
    }
}

/// Where a match slot is filled from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRef {
    /// Winner of a prerequisite match
    Match(String),
    /// A participant placed directly
    Participant(String),
}

/// One match of the bracket
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub round: i32,
    #[serde(default)]
    pub player1: Option<SlotRef>,
    #[serde(default)]
    pub player2: Option<SlotRef>,
}

impl MatchRecord {
    pub fn new(id: impl Into<String>, round: i32, player1: SlotRef, player2: SlotRef) -> Self {
        Self {
            id: id.into(),
            round,
            player1: Some(player1),
            player2: Some(player2),
        }
    }

    /// Ids of prerequisite matches feeding this one
    pub fn prerequisites(&self) -> impl Iterator<Item = &str> {
        [&self.player1, &self.player2]
            .into_iter()
            .filter_map(|slot| match slot {
                Some(SlotRef::Match(id)) => Some(id.as_str()),
                _ => None,
            })
    }
}

/// Everything needed to rebuild a bracket
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentRecords {
    pub participants: Vec<ParticipantRecord>,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
}

impl TournamentRecords {
    pub fn from_json(content: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tournament records {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse tournament records {}", path.display()))
    }
}
