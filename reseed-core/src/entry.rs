//! RankedEntry - a participant sitting in a bracket slot

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A ranked participant. Lower rank is a better seed; ties are allowed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub name: String,
    pub rank: f64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl RankedEntry {
    /// Create an untagged entry
    pub fn new(name: impl Into<String>, rank: f64) -> Self {
        Self {
            name: name.into(),
            rank,
            tags: BTreeSet::new(),
        }
    }

    /// Create an entry named after its rank
    pub fn seeded(rank: u32) -> Self {
        Self::new(rank.to_string(), f64::from(rank))
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Set tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Does this entry carry the given tag?
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl fmt::Display for RankedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
