use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Inclusive, 1-based range of days covered by one phase of a cycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, SerializeDisplay, DeserializeFromStr,
)]
#[display("{first}-{last}")]
pub struct PhaseRange {
    first: u32,
    last: u32,
}

impl PhaseRange {
    /// Returns `None` when the range would be empty or start before day 1.
    pub fn new(first: u32, last: u32) -> Option<Self> {
        (first >= 1 && first <= last).then_some(Self { first, last })
    }

    pub(crate) const fn new_unchecked(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    pub fn length(&self) -> u32 {
        self.last - self.first + 1
    }

    pub fn days_before(&self) -> u32 {
        self.first - 1
    }

    pub fn contains(&self, day: u32) -> bool {
        (self.first..=self.last).contains(&day)
    }
}

/// One phase of a cycle: its day range and an optional label for the host to show.
///
/// Dereferences to its [`PhaseRange`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Serialize, Deserialize)]
#[serde(from = "PhaseEntry")]
pub struct CyclePhase {
    #[deref]
    range: PhaseRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl CyclePhase {
    pub(crate) const fn unnamed(range: PhaseRange) -> Self {
        Self { range, name: None }
    }

    /// Blank names count as no name.
    pub fn named(range: PhaseRange, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = (!name.trim().is_empty()).then(|| name.trim().to_string());
        Self { range, name }
    }

    pub fn range(&self) -> PhaseRange {
        self.range
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl From<PhaseRange> for CyclePhase {
    fn from(range: PhaseRange) -> Self {
        Self::unnamed(range)
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.range),
            None => write!(f, "{}", self.range),
        }
    }
}

/// Accepted spellings of a phase: `"1-5"` or `{ range = "1-5", name = "..." }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PhaseEntry {
    Bare(PhaseRange),
    Named {
        range: PhaseRange,
        #[serde(default)]
        name: Option<String>,
    },
}

impl From<PhaseEntry> for CyclePhase {
    fn from(entry: PhaseEntry) -> Self {
        match entry {
            PhaseEntry::Bare(range) | PhaseEntry::Named { range, name: None } => range.into(),
            PhaseEntry::Named {
                range,
                name: Some(name),
            } => Self::named(range, name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePhaseRangeError {
    #[error("expected `first-last`, got {0:?}")]
    Format(String),
    #[error("range {0:?} is empty or starts before day 1")]
    Empty(String),
}

impl FromStr for PhaseRange {
    type Err = ParsePhaseRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (first, last) = s
            .split_once(['-', '.'])
            .map(|(a, b)| (a.trim(), b.trim_start_matches('.').trim()))
            .ok_or_else(|| ParsePhaseRangeError::Format(s.to_string()))?;
        let parse = |v: &str| {
            v.parse::<u32>()
                .map_err(|_| ParsePhaseRangeError::Format(s.to_string()))
        };
        Self::new(parse(first)?, parse(last)?)
            .ok_or_else(|| ParsePhaseRangeError::Empty(s.to_string()))
    }
}
