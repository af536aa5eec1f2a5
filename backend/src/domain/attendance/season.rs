//! Season identifiers and the organisation-wide season aggregate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by the season value object constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeasonValidationError {
    EmptyId,
    IdNotTrimmed,
    IdTooLong { max: usize },
}

impl fmt::Display for SeasonValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "season id must not be empty"),
            Self::IdNotTrimmed => write!(f, "season id must not carry surrounding whitespace"),
            Self::IdTooLong { max } => write!(f, "season id must be at most {max} characters"),
        }
    }
}

impl std::error::Error for SeasonValidationError {}

/// Maximum allowed length for a season id.
pub const SEASON_ID_MAX: usize = 64;

/// Opaque identifier naming an organisational season (e.g. `"2024"`).
///
/// The active season is supplied by the configuration provider; the core
/// never interprets the string beyond equality and ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeasonId(String);

impl SeasonId {
    /// Validate and construct a [`SeasonId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, SeasonValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, SeasonValidationError> {
        if id.is_empty() {
            return Err(SeasonValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(SeasonValidationError::IdNotTrimmed);
        }
        if id.chars().count() > SEASON_ID_MAX {
            return Err(SeasonValidationError::IdTooLong { max: SEASON_ID_MAX });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for SeasonId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<SeasonId> for String {
    fn from(value: SeasonId) -> Self {
        value.0
    }
}

impl TryFrom<String> for SeasonId {
    type Error = SeasonValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Organisation-wide running total for one season.
///
/// Created lazily by the first sign-out of the season and only ever
/// incremented afterwards; this core never decrements or deletes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonTotal {
    id: SeasonId,
    total_ms: i64,
}

impl SeasonTotal {
    /// Assemble a season aggregate from stored parts.
    pub fn new(id: SeasonId, total_ms: i64) -> Self {
        Self { id, total_ms }
    }

    /// Returns the season id.
    pub fn id(&self) -> &SeasonId {
        &self.id
    }

    /// Returns the accumulated duration in milliseconds across all members.
    pub fn total_ms(&self) -> i64 {
        self.total_ms
    }
}
