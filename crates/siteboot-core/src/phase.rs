//! Bootstrap phase identifiers.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// Phase
///
/// Ordered: a phase only runs after every lower phase has completed.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Root,
    Site,
    Configuration,
    Database,
    Full,
}

impl Phase {
    pub const ALL: [Self; 5] = [
        Self::Root,
        Self::Site,
        Self::Configuration,
        Self::Database,
        Self::Full,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Site => "site",
            Self::Configuration => "configuration",
            Self::Database => "database",
            Self::Full => "full",
        }
    }

    /// Phases from the first up to and including `self`.
    pub fn through(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().take_while(move |p| *p <= self)
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.into_iter().find(|p| *p > self)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// UnknownPhase
///

#[derive(Debug, ThisError)]
#[error("unknown bootstrap phase '{0}'")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

///
/// Step
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Validate,
    Execute,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate => f.write_str("validate"),
            Self::Execute => f.write_str("execute"),
        }
    }
}

///
/// TESTS
///
