use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::Serialize;

use crate::error::QueryError;

/// Named over windows of a T20 innings (0-indexed overs).
///
/// One definition is shared by every query: powerplay 0–5, middle 6–14, death 15–19.
/// Together they cover a full 20-over innings without gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Powerplay,
    Middle,
    Death,
}

impl Phase {
    pub fn overs(&self) -> RangeInclusive<u32> {
        match self {
            Phase::Powerplay => 0..=5,
            Phase::Middle => 6..=14,
            Phase::Death => 15..=19,
        }
    }

    pub fn contains(&self, over: u32) -> bool {
        self.overs().contains(&over)
    }
}

impl FromStr for Phase {
    type Err = QueryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "powerplay" => Ok(Phase::Powerplay),
            "middle" => Ok(Phase::Middle),
            "death" => Ok(Phase::Death),
            _ => Err(QueryError::invalid_argument(
                "Invalid phase. Use 'powerplay', 'middle', or 'death'",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batting,
    Bowling,
}

impl FromStr for Role {
    type Err = QueryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "batting" => Ok(Role::Batting),
            "bowling" => Ok(Role::Bowling),
            _ => Err(QueryError::invalid_argument(
                "Invalid role. Use 'batting' or 'bowling'",
            )),
        }
    }
}
