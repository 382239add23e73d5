//! Teams, game modes and turn phases
//!
//! A room always has exactly two teams. Turn state refers to a team by its
//! index into [`TEAMS`], which is also how the puzzle records the team that
//! acts first.

use std::fmt::Display;

use enum_map::Enum;
use serde::{Deserialize, Serialize};

/// One of the two teams of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// The red team
    Red,
    /// The blue team
    Blue,
}

/// Teams in turn order
pub const TEAMS: [Team; 2] = [Team::Red, Team::Blue];

impl Team {
    /// Returns the other team
    pub fn opposite(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Returns the index of this team in [`TEAMS`]
    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
        }
    }

    /// Returns the team at `index` in [`TEAMS`], wrapping around
    pub fn from_index(index: usize) -> Self {
        TEAMS[index % TEAMS.len()]
    }

    /// Lowercase name used on the wire and in the game log
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule set a room is played with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Both teams cooperate, each holding a private hazard map of the board
    #[serde(rename = "coop")]
    Coop,
    /// The teams compete over a single hidden ownership map
    #[serde(rename = "versus")]
    Versus,
}

impl Mode {
    /// Room topic used when creating a room with this mode
    pub fn topic(self) -> &'static str {
        match self {
            Self::Coop => "Coop game",
            Self::Versus => "Versus game",
        }
    }
}

/// Sub-state of a team's turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for a clue
    #[default]
    Clue,
    /// Guessers are picking words
    Guess,
}
