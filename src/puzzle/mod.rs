//! Puzzle boards and their secret classifications
//!
//! A puzzle is the ordered list of tiles shown on the board together with the
//! team that acts first. It is generated once per room by [`generator::generate`]
//! from data every client reads from the log, so all clients hold the same
//! puzzle without exchanging it.

pub mod generator;
pub mod prng;

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::team::{Mode, Team};

pub use generator::generate;

/// A team's hazard marking of a tile on a cooperative board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hazard {
    /// An agent the other team is looking for
    Green,
    /// The assassin
    Death,
}

/// The owner of a tile on a versus board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    /// Owned by the red team
    Red,
    /// Owned by the blue team
    Blue,
    /// The assassin
    Death,
}

impl From<Team> for Owner {
    fn from(team: Team) -> Self {
        match team {
            Team::Red => Self::Red,
            Team::Blue => Self::Blue,
        }
    }
}

impl Owner {
    /// Returns the team owning the tile, if any
    pub fn team(self) -> Option<Team> {
        match self {
            Self::Red => Some(Team::Red),
            Self::Blue => Some(Team::Blue),
            Self::Death => None,
        }
    }
}

/// The secret classification of a tile
///
/// Set at generation time and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Single ground truth owner, `None` for a bystander
    Versus(Option<Owner>),
    /// Each team's private hazard marking of the tile
    Coop(EnumMap<Team, Option<Hazard>>),
}

impl Classification {
    /// Unclassified value for a tile on a board of the given mode
    pub fn blank(mode: Mode) -> Self {
        match mode {
            Mode::Versus => Self::Versus(None),
            Mode::Coop => Self::Coop(EnumMap::default()),
        }
    }

    /// Returns the versus owner, `None` on cooperative boards or bystanders
    pub fn owner(&self) -> Option<Owner> {
        match self {
            Self::Versus(owner) => *owner,
            Self::Coop(_) => None,
        }
    }

    /// Returns the hazard marking `team` holds for this tile on cooperative boards
    pub fn hazard(&self, team: Team) -> Option<Hazard> {
        match self {
            Self::Versus(_) => None,
            Self::Coop(hazards) => hazards[team],
        }
    }

    /// Whether any field has been assigned
    pub fn is_classified(&self) -> bool {
        match self {
            Self::Versus(owner) => owner.is_some(),
            Self::Coop(hazards) => hazards.values().any(Option::is_some),
        }
    }
}

/// One word on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    word: String,
    classification: Classification,
}

impl Tile {
    /// The word shown on the tile
    pub fn word(&self) -> &str {
        &self.word
    }

    /// The secret classification of the tile
    pub fn classification(&self) -> &Classification {
        &self.classification
    }
}

/// A generated board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    mode: Mode,
    tiles: Vec<Tile>,
    first: usize,
}

impl Puzzle {
    /// The mode the board was generated for
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Tiles in display order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Index into [`crate::team::TEAMS`] of the team acting first
    pub fn first(&self) -> usize {
        self.first
    }

    /// Finds the position of the tile showing `word`
    pub fn position(&self, word: &str) -> Option<usize> {
        self.tiles.iter().position(|tile| tile.word == word)
    }

    /// Number of tiles on the board
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the board has no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Errors raised while generating a puzzle
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateError {
    /// The word pool cannot fill the board
    #[error("word pool has {available} words but the board needs {needed}")]
    PoolExhausted {
        /// Words required by the board
        needed: usize,
        /// Words in the pool
        available: usize,
    },
    /// A classification draw found no unassigned tile left
    #[error("no more blank tiles")]
    NoBlankTiles,
}
