//! Team rosters
//!
//! This module tracks every sender who has joined a team, keyed by sender
//! identity, together with a reverse mapping from team to members in join
//! order. The first join of a sender is final.

use std::collections::{HashMap, hash_map::Entry};

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use crate::team::Team;

/// A participant who joined a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Team the player joined
    pub team: Team,
    /// Whether the player gives clues instead of guessing
    pub clue: bool,
}

/// Serialization helper for Roster struct
#[derive(Deserialize)]
struct RosterSerde {
    order: Vec<(String, Player)>,
}

/// All players of a room
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "RosterSerde")]
pub struct Roster {
    /// Players in join order
    order: Vec<(String, Player)>,

    /// Primary mapping from sender to player
    #[serde(skip_serializing)]
    mapping: HashMap<String, Player>,
    /// Senders per team in join order
    #[serde(skip_serializing)]
    by_team: EnumMap<Team, Vec<String>>,
}

impl From<RosterSerde> for Roster {
    /// Reconstructs the lookup tables from the join order
    fn from(serde: RosterSerde) -> Self {
        let mut roster = Self::default();
        for (sender, player) in serde.order {
            roster.join(&sender, player);
        }
        roster
    }
}

impl Roster {
    /// Records a join
    ///
    /// # Returns
    ///
    /// `true` if the sender was not on the roster yet and has been added,
    /// `false` if an earlier join already placed them
    pub fn join(&mut self, sender: &str, player: Player) -> bool {
        match self.mapping.entry(sender.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(player);
                self.by_team[player.team].push(sender.to_owned());
                self.order.push((sender.to_owned(), player));
                true
            }
        }
    }

    /// Looks up a player
    pub fn get(&self, sender: &str) -> Option<&Player> {
        self.mapping.get(sender)
    }

    /// Whether the sender has joined
    pub fn contains(&self, sender: &str) -> bool {
        self.mapping.contains_key(sender)
    }

    /// Members of a team in join order
    pub fn team(&self, team: Team) -> &[String] {
        &self.by_team[team]
    }

    /// Clue-givers of a team in join order
    pub fn clue_givers(&self, team: Team) -> impl Iterator<Item = &str> {
        self.members(team, true)
    }

    /// Guessers of a team in join order
    pub fn guessers(&self, team: Team) -> impl Iterator<Item = &str> {
        self.members(team, false)
    }

    fn members(&self, team: Team, clue: bool) -> impl Iterator<Item = &str> {
        self.by_team[team]
            .iter()
            .filter(move |sender| self.mapping.get(*sender).is_some_and(|p| p.clue == clue))
            .map(String::as_str)
    }

    /// All players in join order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Player)> {
        self.order.iter().map(|(sender, player)| (sender.as_str(), player))
    }

    /// Number of players
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nobody has joined
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
