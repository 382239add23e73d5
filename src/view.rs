//! Per-viewer derivation of what a client may show
//!
//! Everything here is computed from the mode, the viewer's team and role, a
//! tile's secret classification and the guesses recorded against it. Those
//! inputs are the same on every client, so two clients with the same viewer
//! derive the same view, and a viewer is never handed a classification their
//! role does not entitle them to.

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    puzzle::{Classification, Hazard, Owner, Tile},
    roster::Player,
    team::{Mode, Phase, TEAMS, Team},
};

/// The local participant a view is derived for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewer {
    /// Team the viewer joined
    pub team: Team,
    /// Whether the viewer sees the clue-giver's map
    ///
    /// Always set on cooperative boards, where every player reads their own
    /// team's hazard map.
    pub cluegiver: bool,
}

impl Viewer {
    /// Derives the viewer from the join that placed them
    pub fn new(mode: Mode, player: Player) -> Self {
        Self {
            team: player.team,
            cluegiver: mode == Mode::Coop || player.clue,
        }
    }
}

/// A classification value shown on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    /// Red team tile
    Red,
    /// Blue team tile
    Blue,
    /// Agent
    Green,
    /// Assassin
    Death,
    /// Nothing behind the tile
    None,
}

impl From<Owner> for Mark {
    fn from(owner: Owner) -> Self {
        match owner {
            Owner::Red => Self::Red,
            Owner::Blue => Self::Blue,
            Owner::Death => Self::Death,
        }
    }
}

impl From<Hazard> for Mark {
    fn from(hazard: Hazard) -> Self {
        match hazard {
            Hazard::Green => Self::Green,
            Hazard::Death => Self::Death,
        }
    }
}

/// Which teams have guessed a tile
pub type Guesses = EnumMap<Team, bool>;

/// The result a guess by `team` uncovers
///
/// On cooperative boards the guessing team plays against the other team's
/// hazard map, since that team's clue-giver gave the clue. On versus boards
/// the single owner is uncovered.
pub fn guess_result(classification: &Classification, team: Team) -> Option<Mark> {
    match classification {
        Classification::Versus(owner) => owner.map(Mark::from),
        Classification::Coop(hazards) => hazards[team.opposite()].map(Mark::from),
    }
}

/// Whether a guess by `team` keeps the turn going
pub fn is_correct(classification: &Classification, team: Team) -> bool {
    match classification {
        Classification::Versus(owner) => *owner == Some(Owner::from(team)),
        Classification::Coop(hazards) => hazards[team.opposite()] == Some(Hazard::Green),
    }
}

/// Whether a tile can no longer be guessed by `team`
///
/// Depends only on replicated facts, so every client accepts or drops the
/// same guesses.
pub fn is_exhausted(classification: &Classification, guesses: &Guesses, team: Team) -> bool {
    match classification {
        Classification::Versus(_) => guesses.values().any(|&guessed| guessed),
        Classification::Coop(hazards) => {
            guesses[team]
                || TEAMS
                    .iter()
                    .any(|&guesser| guesses[guesser] && hazards[guesser.opposite()].is_some())
        }
    }
}

/// What one viewer sees of one tile
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileView {
    /// The word on the tile
    pub word: String,
    /// Classification visible to the viewer ahead of any guess
    pub shown: Option<Mark>,
    /// Whether the viewer can no longer pick the tile
    pub disabled: bool,
    /// Results uncovered to the viewer, keyed by the team that guessed
    pub reveals: EnumMap<Team, Option<Mark>>,
    /// Which teams have guessed the tile
    pub guessed: Guesses,
}

impl TileView {
    /// Derives the view of `tile` for `viewer`
    ///
    /// A viewer who has not joined gets the public view.
    pub fn derive(tile: &Tile, guesses: &Guesses, viewer: Option<Viewer>) -> Self {
        let classification = tile.classification();
        let mut view = Self {
            word: tile.word().to_owned(),
            shown: None,
            disabled: false,
            reveals: EnumMap::default(),
            guessed: *guesses,
        };

        match classification {
            Classification::Versus(owner) => {
                if viewer.is_some_and(|v| v.cluegiver) {
                    view.shown = owner.map(Mark::from);
                }
                for guesser in TEAMS.into_iter().filter(|&t| guesses[t]) {
                    view.disabled = true;
                    view.reveals[guesser] = Some(owner.map_or(Mark::None, Mark::from));
                }
            }
            Classification::Coop(hazards) => {
                if let Some(viewer) = viewer {
                    view.shown = hazards[viewer.team].map(Mark::from);
                }
                for guesser in TEAMS.into_iter().filter(|&t| guesses[t]) {
                    let result = hazards[guesser.opposite()];
                    let own_guess = viewer.is_some_and(|v| v.team == guesser);
                    let other_guess = viewer.is_some_and(|v| v.team != guesser);
                    if result.is_some() || own_guess {
                        view.disabled = true;
                    }
                    if result.is_some() || other_guess {
                        view.reveals[guesser] = Some(result.map_or(Mark::None, Mark::from));
                    }
                }
            }
        }

        view
    }
}

/// Whether a chat message from `sender` is shown to `viewer`
pub fn chat_visible(mode: Mode, sender: Option<&Player>, viewer: Option<Viewer>) -> bool {
    let Some(sender) = sender else {
        return false;
    };
    match mode {
        Mode::Versus => {
            if sender.clue {
                viewer.is_some_and(|v| v.team == sender.team && v.cluegiver)
            } else {
                true
            }
        }
        Mode::Coop => viewer.is_some_and(|v| v.team == sender.team),
    }
}

/// What the viewer is asked to do right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prompt {
    /// The viewer has not joined a team
    NotJoined,
    /// The viewer should give a clue
    ProvideClue,
    /// The viewer's team waits for its clue-giver
    WaitingForClue,
    /// The viewer's guessers are picking words
    WaitingForTeamGuess,
    /// The viewer should pick words
    TakeGuesses,
    /// The other team is guessing on a cooperative board
    WaitingForNextClue,
    /// The other team is playing on a versus board
    WaitingForOtherTeam,
}

impl Prompt {
    /// Derives the prompt from the turn state
    pub fn derive(mode: Mode, turn: Team, phase: Phase, viewer: Option<Viewer>) -> Self {
        let Some(viewer) = viewer else {
            return Self::NotJoined;
        };
        if viewer.team != turn {
            return match mode {
                Mode::Coop => Self::WaitingForNextClue,
                Mode::Versus => Self::WaitingForOtherTeam,
            };
        }
        match phase {
            Phase::Clue if viewer.cluegiver => Self::ProvideClue,
            Phase::Clue => Self::WaitingForClue,
            Phase::Guess if viewer.cluegiver && mode == Mode::Versus => Self::WaitingForTeamGuess,
            Phase::Guess => Self::TakeGuesses,
        }
    }

    /// Whether the viewer may enter a clue
    pub fn can_clue(self) -> bool {
        matches!(self, Self::ProvideClue)
    }

    /// Whether the viewer may pick tiles
    pub fn can_guess(self) -> bool {
        matches!(self, Self::TakeGuesses)
    }

    /// Title text for the prompt
    pub fn title(self) -> &'static str {
        match self {
            Self::NotJoined => "Keywords",
            Self::ProvideClue => "Your turn! Provide a clue",
            Self::WaitingForClue => "Waiting for clue",
            Self::WaitingForTeamGuess => "Waiting for team's guess",
            Self::TakeGuesses => "Take your guesses",
            Self::WaitingForNextClue => "Waiting for next clue",
            Self::WaitingForOtherTeam => "Waiting for other team",
        }
    }
}
