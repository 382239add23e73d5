//! Core game logic and state management
//!
//! This module contains the game state machine of one room. The state is
//! never sent between clients: every client folds the room's events, in log
//! order, into its own [`Game`] and arrives at the same rosters, turn and
//! guesses as every other client. What a client is allowed to show is then
//! derived per viewer in [`crate::view`].

use std::fmt::{Debug, Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    constants::board::TILE_COUNT,
    dictionary::Dictionary,
    event::{
        ChatContent, ClueContent, DoneContent, Event, GuessContent, JoinContent, Payload, RawEvent,
        SetupContent,
    },
    puzzle::{self, Classification, GenerateError, Hazard, Owner, Puzzle},
    roster::{Player, Roster},
    session::Tunnel,
    team::{Mode, Phase, Team},
    view::{self, Guesses, Prompt, TileView, Viewer},
};

/// What happened, as written to the game log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    /// A sender joined a team
    Joined {
        /// Team joined
        team: Team,
        /// Whether they joined as a clue-giver
        clue: bool,
    },
    /// A clue was given
    Clued(String),
    /// A word was guessed
    Guessed(String),
    /// A chat message
    Chat(String),
}

/// One line of the game log
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Identity of the sender
    pub sender: String,
    /// Server timestamp in milliseconds
    pub origin_server_ts: u64,
    /// Team colour the line is shown with
    pub team: Option<Team>,
    /// What happened
    pub kind: LogKind,
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            LogKind::Joined { team, clue: true } => {
                write!(f, "{} joined {team} as a clue giver", self.sender)
            }
            LogKind::Joined { team, clue: false } => write!(f, "{} joined {team}", self.sender),
            LogKind::Clued(clue) => write!(f, "{} clued {clue}", self.sender),
            LogKind::Guessed(word) => write!(f, "{} guessed {word}", self.sender),
            LogKind::Chat(body) => write!(f, "{}: {body}", self.sender),
        }
    }
}

/// Update messages sent to the screen as events are folded
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UpdateMessage {
    /// The board was generated, or must be redrawn for a new viewer
    Board {
        /// Rule set of the room
        mode: Mode,
        /// Every tile as the viewer sees it
        tiles: Vec<TileView>,
    },
    /// A single tile changed
    Tile {
        /// Display position of the tile
        index: usize,
        /// The tile as the viewer sees it
        view: TileView,
    },
    /// A sender joined a team
    Roster {
        /// Identity of the sender
        sender: String,
        /// Their player record
        player: Player,
    },
    /// The current clue
    Clue(String),
    /// A new log line
    Log(LogEntry),
    /// Turn state changed
    Turn {
        /// Team whose turn it is
        team: Team,
        /// Phase of the turn
        phase: Phase,
        /// What the viewer is asked to do
        prompt: Prompt,
    },
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Complete view of the room for the local viewer
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Rule set, once the room is set up
    pub mode: Option<Mode>,
    /// Tiles as the viewer sees them
    pub tiles: Vec<TileView>,
    /// Team whose turn it is
    pub turn: Team,
    /// Phase of the turn
    pub phase: Phase,
    /// What the viewer is asked to do
    pub prompt: Prompt,
    /// Last clue given
    pub clue: Option<String>,
    /// Players in join order
    pub players: Vec<(String, Player)>,
    /// Log lines visible to the viewer
    pub log: Vec<LogEntry>,
}

/// Sync messages that replace the screen's state wholesale
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyncMessage {
    /// The full view after a batch of events
    Snapshot(Box<Snapshot>),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Reasons a well-formed event is dropped by the state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The event could not be parsed
    #[error("malformed event: {0}")]
    Malformed(String),
    /// The room was already set up
    #[error("room is already set up")]
    AlreadySetUp,
    /// The board could not be generated
    #[error("board generation failed: {0}")]
    Generate(#[from] GenerateError),
    /// The room has no board yet
    #[error("room is not set up")]
    NotSetUp,
    /// The sender already joined
    #[error("sender already joined")]
    AlreadyJoined,
    /// The sender never joined
    #[error("sender has not joined")]
    UnknownSender,
    /// It is the other team's turn
    #[error("not the sender's turn")]
    NotYourTurn,
    /// The turn is not in the phase the event needs
    #[error("wrong phase")]
    WrongPhase,
    /// Clue-givers cannot guess or end guessing
    #[error("clue-givers cannot guess")]
    ClueGiver,
    /// No tile shows the guessed word
    #[error("no tile shows {0:?}")]
    UnknownWord(String),
    /// The tile can no longer be guessed by the sender's team
    #[error("tile {0:?} is no longer in play")]
    Exhausted(String),
}

/// A room's game state
///
/// Created empty when the room is joined; the first setup event in the log
/// generates the board, and every later event is folded in log order.
pub struct Game {
    /// Identity of the local participant
    local: String,
    /// Word lists available to this client
    dictionary: Dictionary,
    /// The board, once set up
    puzzle: Option<Puzzle>,
    /// Teams that guessed each tile, in display order
    guesses: Vec<Guesses>,
    /// Index into [`crate::team::TEAMS`] of the team whose turn it is
    turn: usize,
    /// Phase of the current turn
    phase: Phase,
    /// Last clue given
    clue: Option<String>,
    /// All players of the room
    players: Roster,
    /// Log lines visible to the local participant
    log: Vec<LogEntry>,
}

impl Debug for Game {
    /// Custom debug implementation that avoids printing the board
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("local", &self.local)
            .field("turn", &self.turn())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

// Accessors
impl Game {
    /// Creates the state of a freshly joined room
    ///
    /// # Arguments
    ///
    /// * `local` - Identity of the local participant, as it appears as sender
    /// * `dictionary` - Word lists the setup event can select from
    pub fn new(local: &str, dictionary: Dictionary) -> Self {
        Self {
            local: local.to_owned(),
            dictionary,
            puzzle: None,
            guesses: Vec::new(),
            turn: 0,
            phase: Phase::Clue,
            clue: None,
            players: Roster::default(),
            log: Vec::new(),
        }
    }

    /// Identity of the local participant
    pub fn local(&self) -> &str {
        &self.local
    }

    /// The board, once set up
    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    /// Rule set, once set up
    pub fn mode(&self) -> Option<Mode> {
        self.puzzle.as_ref().map(Puzzle::mode)
    }

    /// Team whose turn it is
    pub fn turn(&self) -> Team {
        Team::from_index(self.turn)
    }

    /// Phase of the current turn
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Last clue given
    pub fn clue(&self) -> Option<&str> {
        self.clue.as_deref()
    }

    /// All players of the room
    pub fn players(&self) -> &Roster {
        &self.players
    }

    /// Log lines visible to the local participant
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Teams that guessed the tile at `index`
    pub fn guesses(&self, index: usize) -> Option<&Guesses> {
        self.guesses.get(index)
    }

    /// The local participant as a viewer, once they joined and the room is set up
    pub fn viewer(&self) -> Option<Viewer> {
        let mode = self.mode()?;
        let player = self.players.get(&self.local)?;
        Some(Viewer::new(mode, *player))
    }

    /// What the local participant is asked to do
    pub fn prompt(&self) -> Prompt {
        match self.mode() {
            Some(mode) => Prompt::derive(mode, self.turn(), self.phase, self.viewer()),
            None => Prompt::NotJoined,
        }
    }

    /// Every tile as the local participant sees it
    pub fn views(&self) -> Vec<TileView> {
        let Some(puzzle) = &self.puzzle else {
            return Vec::new();
        };
        let viewer = self.viewer();
        puzzle
            .tiles()
            .iter()
            .zip_eq(&self.guesses)
            .map(|(tile, guesses)| TileView::derive(tile, guesses, viewer))
            .collect_vec()
    }

    /// The tile at `index` as the local participant sees it
    pub fn tile_view(&self, index: usize) -> Option<TileView> {
        let tile = self.puzzle.as_ref()?.tiles().get(index)?;
        Some(TileView::derive(tile, self.guesses.get(index)?, self.viewer()))
    }

    /// Tiles `team` still has to find
    ///
    /// The game has no end state of its own; a team is finished when this
    /// reaches zero.
    pub fn remaining(&self, team: Team) -> usize {
        let Some(puzzle) = &self.puzzle else {
            return 0;
        };
        puzzle
            .tiles()
            .iter()
            .zip_eq(&self.guesses)
            .filter(|(tile, guesses)| match tile.classification() {
                Classification::Versus(owner) => {
                    *owner == Some(Owner::from(team)) && !guesses.values().any(|&g| g)
                }
                Classification::Coop(hazards) => {
                    hazards[team.opposite()] == Some(Hazard::Green)
                        && !view::is_exhausted(tile.classification(), guesses, team)
                }
            })
            .count()
    }

    /// Full view for the local participant
    pub fn state_message(&self) -> SyncMessage {
        SyncMessage::Snapshot(Box::new(Snapshot {
            mode: self.mode(),
            tiles: self.views(),
            turn: self.turn(),
            phase: self.phase,
            prompt: self.prompt(),
            clue: self.clue.clone(),
            players: self
                .players
                .iter()
                .map(|(sender, player)| (sender.to_owned(), *player))
                .collect_vec(),
            log: self.log.clone(),
        }))
    }

    fn turn_message(&self) -> UpdateMessage {
        UpdateMessage::Turn {
            team: self.turn(),
            phase: self.phase,
            prompt: self.prompt(),
        }
    }

    fn board_message(&self) -> Option<UpdateMessage> {
        Some(UpdateMessage::Board {
            mode: self.mode()?,
            tiles: self.views(),
        })
    }

    fn push_log<T: Tunnel>(&mut self, entry: LogEntry, tunnel: &T) {
        tunnel.send_message(&UpdateMessage::Log(entry.clone()));
        self.log.push(entry);
    }

    /// Looks up the sender and checks that it is their team's turn
    fn acting_player(&self, sender: &str) -> Result<Player, Rejection> {
        if self.puzzle.is_none() {
            return Err(Rejection::NotSetUp);
        }
        let player = *self.players.get(sender).ok_or(Rejection::UnknownSender)?;
        if player.team != self.turn() {
            return Err(Rejection::NotYourTurn);
        }
        Ok(player)
    }
}

// Folding
impl Game {
    /// Folds one event from the log into the state
    ///
    /// Never fails: events that are malformed or break the rules are dropped,
    /// since any peer may append anything and every client must keep
    /// folding the rest of the log.
    ///
    /// # Arguments
    ///
    /// * `raw` - The next event in log order
    /// * `tunnel` - Screen receiving the updates caused by the event
    pub fn fold<T: Tunnel>(&mut self, raw: &RawEvent, tunnel: &T) {
        if let Err(rejection) = self.apply(raw, tunnel) {
            match rejection {
                Rejection::Generate(e) => {
                    log::error!("setup from {} left the room without a board: {e}", raw.sender);
                }
                rejection => log::debug!("dropped {} from {}: {rejection}", raw.kind, raw.sender),
            }
        }
    }

    /// Folds one event, reporting why it was dropped
    ///
    /// A dropped event leaves the state untouched.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] describing the broken rule.
    pub fn apply<T: Tunnel>(&mut self, raw: &RawEvent, tunnel: &T) -> Result<(), Rejection> {
        let Event {
            sender,
            origin_server_ts,
            payload,
        } = Event::parse(raw).map_err(|e| Rejection::Malformed(e.to_string()))?;

        match payload {
            Payload::Setup(content) => self.setup(content, origin_server_ts, tunnel),
            Payload::Join(content) => self.join(&sender, content, origin_server_ts, tunnel),
            Payload::Clue(content) => self.give_clue(&sender, content, origin_server_ts, tunnel),
            Payload::Guess(content) => self.guess(&sender, content, origin_server_ts, tunnel),
            Payload::Done(content) => self.done(&sender, content, tunnel),
            Payload::Chat(content) => self.chat(&sender, content, origin_server_ts, tunnel),
        }
    }

    fn setup<T: Tunnel>(
        &mut self,
        SetupContent { mode, wordlists }: SetupContent,
        origin_server_ts: u64,
        tunnel: &T,
    ) -> Result<(), Rejection> {
        if self.puzzle.is_some() {
            return Err(Rejection::AlreadySetUp);
        }

        let pool = self.dictionary.pool(&wordlists);
        let puzzle = puzzle::generate(origin_server_ts, mode, TILE_COUNT, &pool)?;

        log::info!(
            "{mode:?} room set up from {} words, {} starts",
            pool.len(),
            Team::from_index(puzzle.first())
        );

        self.turn = puzzle.first();
        self.phase = Phase::Clue;
        self.guesses = vec![Guesses::default(); puzzle.len()];
        self.puzzle = Some(puzzle);

        if let Some(board) = self.board_message() {
            tunnel.send_message(&board);
        }
        tunnel.send_message(&self.turn_message());
        Ok(())
    }

    fn join<T: Tunnel>(
        &mut self,
        sender: &str,
        JoinContent { team, clue }: JoinContent,
        origin_server_ts: u64,
        tunnel: &T,
    ) -> Result<(), Rejection> {
        let player = Player { team, clue };
        if !self.players.join(sender, player) {
            return Err(Rejection::AlreadyJoined);
        }

        log::info!("{sender} joined {team}{}", if clue { " as a clue giver" } else { "" });

        self.push_log(
            LogEntry {
                sender: sender.to_owned(),
                origin_server_ts,
                team: Some(team),
                kind: LogKind::Joined { team, clue },
            },
            tunnel,
        );
        tunnel.send_message(&UpdateMessage::Roster {
            sender: sender.to_owned(),
            player,
        });

        if sender == self.local {
            if let Some(board) = self.board_message() {
                tunnel.send_message(&board);
            }
            tunnel.send_message(&self.turn_message());
        }
        Ok(())
    }

    fn give_clue<T: Tunnel>(
        &mut self,
        sender: &str,
        ClueContent { clue }: ClueContent,
        origin_server_ts: u64,
        tunnel: &T,
    ) -> Result<(), Rejection> {
        let player = self.acting_player(sender)?;
        if self.phase != Phase::Clue {
            return Err(Rejection::WrongPhase);
        }

        self.push_log(
            LogEntry {
                sender: sender.to_owned(),
                origin_server_ts,
                team: Some(player.team),
                kind: LogKind::Clued(clue.clone()),
            },
            tunnel,
        );
        tunnel.send_message(&UpdateMessage::Clue(clue.clone()));
        self.clue = Some(clue);

        if self.mode() == Some(Mode::Coop) {
            self.advance_turn();
        }
        self.phase = Phase::Guess;
        tunnel.send_message(&self.turn_message());
        Ok(())
    }

    fn guess<T: Tunnel>(
        &mut self,
        sender: &str,
        GuessContent { guess }: GuessContent,
        origin_server_ts: u64,
        tunnel: &T,
    ) -> Result<(), Rejection> {
        let player = self.acting_player(sender)?;
        if player.clue {
            return Err(Rejection::ClueGiver);
        }
        let Some(puzzle) = &self.puzzle else {
            return Err(Rejection::NotSetUp);
        };
        let index = puzzle
            .position(&guess)
            .ok_or_else(|| Rejection::UnknownWord(guess.clone()))?;
        let classification = puzzle.tiles()[index].classification();
        if view::is_exhausted(classification, &self.guesses[index], player.team) {
            return Err(Rejection::Exhausted(guess));
        }
        let correct = view::is_correct(classification, player.team);

        self.guesses[index][player.team] = true;

        self.push_log(
            LogEntry {
                sender: sender.to_owned(),
                origin_server_ts,
                team: None,
                kind: LogKind::Guessed(guess),
            },
            tunnel,
        );
        if let Some(view) = self.tile_view(index) {
            tunnel.send_message(&UpdateMessage::Tile { index, view });
        }

        if !correct {
            self.end_guessing(tunnel);
        }
        Ok(())
    }

    fn done<T: Tunnel>(
        &mut self,
        sender: &str,
        DoneContent {}: DoneContent,
        tunnel: &T,
    ) -> Result<(), Rejection> {
        let player = self.acting_player(sender)?;
        if player.clue {
            return Err(Rejection::ClueGiver);
        }
        self.end_guessing(tunnel);
        Ok(())
    }

    fn chat<T: Tunnel>(
        &mut self,
        sender: &str,
        ChatContent { body, .. }: ChatContent,
        origin_server_ts: u64,
        tunnel: &T,
    ) -> Result<(), Rejection> {
        let mode = self.mode().ok_or(Rejection::NotSetUp)?;
        let player = self.players.get(sender).copied();
        if player.is_none() {
            return Err(Rejection::UnknownSender);
        }

        if view::chat_visible(mode, player.as_ref(), self.viewer()) {
            self.push_log(
                LogEntry {
                    sender: sender.to_owned(),
                    origin_server_ts,
                    team: player.map(|p| p.team),
                    kind: LogKind::Chat(body),
                },
                tunnel,
            );
        }
        Ok(())
    }

    /// Ends the guessing team's turn
    fn end_guessing<T: Tunnel>(&mut self, tunnel: &T) {
        if self.mode() == Some(Mode::Versus) {
            self.advance_turn();
        }
        self.phase = Phase::Clue;
        tunnel.send_message(&self.turn_message());
    }

    fn advance_turn(&mut self) {
        self.turn = (self.turn + 1) % crate::team::TEAMS.len();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        constants::events,
        dictionary::WordList,
        session::tests::{MockTunnel, RecordingTunnel},
        view::Mark,
    };

    const SEED: u64 = 1_600_000_000_000;
    const HOST: &str = "@host:example.org";
    const ME: &str = "@me:example.org";
    const RED_CLUE: &str = "@red-clue:example.org";
    const RED_GUESS: &str = "@red-guess:example.org";
    const BLUE_CLUE: &str = "@blue-clue:example.org";
    const BLUE_GUESS: &str = "@blue-guess:example.org";

    fn dictionary() -> Dictionary {
        let text = (0..40).map(|i| format!("w{i:02}\n")).collect::<String>();
        Dictionary::new().with(WordList::new("test", "Test words", &text))
    }

    struct Log {
        events: Vec<RawEvent>,
        ts: u64,
    }

    impl Log {
        fn new(mode: &str) -> Self {
            Self {
                events: vec![RawEvent::new(
                    events::SETUP,
                    HOST,
                    json!({"mode": mode, "wordlists": ["test"]}),
                    SEED,
                )],
                ts: SEED,
            }
        }

        fn push(&mut self, kind: &str, sender: &str, content: serde_json::Value) -> &mut Self {
            self.ts += 1;
            self.events.push(RawEvent::new(kind, sender, content, self.ts));
            self
        }

        fn join(&mut self, sender: &str, team: &str, clue: bool) -> &mut Self {
            self.push(events::JOIN, sender, json!({"team": team, "clue": clue}))
        }

        fn clue(&mut self, sender: &str, clue: &str) -> &mut Self {
            self.push(events::CLUE, sender, json!({ "clue": clue }))
        }

        fn guess(&mut self, sender: &str, word: &str) -> &mut Self {
            self.push(events::GUESS, sender, json!({ "guess": word }))
        }

        fn done(&mut self, sender: &str) -> &mut Self {
            self.push(events::DONE, sender, json!({}))
        }

        fn chat(&mut self, sender: &str, body: &str) -> &mut Self {
            self.push(events::CHAT, sender, json!({ "body": body }))
        }

        fn teams(&mut self) -> &mut Self {
            self.join(RED_CLUE, "red", true)
                .join(RED_GUESS, "red", false)
                .join(BLUE_CLUE, "blue", true)
                .join(BLUE_GUESS, "blue", false)
        }

        fn replay(&self, local: &str) -> Game {
            let mut game = Game::new(local, dictionary());
            for event in &self.events {
                game.fold(event, &MockTunnel {});
            }
            game
        }
    }

    // On the reference versus board red starts; w02 is red, w15 blue,
    // w23 a bystander and w08 the assassin.
    // On the reference coop board blue starts; w22 is (green, none),
    // w02 (none, green), w15 (green, green) and w31 (death, death).

    #[test]
    fn test_setup_generates_board() {
        let game = Log::new("versus").replay(ME);
        let puzzle = game.puzzle().unwrap();
        assert_eq!(puzzle.len(), TILE_COUNT);
        assert_eq!(puzzle.mode(), Mode::Versus);
        assert_eq!(game.turn(), Team::Red);
        assert_eq!(game.phase(), Phase::Clue);
        assert_eq!(game.prompt(), Prompt::NotJoined);
    }

    #[test]
    fn test_second_setup_is_ignored() {
        let mut log = Log::new("versus");
        log.push(
            events::SETUP,
            HOST,
            json!({"mode": "coop", "wordlists": ["test"]}),
        );
        let game = log.replay(ME);
        assert_eq!(game.mode(), Some(Mode::Versus));
        assert_eq!(
            game.puzzle(),
            Log::new("versus").replay(ME).puzzle()
        );
    }

    #[test]
    fn test_setup_with_small_pool_leaves_no_board() {
        let mut game = Game::new(ME, dictionary());
        let setup = RawEvent::new(
            events::SETUP,
            HOST,
            json!({"mode": "coop", "wordlists": ["missing"]}),
            SEED,
        );
        assert_eq!(
            game.apply(&setup, &MockTunnel {}),
            Err(Rejection::Generate(GenerateError::PoolExhausted {
                needed: 25,
                available: 0
            }))
        );
        assert!(game.puzzle().is_none());
    }

    #[test]
    fn test_replay_is_deterministic() {
        let mut log = Log::new("versus");
        log.teams()
            .clue(RED_CLUE, "letters")
            .guess(RED_GUESS, "w02")
            .guess(RED_GUESS, "w15")
            .clue(BLUE_CLUE, "numbers")
            .guess(BLUE_GUESS, "w31")
            .chat(BLUE_GUESS, "nice");

        let a = log.replay(RED_GUESS);
        let b = log.replay(RED_GUESS);
        assert_eq!(a.state_message(), b.state_message());
        assert_eq!(a.turn(), b.turn());
        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.guesses, b.guesses);
    }

    #[test]
    fn test_versus_correct_guess_keeps_turn() {
        let mut log = Log::new("versus");
        log.teams().clue(RED_CLUE, "letters").guess(RED_GUESS, "w02");
        let game = log.replay(ME);
        assert_eq!(game.turn(), Team::Red);
        assert_eq!(game.phase(), Phase::Guess);

        log.done(RED_GUESS);
        let game = log.replay(ME);
        assert_eq!(game.turn(), Team::Blue);
        assert_eq!(game.phase(), Phase::Clue);
    }

    #[test]
    fn test_versus_wrong_guess_ends_turn() {
        for word in ["w15", "w23", "w08"] {
            let mut log = Log::new("versus");
            log.teams().clue(RED_CLUE, "letters").guess(RED_GUESS, word);
            let game = log.replay(ME);
            assert_eq!(game.turn(), Team::Blue, "after guessing {word}");
            assert_eq!(game.phase(), Phase::Clue);
        }
    }

    #[test]
    fn test_coop_clue_passes_turn_to_guessers() {
        let mut log = Log::new("coop");
        log.teams().clue(BLUE_CLUE, "fruit");
        let game = log.replay(ME);
        assert_eq!(game.turn(), Team::Red);
        assert_eq!(game.phase(), Phase::Guess);
        assert_eq!(game.clue(), Some("fruit"));
    }

    #[test]
    fn test_coop_guess_against_other_map() {
        // Blue clued, red guesses against blue's map: w02 is green for blue
        let mut log = Log::new("coop");
        log.teams().clue(BLUE_CLUE, "fruit").guess(RED_GUESS, "w02");
        let game = log.replay(ME);
        assert_eq!(game.turn(), Team::Red);
        assert_eq!(game.phase(), Phase::Guess);

        // w22 has nothing on blue's map, so red's guessing ends
        log.guess(RED_GUESS, "w22");
        let game = log.replay(ME);
        assert_eq!(game.turn(), Team::Red);
        assert_eq!(game.phase(), Phase::Clue);
        let w22 = game.puzzle().unwrap().position("w22").unwrap();
        assert!(game.guesses(w22).unwrap()[Team::Red]);
    }

    #[test]
    fn test_empty_clue_starts_guessing() {
        let mut log = Log::new("versus");
        log.teams().clue(RED_CLUE, "");
        let game = log.replay(ME);
        assert_eq!(game.turn(), Team::Red);
        assert_eq!(game.phase(), Phase::Guess);
        assert_eq!(game.clue(), Some(""));

        let mut log = Log::new("coop");
        log.teams().clue(BLUE_CLUE, "");
        let game = log.replay(ME);
        assert_eq!(game.turn(), Team::Red);
        assert_eq!(game.phase(), Phase::Guess);
    }

    #[test]
    fn test_long_clue_starts_guessing() {
        let long = "x".repeat(crate::constants::content::MAX_CLUE_LENGTH + 1);
        let mut log = Log::new("versus");
        log.teams().clue(RED_CLUE, &long);
        let game = log.replay(ME);
        assert_eq!(game.phase(), Phase::Guess);
        assert_eq!(game.clue(), Some(long.as_str()));
    }

    #[test]
    fn test_setup_with_many_lists() {
        let mut wordlists = (0..20).map(|i| format!("missing{i}")).collect_vec();
        wordlists.push("test".to_owned());
        let mut game = Game::new(ME, dictionary());
        let setup = RawEvent::new(
            events::SETUP,
            HOST,
            json!({"mode": "versus", "wordlists": wordlists}),
            SEED,
        );
        assert_eq!(game.apply(&setup, &MockTunnel {}), Ok(()));
        assert_eq!(game.puzzle(), Log::new("versus").replay(ME).puzzle());
    }

    #[test]
    fn test_truthy_clue_flag_joins_as_cluegiver() {
        let mut log = Log::new("versus");
        log.push(events::JOIN, ME, json!({"team": "blue", "clue": 1}));
        let game = log.replay(ME);
        assert_eq!(
            game.viewer(),
            Some(Viewer {
                team: Team::Blue,
                cluegiver: true
            })
        );
    }

    #[test]
    fn test_coop_done_keeps_turn() {
        let mut log = Log::new("coop");
        log.teams().clue(BLUE_CLUE, "fruit").done(RED_GUESS);
        let game = log.replay(ME);
        assert_eq!(game.turn(), Team::Red);
        assert_eq!(game.phase(), Phase::Clue);
    }

    #[test]
    fn test_first_join_wins() {
        let mut log = Log::new("versus");
        log.join(ME, "red", false).join(ME, "blue", true);
        let game = log.replay(ME);
        assert_eq!(
            game.players().get(ME),
            Some(&Player {
                team: Team::Red,
                clue: false
            })
        );
        assert_eq!(game.viewer().unwrap().team, Team::Red);
        assert_eq!(game.log().len(), 1);
    }

    #[test]
    fn test_out_of_turn_guess_is_dropped() {
        let mut log = Log::new("versus");
        log.teams().clue(RED_CLUE, "letters");
        let mut game = log.replay(ME);
        let before = game.state_message();

        let guess = RawEvent::new(events::GUESS, BLUE_GUESS, json!({"guess": "w15"}), SEED + 100);
        assert_eq!(game.apply(&guess, &MockTunnel {}), Err(Rejection::NotYourTurn));
        assert_eq!(game.state_message(), before);
        assert!(game.guesses.iter().all(|g| g.values().all(|&guessed| !guessed)));
    }

    #[test]
    fn test_rule_violations_are_dropped() {
        let mut log = Log::new("versus");
        log.teams();
        let mut game = log.replay(ME);
        let tunnel = MockTunnel {};
        let event = |kind: &str, sender: &str, content| RawEvent::new(kind, sender, content, SEED + 50);

        assert_eq!(
            game.apply(&event(events::CLUE, "@stranger:example.org", json!({"clue": "x"})), &tunnel),
            Err(Rejection::UnknownSender)
        );
        assert_eq!(
            game.apply(&event(events::GUESS, RED_CLUE, json!({"guess": "w02"})), &tunnel),
            Err(Rejection::ClueGiver)
        );
        assert_eq!(
            game.apply(&event(events::DONE, RED_CLUE, json!({})), &tunnel),
            Err(Rejection::ClueGiver)
        );
        assert_eq!(
            game.apply(&event(events::GUESS, RED_GUESS, json!({"guess": "nope"})), &tunnel),
            Err(Rejection::UnknownWord("nope".to_owned()))
        );
        assert!(matches!(
            game.apply(&event(events::JOIN, RED_GUESS, json!({"team": 3})), &tunnel),
            Err(Rejection::Malformed(_))
        ));
        assert_eq!(
            game.apply(&event(events::CLUE, RED_CLUE, json!({"clue": "a"})), &tunnel),
            Ok(())
        );
        assert_eq!(
            game.apply(&event(events::CLUE, RED_CLUE, json!({"clue": "b"})), &tunnel),
            Err(Rejection::WrongPhase)
        );
        assert_eq!(game.clue(), Some("a"));
    }

    #[test]
    fn test_guessed_tile_cannot_be_guessed_again() {
        let mut log = Log::new("versus");
        log.teams()
            .clue(RED_CLUE, "letters")
            .guess(RED_GUESS, "w02");
        let mut game = log.replay(ME);
        let again = RawEvent::new(events::GUESS, RED_GUESS, json!({"guess": "w02"}), SEED + 100);
        assert_eq!(
            game.apply(&again, &MockTunnel {}),
            Err(Rejection::Exhausted("w02".to_owned()))
        );
        assert_eq!(game.turn(), Team::Red);
    }

    #[test]
    fn test_events_before_setup() {
        let mut game = Game::new(ME, dictionary());
        let tunnel = MockTunnel {};
        let join = RawEvent::new(events::JOIN, ME, json!({"team": "blue"}), 1);
        let guess = RawEvent::new(events::GUESS, ME, json!({"guess": "w02"}), 2);
        assert_eq!(game.apply(&join, &tunnel), Ok(()));
        assert_eq!(game.apply(&guess, &tunnel), Err(Rejection::NotSetUp));
        assert!(game.viewer().is_none());

        let setup = RawEvent::new(
            events::SETUP,
            HOST,
            json!({"mode": "coop", "wordlists": ["test"]}),
            SEED,
        );
        game.fold(&setup, &tunnel);
        assert_eq!(
            game.viewer(),
            Some(Viewer {
                team: Team::Blue,
                cluegiver: true
            })
        );
    }

    #[test]
    fn test_coop_chat_only_reaches_own_team() {
        let mut log = Log::new("coop");
        log.teams().chat(RED_GUESS, "psst");
        assert!(log.replay(BLUE_GUESS).log().iter().all(|e| !matches!(e.kind, LogKind::Chat(_))));
        assert!(log.replay(RED_CLUE).log().iter().any(|e| e.kind == LogKind::Chat("psst".to_owned())));
    }

    #[test]
    fn test_versus_cluegiver_chat() {
        let mut log = Log::new("versus");
        log.teams()
            .join(ME, "red", true)
            .chat(RED_CLUE, "secret")
            .chat(BLUE_GUESS, "hello")
            .chat("@stranger:example.org", "spam");

        let chats = |game: &Game| {
            game.log()
                .iter()
                .filter_map(|e| match &e.kind {
                    LogKind::Chat(body) => Some(body.clone()),
                    _ => None,
                })
                .collect_vec()
        };
        assert_eq!(chats(&log.replay(ME)), ["secret", "hello"]);
        assert_eq!(chats(&log.replay(RED_GUESS)), ["hello"]);
        assert_eq!(chats(&log.replay(BLUE_CLUE)), ["hello"]);
    }

    #[test]
    fn test_views_depend_on_role() {
        let mut log = Log::new("versus");
        log.teams()
            .clue(RED_CLUE, "letters")
            .guess(RED_GUESS, "w23");
        let index = |game: &Game, word| game.puzzle().unwrap().position(word).unwrap();

        let cluegiver = log.replay(RED_CLUE);
        let views = cluegiver.views();
        assert_eq!(views[index(&cluegiver, "w02")].shown, Some(Mark::Red));
        assert_eq!(views[index(&cluegiver, "w08")].shown, Some(Mark::Death));

        let guesser = log.replay(RED_GUESS);
        let views = guesser.views();
        assert!(views.iter().all(|v| v.shown.is_none()));
        let w23 = &views[index(&guesser, "w23")];
        assert!(w23.disabled);
        assert_eq!(w23.reveals[Team::Red], Some(Mark::None));
    }

    #[test]
    fn test_remaining_counts_down() {
        let mut log = Log::new("versus");
        log.teams();
        let game = log.replay(ME);
        assert_eq!(game.remaining(Team::Red), 9);
        assert_eq!(game.remaining(Team::Blue), 8);

        log.clue(RED_CLUE, "letters").guess(RED_GUESS, "w02").guess(RED_GUESS, "w15");
        let game = log.replay(ME);
        assert_eq!(game.remaining(Team::Red), 8);
        assert_eq!(game.remaining(Team::Blue), 7);

        let coop = Log::new("coop").replay(ME);
        // 3 shared agents plus 6 on the other team's map each
        assert_eq!(coop.remaining(Team::Red), 9);
        assert_eq!(coop.remaining(Team::Blue), 9);
    }

    #[test]
    fn test_updates_sent_while_folding() {
        let mut log = Log::new("versus");
        log.join(RED_CLUE, "red", true)
            .join(ME, "red", false)
            .clue(RED_CLUE, "letters")
            .guess(ME, "w15");

        let tunnel = RecordingTunnel::default();
        let mut game = Game::new(ME, dictionary());
        for event in &log.events {
            game.fold(event, &tunnel);
        }
        let messages = tunnel.messages.borrow().clone();

        assert!(matches!(messages[0], UpdateMessage::Board { mode: Mode::Versus, .. }));
        assert!(messages.iter().any(|m| matches!(
            m,
            UpdateMessage::Turn {
                prompt: Prompt::TakeGuesses,
                ..
            }
        )));
        assert!(messages.contains(&UpdateMessage::Clue("letters".to_owned())));
        assert!(messages.iter().any(|m| matches!(
            m,
            UpdateMessage::Tile { view, .. } if view.word == "w15" && view.reveals[Team::Red] == Some(Mark::Blue)
        )));
        assert_eq!(
            messages.last(),
            Some(&UpdateMessage::Turn {
                team: Team::Blue,
                phase: Phase::Clue,
                prompt: Prompt::WaitingForOtherTeam,
            })
        );
    }

    #[test]
    fn test_log_lines() {
        let entry = LogEntry {
            sender: "alice".to_owned(),
            origin_server_ts: 0,
            team: Some(Team::Red),
            kind: LogKind::Joined {
                team: Team::Red,
                clue: true,
            },
        };
        assert_eq!(entry.to_string(), "alice joined red as a clue giver");
        let entry = LogEntry {
            kind: LogKind::Guessed("apple".to_owned()),
            ..entry
        };
        assert_eq!(entry.to_string(), "alice guessed apple");
    }
}
