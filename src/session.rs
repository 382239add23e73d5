//! Room session management
//!
//! This module defines the traits through which the game talks to the
//! outside world (the room log and the screen) and the [`Session`] that ties
//! one joined room to one [`Game`]. A session folds the room's events as they
//! arrive and writes the local participant's actions back to the log; the
//! log collaborator echoes them back, so local actions reach the game through
//! the same fold as everyone else's.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use garde::Validate;
use thiserror::Error;

use crate::{
    constants::{content, events},
    dictionary::Dictionary,
    event::{
        ChatContent, ClueContent, DoneContent, GuessContent, JoinContent, Payload, RawEvent,
        SetupContent,
    },
    game::{Game, SyncMessage, UpdateMessage},
    team::{Mode, Team},
};

/// Trait for sending messages through a communication tunnel
///
/// This trait abstracts the screen the game's derived view is shown on.
/// Implementations might render to a terminal, forward over a WebSocket, or
/// record messages for tests.
pub trait Tunnel {
    /// Sends an update message to the screen
    ///
    /// Update messages describe a single change caused by one folded event.
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);

    /// Sends a state synchronization message to the screen
    ///
    /// Sync messages replace the screen's state wholesale, and are sent
    /// after every batch of folded events.
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to send
    fn send_state(&self, state: &SyncMessage);

    /// Closes the communication tunnel
    ///
    /// Called when the session leaves the room.
    fn close(self);
}

/// Failures reported by the log collaborator
///
/// These are surfaced to the caller as they are; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The room could not be joined
    #[error("could not join room {room}: {reason}")]
    Join {
        /// Room that was being joined
        room: String,
        /// Collaborator supplied reason
        reason: String,
    },
    /// The room could not be created
    #[error("could not create room: {0}")]
    Create(String),
    /// An event could not be appended
    #[error("could not send event: {0}")]
    Send(String),
    /// New events could not be fetched
    #[error("could not fetch events: {0}")]
    Fetch(String),
    /// The room could not be left
    #[error("could not leave room: {0}")]
    Leave(String),
}

/// Errors returned by session operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The log collaborator failed
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The session was cancelled or left
    #[error("session is no longer active")]
    Inactive,
    /// The local participant may not do this right now
    #[error("action not allowed for the current turn")]
    NotAllowed,
    /// Outgoing content breaks a limit
    #[error("invalid content: {0}")]
    Invalid(String),
}

impl From<garde::Report> for SessionError {
    fn from(report: garde::Report) -> Self {
        Self::Invalid(report.to_string())
    }
}

/// Limits on a clue this client sends
#[derive(Validate)]
struct ClueDraft {
    #[garde(length(chars, min = 1, max = content::MAX_CLUE_LENGTH))]
    clue: String,
}

/// Limits on a room this client creates
#[derive(Validate)]
struct RoomDraft {
    #[garde(length(min = 1, max = content::MAX_WORD_LISTS))]
    wordlists: Vec<String>,
}

/// The ordered, append-only event log of one joined room
#[allow(async_fn_in_trait)]
pub trait EventLog {
    /// Waits for new events
    ///
    /// The first call returns the whole log from its start; later calls
    /// suspend until events past the last returned one exist.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Fetch` if the collaborator fails.
    async fn fetch_events(&mut self) -> Result<Vec<RawEvent>, TransportError>;

    /// Appends an event to the log
    ///
    /// Completes once the collaborator accepted the event; it only affects
    /// the game when it comes back through [`EventLog::fetch_events`].
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Send` if the collaborator fails.
    async fn send_event(&self, kind: &str, content: serde_json::Value)
    -> Result<(), TransportError>;

    /// Leaves the room
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Leave` if the collaborator fails.
    async fn leave(&mut self) -> Result<(), TransportError>;
}

/// Entry point of the log collaborator, used to reach rooms
#[allow(async_fn_in_trait)]
pub trait Lobby {
    /// Log type of joined rooms
    type Log: EventLog;

    /// Joins an existing room
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Join` if the room cannot be joined.
    async fn join(&self, room_id: &str) -> Result<Self::Log, TransportError>;

    /// Creates a room whose log starts with the given setup event
    ///
    /// # Arguments
    ///
    /// * `topic` - Human readable room topic
    /// * `kind` - Event type of the setup event
    /// * `content` - Setup event content
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Create` if the room cannot be created.
    async fn create(
        &self,
        topic: &str,
        kind: &str,
        content: serde_json::Value,
    ) -> Result<String, TransportError>;
}

/// Shared cancellation flag of a session
///
/// Clones observe the same flag, so a handle taken before the fold loop
/// starts can stop it from elsewhere.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Marks the session as cancelled
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the session was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One joined room
pub struct Session<E: EventLog, T: Tunnel> {
    room_id: String,
    log: E,
    game: Game,
    tunnel: T,
    cancel: CancelHandle,
}

impl<E: EventLog, T: Tunnel> std::fmt::Debug for Session<E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("room_id", &self.room_id)
            .field("game", &self.game)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<E: EventLog, T: Tunnel> Session<E, T> {
    /// Creates a room configured for a new game
    ///
    /// # Arguments
    ///
    /// * `lobby` - Log collaborator entry point
    /// * `mode` - Rule set of the new room
    /// * `wordlists` - Names of the word lists the board is drawn from
    ///
    /// # Returns
    ///
    /// The id of the created room
    ///
    /// # Errors
    ///
    /// * `SessionError::Invalid` - No list or too many lists are selected
    /// * `SessionError::Transport` - The room cannot be created
    pub async fn create_room<L: Lobby>(
        lobby: &L,
        mode: Mode,
        wordlists: &[String],
    ) -> Result<String, SessionError> {
        let draft = RoomDraft {
            wordlists: wordlists.to_vec(),
        };
        draft.validate()?;
        let setup = Payload::from(SetupContent {
            mode,
            wordlists: draft.wordlists,
        });
        let room_id = lobby
            .create(mode.topic(), setup.kind(), setup.to_content())
            .await?;
        log::info!("created {mode:?} room {room_id}");
        Ok(room_id)
    }

    /// Joins a room and prepares an empty game for it
    ///
    /// # Arguments
    ///
    /// * `lobby` - Log collaborator entry point
    /// * `room_id` - Room to join
    /// * `local` - Identity of the local participant
    /// * `dictionary` - Word lists the room's setup can select from
    /// * `tunnel` - Screen the view is sent to
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transport` if the room cannot be joined.
    pub async fn join<L: Lobby<Log = E>>(
        lobby: &L,
        room_id: &str,
        local: &str,
        dictionary: Dictionary,
        tunnel: T,
    ) -> Result<Self, SessionError> {
        let log = lobby.join(room_id).await?;
        Ok(Self::new(room_id, log, Game::new(local, dictionary), tunnel))
    }

    /// Wraps an already joined room
    pub fn new(room_id: &str, log: E, game: Game, tunnel: T) -> Self {
        Self {
            room_id: room_id.to_owned(),
            log,
            game,
            tunnel,
            cancel: CancelHandle::default(),
        }
    }

    /// Id of the room
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Game state folded so far
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Handle that cancels this session
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Whether the session still folds events and accepts actions
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Fetches and folds one batch of events
    ///
    /// The batch is folded in order and followed by a sync snapshot. A batch
    /// that arrives after the session was cancelled is discarded.
    ///
    /// # Returns
    ///
    /// `false` once the session is cancelled
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transport` if fetching fails.
    pub async fn step(&mut self) -> Result<bool, SessionError> {
        if !self.is_active() {
            return Ok(false);
        }
        let batch = self.log.fetch_events().await?;
        if !self.is_active() {
            log::debug!("discarding {} events fetched after cancel", batch.len());
            return Ok(false);
        }

        for event in &batch {
            self.game.fold(event, &self.tunnel);
        }
        self.tunnel.send_state(&self.game.state_message());
        Ok(true)
    }

    /// Folds events until the session is cancelled
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transport` if fetching fails.
    pub async fn run(&mut self) -> Result<(), SessionError> {
        while self.step().await? {}
        log::debug!("stopped folding room {}", self.room_id);
        Ok(())
    }

    /// Cancels the session and leaves the room
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transport` if the collaborator fails to leave.
    pub async fn leave(self) -> Result<(), SessionError> {
        let Self {
            room_id,
            mut log,
            tunnel,
            cancel,
            ..
        } = self;
        cancel.cancel();
        tunnel.close();
        log.leave().await?;
        log::info!("left room {room_id}");
        Ok(())
    }

    async fn send(&self, payload: Payload) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::Inactive);
        }
        self.log
            .send_event(payload.kind(), payload.to_content())
            .await?;
        Ok(())
    }

    /// Joins a team
    ///
    /// # Errors
    ///
    /// * `SessionError::Inactive` - The session was cancelled
    /// * `SessionError::Transport` - The event could not be sent
    pub async fn join_team(&self, team: Team, clue: bool) -> Result<(), SessionError> {
        self.send(JoinContent { team, clue }.into()).await
    }

    /// Gives a clue
    ///
    /// # Errors
    ///
    /// * `SessionError::Inactive` - The session was cancelled
    /// * `SessionError::Invalid` - The clue is empty or too long
    /// * `SessionError::Transport` - The event could not be sent
    pub async fn send_clue(&self, clue: &str) -> Result<(), SessionError> {
        let draft = ClueDraft {
            clue: clue.to_owned(),
        };
        draft.validate()?;
        self.send(ClueContent { clue: draft.clue }.into()).await
    }

    /// Guesses the tile showing `word`
    ///
    /// # Errors
    ///
    /// * `SessionError::Inactive` - The session was cancelled
    /// * `SessionError::NotAllowed` - The local participant is not guessing
    /// * `SessionError::Transport` - The event could not be sent
    pub async fn guess(&self, word: &str) -> Result<(), SessionError> {
        if !self.game.prompt().can_guess() {
            return Err(SessionError::NotAllowed);
        }
        self.send(
            GuessContent {
                guess: word.to_owned(),
            }
            .into(),
        )
        .await
    }

    /// Ends the team's guessing
    ///
    /// # Errors
    ///
    /// * `SessionError::Inactive` - The session was cancelled
    /// * `SessionError::Transport` - The event could not be sent
    pub async fn done(&self) -> Result<(), SessionError> {
        self.send(DoneContent {}.into()).await
    }

    /// Sends a chat message
    ///
    /// # Errors
    ///
    /// * `SessionError::Inactive` - The session was cancelled
    /// * `SessionError::Transport` - The event could not be sent
    pub async fn chat(&self, body: &str) -> Result<(), SessionError> {
        self.send(
            ChatContent {
                body: body.to_owned(),
                msgtype: Some(events::CHAT_MSGTYPE.to_owned()),
            }
            .into(),
        )
        .await
    }
}
