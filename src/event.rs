//! Room log events
//!
//! The log collaborator delivers [`RawEvent`]s: a type string, the sender,
//! arbitrary JSON content and the server timestamp. Any peer may write any
//! content, so [`Event::parse`] checks the shape of every payload before the
//! game sees it.
//!
//! Content that changes the shared game state is read as leniently as every
//! other client of the room reads it, so that all clients fold it the same
//! way. Limits on such content are only applied to what this crate sends.

use garde::Validate;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::{
    constants::{content, events},
    team::{Mode, Team},
};

/// An event as delivered by the log collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event type name
    #[serde(rename = "type")]
    pub kind: String,
    /// Identity of the participant who appended the event
    pub sender: String,
    /// Event payload
    #[serde(default)]
    pub content: Value,
    /// Server timestamp in milliseconds, identical for every observer
    pub origin_server_ts: u64,
}

impl RawEvent {
    /// Creates a raw event
    pub fn new(
        kind: &str,
        sender: &str,
        content: Value,
        origin_server_ts: u64,
    ) -> Self {
        Self {
            kind: kind.to_owned(),
            sender: sender.to_owned(),
            content,
            origin_server_ts,
        }
    }
}

/// Room configuration written when the room is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetupContent {
    /// Rule set of the room
    #[garde(skip)]
    pub mode: Mode,
    /// Names of the word lists the pool is built from
    #[garde(skip)]
    pub wordlists: Vec<String>,
}

/// A sender joins a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct JoinContent {
    /// Team joined
    #[garde(skip)]
    pub team: Team,
    /// Whether the sender gives clues instead of guessing
    #[serde(default, deserialize_with = "truthy")]
    #[garde(skip)]
    pub clue: bool,
}

/// A clue for the sender's team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClueContent {
    /// Clue text, possibly empty
    #[serde(default, deserialize_with = "text")]
    #[garde(skip)]
    pub clue: String,
}

/// A guessed word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GuessContent {
    /// Word on the guessed tile
    #[garde(skip)]
    pub guess: String,
}

/// End of a team's guessing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DoneContent {}

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ChatContent {
    /// Message text
    #[garde(length(chars, max = content::MAX_CHAT_LENGTH))]
    pub body: String,
    /// Message type, `m.text` for messages written by this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub msgtype: Option<String>,
}

/// The typed payload of an event
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum Payload {
    /// Room configuration
    Setup(SetupContent),
    /// Team membership
    Join(JoinContent),
    /// Clue
    Clue(ClueContent),
    /// Guess
    Guess(GuessContent),
    /// End of guessing
    Done(DoneContent),
    /// Chat message
    Chat(ChatContent),
}

impl Payload {
    /// The event type name this payload is written under
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Setup(_) => events::SETUP,
            Self::Join(_) => events::JOIN,
            Self::Clue(_) => events::CLUE,
            Self::Guess(_) => events::GUESS,
            Self::Done(_) => events::DONE,
            Self::Chat(_) => events::CHAT,
        }
    }

    /// Serializes the payload as event content
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for these plain structs.
    pub fn to_content(&self) -> Value {
        match self {
            Self::Setup(c) => serde_json::to_value(c),
            Self::Join(c) => serde_json::to_value(c),
            Self::Clue(c) => serde_json::to_value(c),
            Self::Guess(c) => serde_json::to_value(c),
            Self::Done(c) => serde_json::to_value(c),
            Self::Chat(c) => serde_json::to_value(c),
        }
        .expect("default serializer cannot fail")
    }
}

/// A validated event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Identity of the participant who appended the event
    pub sender: String,
    /// Server timestamp in milliseconds
    pub origin_server_ts: u64,
    /// Typed payload
    pub payload: Payload,
}

/// Reasons an event is rejected before reaching the game
#[derive(Error, Debug)]
pub enum Error {
    /// The type name is not one of ours
    #[error("unknown event type {0:?}")]
    UnknownType(String),
    /// The content does not have the payload's shape
    #[error("malformed content: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The content breaks a limit
    #[error("invalid content: {0}")]
    Invalid(#[from] garde::Report),
}

/// Reads a flag the way a JavaScript condition tests it
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(flag) => flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Reads any JSON value as display text
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn decode<T: DeserializeOwned + Validate<Context = ()>>(
    content: &Value,
) -> Result<T, Error> {
    let payload = T::deserialize(content)?;
    payload.validate()?;
    Ok(payload)
}

impl Event {
    /// Checks and types a raw event
    ///
    /// # Errors
    ///
    /// * `Error::UnknownType` - The type name is not a game event
    /// * `Error::Malformed` - The content does not match the payload shape
    /// * `Error::Invalid` - The content exceeds a limit
    pub fn parse(raw: &RawEvent) -> Result<Self, Error> {
        let payload = match raw.kind.as_str() {
            events::SETUP => decode::<SetupContent>(&raw.content)?.into(),
            events::JOIN => decode::<JoinContent>(&raw.content)?.into(),
            events::CLUE => decode::<ClueContent>(&raw.content)?.into(),
            events::GUESS => decode::<GuessContent>(&raw.content)?.into(),
            events::DONE => decode::<DoneContent>(&raw.content)?.into(),
            events::CHAT => decode::<ChatContent>(&raw.content)?.into(),
            other => return Err(Error::UnknownType(other.to_owned())),
        };
        Ok(Self {
            sender: raw.sender.clone(),
            origin_server_ts: raw.origin_server_ts,
            payload,
        })
    }
}
