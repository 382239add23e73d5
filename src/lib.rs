//! # Keywords Game Library
//!
//! This library provides the core game logic for Keywords, a team word
//! guessing game played over a shared, append-only room log. There is no
//! authoritative server: every client folds the same ordered events into the
//! same state and derives what its own participant is allowed to see.
//!
//! The board is generated from the timestamp of the room's setup event with
//! a bit-exact mulberry32 generator, so every client builds the same secret
//! classifications without ever exchanging them.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;

pub mod dictionary;
pub mod event;
pub mod game;
pub mod puzzle;
pub mod roster;
pub mod session;
pub mod team;
pub mod view;

pub use dictionary::{Dictionary, WordList};
pub use event::RawEvent;
pub use game::{Game, SyncMessage, UpdateMessage};
pub use puzzle::Puzzle;
pub use session::{CancelHandle, EventLog, Lobby, Session, SessionError, TransportError, Tunnel};
pub use team::{Mode, Phase, Team};
