//! Configuration constants for the Keywords game
//!
//! This module contains the board shape, the classification tables used by
//! the puzzle generator, the limits applied to event content and the
//! event type names shared with every other client of a room.

/// Board generation constants
pub mod board {
    use crate::puzzle::Hazard::{self, Death, Green};

    /// Number of tiles on a board
    pub const TILE_COUNT: usize = 25;

    /// Hazard batches assigned to cooperative boards, in draw order
    ///
    /// Each entry is `(count, red, blue)`: `count` tiles are drawn from the
    /// unassigned set and given the `red` and `blue` hazard fields.
    pub const COOP_BATCHES: [(usize, Option<Hazard>, Option<Hazard>); 8] = [
        (1, Some(Death), Some(Green)),
        (5, None, Some(Green)),
        (3, Some(Green), Some(Green)),
        (5, Some(Green), None),
        (1, Some(Green), Some(Death)),
        (1, None, Some(Death)),
        (1, Some(Death), Some(Death)),
        (1, Some(Death), None),
    ];

    /// Tiles owned by a team on a versus board (9 for the first team, 8 for the other)
    pub const VERSUS_TEAM_TILES: usize = 9 + 8;

    /// Tiles marked as the assassin on a versus board
    pub const VERSUS_DEATH_TILES: usize = 1;
}

/// Limits applied to event content
///
/// Clue and word list limits only apply to events this client sends, since
/// peers fold such events without limits.
pub mod content {
    /// Maximum length of an outgoing clue in characters
    pub const MAX_CLUE_LENGTH: usize = 200;
    /// Maximum length of a chat message in characters
    pub const MAX_CHAT_LENGTH: usize = 2000;
    /// Maximum number of word lists an outgoing room setup can select
    pub const MAX_WORD_LISTS: usize = 16;
}

/// Event type names written to and read from the room log
pub mod events {
    /// Application namespace prefixed to every event type
    pub const APP_NAME: &str = "com.github.flackr.keywords";
    /// Room configuration carrying the mode and the word lists
    pub const SETUP: &str = "com.github.flackr.keywords.GameConfig";
    /// A sender joins a team
    pub const JOIN: &str = "com.github.flackr.keywords.JoinTeam";
    /// A clue-giver gives a clue
    pub const CLUE: &str = "com.github.flackr.keywords.Clue";
    /// A guesser picks a word
    pub const GUESS: &str = "com.github.flackr.keywords.Guess";
    /// A guesser ends the team's guessing
    pub const DONE: &str = "com.github.flackr.keywords.Done";
    /// A chat message
    pub const CHAT: &str = "com.github.flackr.keywords.Chat";
    /// Message type attached to outgoing chat
    pub const CHAT_MSGTYPE: &str = "m.text";
}
