//! Named word lists and word pool construction
//!
//! The embedder supplies the text of each word list (one word per line); a
//! room's setup event selects lists by name and the selected lists are
//! concatenated, in selection order, into the pool the generator draws from.
//!
//! Every client of a room must build the same pool from the same selection,
//! or the boards drawn from it diverge. Lists are therefore split and joined
//! exactly as written, without trimming or de-duplicating words.

use std::collections::HashMap;

use itertools::Itertools;

/// A single named list of words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList {
    name: String,
    label: String,
    words: Vec<String>,
}

impl WordList {
    /// Parses a word list from newline terminated text
    ///
    /// The text is split on `\n` and the last piece, the empty entry after
    /// the final newline, is dropped. Nothing else is trimmed or skipped.
    pub fn new(name: &str, label: &str, text: &str) -> Self {
        let mut words = text.split('\n').map(str::to_owned).collect_vec();
        words.pop();
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            words,
        }
    }

    /// Name used to select the list in a setup event
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable label for the list
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The words of the list, in file order
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

/// Registry of the word lists a client knows about
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    lists: Vec<WordList>,
    by_name: HashMap<String, usize>,
}

impl Dictionary {
    /// Creates an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a list, replacing any list of the same name
    pub fn insert(&mut self, list: WordList) {
        if let Some(&index) = self.by_name.get(list.name()) {
            self.lists[index] = list;
        } else {
            self.by_name.insert(list.name().to_owned(), self.lists.len());
            self.lists.push(list);
        }
    }

    /// Builder form of [`Dictionary::insert`]
    #[must_use]
    pub fn with(mut self, list: WordList) -> Self {
        self.insert(list);
        self
    }

    /// Finds a list by name
    pub fn get(&self, name: &str) -> Option<&WordList> {
        self.by_name.get(name).map(|&index| &self.lists[index])
    }

    /// All registered lists, in registration order
    pub fn lists(&self) -> &[WordList] {
        &self.lists
    }

    /// Builds the word pool for the lists selected by a setup event
    ///
    /// Lists are concatenated in selection order, so a list selected twice
    /// or words shared between lists appear more than once. Names this
    /// client does not know are skipped.
    pub fn pool<S: AsRef<str>>(&self, selection: &[S]) -> Vec<String> {
        selection
            .iter()
            .filter_map(|name| {
                let list = self.get(name.as_ref());
                if list.is_none() {
                    log::warn!("unknown word list {:?} skipped", name.as_ref());
                }
                list
            })
            .flat_map(|list| list.words().iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        puzzle::{Tile, generate},
        team::Mode,
    };

    fn dictionary() -> Dictionary {
        Dictionary::new()
            .with(WordList::new("easy", "Easy words", "apple\nbanana\ncherry\n"))
            .with(WordList::new("hard", "Hard words", "quasar\nbanana\nzephyr\n"))
    }

    #[test]
    fn test_trailing_newline_is_not_a_word() {
        let list = WordList::new("easy", "Easy words", "apple\nbanana\n");
        assert_eq!(list.words(), ["apple", "banana"]);
    }

    #[test]
    fn test_lines_are_kept_verbatim() {
        let list = WordList::new("easy", "Easy words", "apple\r\n\nbanana \n");
        assert_eq!(list.words(), ["apple\r", "", "banana "]);
        assert!(WordList::new("empty", "Empty", "").words().is_empty());
    }

    #[test]
    fn test_pool_follows_selection_order() {
        let dictionary = dictionary();
        assert_eq!(
            dictionary.pool(&["hard", "easy"]),
            ["quasar", "banana", "zephyr", "apple", "banana", "cherry"]
        );
        assert_eq!(
            dictionary.pool(&["easy", "easy"]),
            ["apple", "banana", "cherry", "apple", "banana", "cherry"]
        );
    }

    #[test]
    fn test_pool_skips_unknown_lists() {
        let dictionary = dictionary();
        assert_eq!(
            dictionary.pool(&["missing", "easy"]),
            ["apple", "banana", "cherry"]
        );
        assert!(dictionary.pool::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_overlapping_lists_draw_reference_board() {
        let numbered = |range: std::ops::Range<usize>| {
            range.map(|i| format!("w{i:02}\n")).collect::<String>()
        };
        let dictionary = Dictionary::new()
            .with(WordList::new("a", "A", &numbered(0..40)))
            .with(WordList::new("b", "B", &numbered(30..60)));
        let pool = dictionary.pool(&["a", "b"]);
        assert_eq!(pool.len(), 70);

        let puzzle = generate(1_600_000_000_000, Mode::Versus, 25, &pool).unwrap();
        assert_eq!(puzzle.first(), 0);
        assert_eq!(
            puzzle.tiles().iter().map(Tile::word).collect_vec(),
            [
                "w26", "w45", "w05", "w39", "w30", "w33", "w23", "w53", "w14", "w04", "w37",
                "w31", "w49", "w21", "w18", "w38", "w08", "w12", "w32", "w42", "w25", "w01",
                "w11", "w16", "w33"
            ]
        );
        // A word drawn twice resolves to its first tile
        assert_eq!(puzzle.position("w33"), Some(5));
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut dictionary = dictionary();
        dictionary.insert(WordList::new("easy", "Easy words", "kiwi\n"));
        assert_eq!(dictionary.lists().len(), 2);
        assert_eq!(dictionary.get("easy").unwrap().words(), ["kiwi"]);
        assert_eq!(dictionary.get("easy").unwrap().label(), "Easy words");
    }
}
