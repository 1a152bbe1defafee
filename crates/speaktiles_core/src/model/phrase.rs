//! In-progress sentence assembled from tapped tiles and recognized speech.

use crate::model::board::Tile;

/// Ordered words of the sentence being built. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseBuffer {
    words: Vec<String>,
}

impl PhraseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one word after trimming. Blank input is ignored.
    ///
    /// Returns whether the buffer changed.
    pub fn push_word(&mut self, word: &str) -> bool {
        let trimmed = word.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.words.push(trimmed.to_string());
        true
    }

    /// Appends the text a tile speaks (its `speak` override or label).
    pub fn push_tile(&mut self, tile: &Tile) -> bool {
        self.push_word(tile.spoken_text())
    }

    /// Splits `text` on whitespace and appends every word.
    ///
    /// Returns the words that were appended.
    pub fn push_transcript(&mut self, text: &str) -> Vec<String> {
        let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        self.words.extend(words.iter().cloned());
        words
    }

    /// Removes and returns the last word.
    pub fn undo(&mut self) -> Option<String> {
        self.words.pop()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// The sentence, words joined by single spaces.
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}
