//! Sorted keyword set.
//!
//! A [`Dict`] is an array of symbols kept sorted ascending. `find` runs one
//! binary search and reports either the exact position or the insertion
//! point, so `add` never searches twice.

use crate::ids::Symbol;

/// Sorted set of symbols with binary-search membership.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dict {
    words: Vec<Symbol>,
}

impl Dict {
    /// Create an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of symbols in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Locate `word`: `Ok(pos)` if present, `Err(pos)` with the insertion
    /// point that keeps the array sorted otherwise.
    pub fn find(&self, word: Symbol) -> Result<usize, usize> {
        self.words.binary_search(&word)
    }

    /// Whether `word` is in the set.
    #[must_use]
    pub fn contains(&self, word: Symbol) -> bool {
        self.find(word).is_ok()
    }

    /// Insert `word`, keeping the array sorted. Inserting a symbol that is
    /// already present is a no-op success. Returns whether it was inserted.
    pub fn add(&mut self, word: Symbol) -> bool {
        match self.find(word) {
            Ok(_) => false,
            Err(pos) => {
                self.words.insert(pos, word);
                true
            }
        }
    }

    /// Remove `word` if present. Returns whether it was removed.
    pub fn del(&mut self, word: Symbol) -> bool {
        match self.find(word) {
            Ok(pos) => {
                let _ = self.words.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Symbol at sorted position `pos`.
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<Symbol> {
        self.words.get(pos).copied()
    }

    /// Iterate symbols in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.words.iter().copied()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
