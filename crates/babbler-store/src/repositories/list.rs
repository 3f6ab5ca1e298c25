//! List repository — per-brain word lists (auxiliary, ban, greeting).

use babbler_core::{BrainId, Symbol};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;

/// Word list categories, keyed per brain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i64)]
pub enum ListCategory {
    /// Weak keywords usable only as a generation fallback.
    Aux = 1,
    /// Words never admitted as keywords.
    Ban = 2,
    /// Words eligible for an initial greeting.
    Greet = 3,
}

impl ListCategory {
    fn type_id(self) -> i64 {
        self as i64
    }

    /// Conventional file extension for this category's load file.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Aux => "aux",
            Self::Ban => "ban",
            Self::Greet => "grt",
        }
    }
}

/// List repository — stateless, every method takes `&Connection`.
pub struct ListRepo;

impl ListRepo {
    /// Whether `word` is on the brain's list.
    pub fn contains(
        conn: &Connection,
        brain: BrainId,
        category: ListCategory,
        word: Symbol,
    ) -> Result<bool> {
        let hit: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM lists WHERE brain = ?1 AND type = ?2 AND word = ?3",
                params![brain, category.type_id(), word],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hit.is_some())
    }

    /// Add `word` to the brain's list. Adding a word twice is a no-op.
    pub fn add(
        conn: &Connection,
        brain: BrainId,
        category: ListCategory,
        word: Symbol,
    ) -> Result<()> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO lists (brain, type, word) VALUES (?1, ?2, ?3)",
            params![brain, category.type_id(), word],
        )?;
        Ok(())
    }

    /// Remove `word` from the brain's list.
    pub fn del(
        conn: &Connection,
        brain: BrainId,
        category: ListCategory,
        word: Symbol,
    ) -> Result<()> {
        let _ = conn.execute(
            "DELETE FROM lists WHERE brain = ?1 AND type = ?2 AND word = ?3",
            params![brain, category.type_id(), word],
        )?;
        Ok(())
    }

    /// Clear the brain's entire list for a category.
    pub fn clear(conn: &Connection, brain: BrainId, category: ListCategory) -> Result<()> {
        let _ = conn.execute(
            "DELETE FROM lists WHERE brain = ?1 AND type = ?2",
            params![brain, category.type_id()],
        )?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
