//! Map repository — per-brain word → word substitution maps.

use babbler_core::{BrainId, Symbol};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;

/// Word map categories, keyed per brain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i64)]
pub enum MapCategory {
    /// Keyword substitutions applied before extraction (YOU → ME etc.).
    Swap = 4,
}

impl MapCategory {
    fn type_id(self) -> i64 {
        self as i64
    }

    /// Conventional file extension for this category's load file.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Swap => "swp",
        }
    }
}

/// Map repository — stateless, every method takes `&Connection`.
pub struct MapRepo;

impl MapRepo {
    /// Value for `key` in the brain's map, if mapped.
    pub fn get(
        conn: &Connection,
        brain: BrainId,
        category: MapCategory,
        key: Symbol,
    ) -> Result<Option<Symbol>> {
        let value = conn
            .query_row(
                "SELECT value FROM maps WHERE brain = ?1 AND type = ?2 AND key = ?3",
                params![brain, category.type_id(), key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Map `key` to `value`, replacing any previous mapping.
    pub fn put(
        conn: &Connection,
        brain: BrainId,
        category: MapCategory,
        key: Symbol,
        value: Symbol,
    ) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO maps (brain, type, key, value) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (brain, type, key) DO UPDATE SET value = excluded.value",
            params![brain, category.type_id(), key, value],
        )?;
        Ok(())
    }

    /// Remove the mapping for `key`.
    pub fn del(
        conn: &Connection,
        brain: BrainId,
        category: MapCategory,
        key: Symbol,
    ) -> Result<()> {
        let _ = conn.execute(
            "DELETE FROM maps WHERE brain = ?1 AND type = ?2 AND key = ?3",
            params![brain, category.type_id(), key],
        )?;
        Ok(())
    }

    /// Clear the brain's entire map for a category.
    pub fn clear(conn: &Connection, brain: BrainId, category: MapCategory) -> Result<()> {
        let _ = conn.execute(
            "DELETE FROM maps WHERE brain = ?1 AND type = ?2",
            params![brain, category.type_id()],
        )?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
