//! Word repository — the global string ↔ symbol interner.
//!
//! One namespace across all brains: interning the same text twice always
//! yields the same symbol.

use babbler_core::Symbol;
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::{Result, StoreError};

/// Word repository — stateless, every method takes `&Connection`.
pub struct WordRepo;

impl WordRepo {
    /// Look up the symbol for `word`.
    pub fn find(conn: &Connection, word: &str) -> Result<Option<Symbol>> {
        let id = conn
            .query_row("SELECT id FROM words WHERE word = ?1", params![word], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    /// Add a word that does not exist yet.
    pub fn create(conn: &Connection, word: &str) -> Result<Symbol> {
        if word.is_empty() {
            return Err(StoreError::InvalidArgument("empty word".into()));
        }
        let _ = conn.execute("INSERT INTO words (word) VALUES (?1)", params![word])?;
        Ok(Symbol::new(conn.last_insert_rowid()))
    }

    /// Intern: get or add a word.
    pub fn get_or_create(conn: &Connection, word: &str) -> Result<Symbol> {
        match Self::find(conn, word)? {
            Some(id) => Ok(id),
            None => Self::create(conn, word),
        }
    }

    /// Text for a symbol. A miss here is a real failure — a symbol only
    /// exists because a word row was interned.
    pub fn text(conn: &Connection, symbol: Symbol) -> Result<String> {
        conn.query_row(
            "SELECT word FROM words WHERE id = ?1",
            params![symbol],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(StoreError::NotFound {
            entity: "word",
            key: symbol.to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
