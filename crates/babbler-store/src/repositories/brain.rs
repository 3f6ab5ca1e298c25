//! Brain repository — named model instances.

use babbler_core::BrainId;
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::{Result, StoreError};

/// Brain repository — stateless, every method takes `&Connection`.
pub struct BrainRepo;

impl BrainRepo {
    /// Look up a brain by name.
    pub fn find(conn: &Connection, name: &str) -> Result<Option<BrainId>> {
        let id = conn
            .query_row("SELECT id FROM brains WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    /// Create a brain that does not exist yet.
    pub fn create(conn: &Connection, name: &str) -> Result<BrainId> {
        if name.is_empty() {
            return Err(StoreError::InvalidArgument("empty brain name".into()));
        }
        let _ = conn.execute("INSERT INTO brains (name) VALUES (?1)", params![name])?;
        Ok(BrainId::new(conn.last_insert_rowid()))
    }

    /// Get or create a brain by name.
    pub fn get_or_create(conn: &Connection, name: &str) -> Result<BrainId> {
        match Self::find(conn, name)? {
            Some(id) => Ok(id),
            None => Self::create(conn, name),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
