//! `SQLite` connection setup with WAL mode and foreign keys enabled.
//!
//! The store is single-threaded by contract — one learn-or-reply call, one
//! transaction, one connection — so there is no pool; [`open_file`] and
//! [`open_in_memory`] hand back a single configured [`Connection`].

use std::path::Path;

use rusqlite::Connection;

use crate::errors::Result;

/// Connection tuning applied on open.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Busy timeout in milliseconds (default: 30000).
    pub busy_timeout_ms: u32,
    /// Cache size in KiB (default: 8192 = 8 MB).
    pub cache_size_kib: i64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 30_000,
            cache_size_kib: 8192,
        }
    }
}

fn apply_pragmas(conn: &Connection, config: &ConnectionConfig) -> Result<()> {
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;\
         PRAGMA busy_timeout = {};\
         PRAGMA foreign_keys = ON;\
         PRAGMA cache_size = -{};\
         PRAGMA synchronous = NORMAL;",
        config.busy_timeout_ms, config.cache_size_kib
    ))?;
    Ok(())
}

/// Open (creating if needed) a file-backed database.
pub fn open_file(path: &Path, config: &ConnectionConfig) -> Result<Connection> {
    let conn = Connection::open(path)?;
    apply_pragmas(&conn, config)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_in_memory(config: &ConnectionConfig) -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    apply_pragmas(&conn, config)?;
    Ok(conn)
}

/// Verify pragmas are set correctly on a connection.
pub fn verify_pragmas(conn: &Connection) -> Result<PragmaState> {
    let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
    let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    Ok(PragmaState {
        journal_mode,
        foreign_keys_enabled: foreign_keys == 1,
    })
}

/// Pragma state for verification.
#[derive(Debug)]
pub struct PragmaState {
    /// Journal mode (`"wal"` for file-backed databases).
    pub journal_mode: String,
    /// Whether foreign keys are enabled.
    pub foreign_keys_enabled: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
