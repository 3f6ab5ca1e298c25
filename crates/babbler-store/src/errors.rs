//! Error types for the brain store.
//!
//! [`StoreError`] is returned by every store operation. Expected lookup
//! misses (get-or-create control flow) are `Option` returns on the
//! individual methods, not errors; [`StoreError::NotFound`] is reserved for
//! misses that are real failures, such as rendering a symbol with no word
//! row behind it.

use thiserror::Error;

/// Errors that can occur during brain store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error. Fatal to the current call; the surrounding
    /// transaction is expected to roll back.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// An entity that must exist was missing.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind, e.g. `"word"` or `"node"`.
        entity: &'static str,
        /// Lookup key, rendered for diagnostics.
        key: String,
    },

    /// A required argument was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_error_display() {
        let err = StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().contains("sqlite error"));
    }

    #[test]
    fn migration_error_display() {
        let err = StoreError::Migration {
            message: "v001 failed".into(),
        };
        assert_eq!(err.to_string(), "migration error: v001 failed");
    }

    #[test]
    fn not_found_display() {
        let err = StoreError::NotFound {
            entity: "word",
            key: "42".into(),
        };
        assert_eq!(err.to_string(), "word not found: 42");
    }

    #[test]
    fn invalid_argument_display() {
        let err = StoreError::InvalidArgument("empty brain name".into());
        assert_eq!(err.to_string(), "invalid argument: empty brain name");
    }

    #[test]
    fn from_rusqlite_error() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
