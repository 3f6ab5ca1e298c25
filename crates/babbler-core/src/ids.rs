//! Branded ID newtypes for type safety.
//!
//! Every persistent entity is addressed by a distinct integer newtype so a
//! brain row id can never be passed where a tree node id is expected. The
//! inner value is the store's `INTEGER PRIMARY KEY`, which is why the
//! `rusqlite` column conversions live here rather than in the store crate.
//!
//! [`Symbol`] is the id of an interned word. The value 0 never appears in
//! the word table — it is the reserved root/terminator sentinel, represented
//! in Rust as `Option::<Symbol>::None` and in SQL as `NULL`.

use std::fmt;

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw row id.
            #[must_use]
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw row id.
            #[must_use]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

row_id! {
    /// Unique identifier for a named brain.
    BrainId
}

row_id! {
    /// Unique identifier for a tree node within the store.
    NodeId
}

row_id! {
    /// Interned word id. One global namespace across all brains; 0 is the
    /// reserved root/terminator sentinel and never names a real word.
    Symbol
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
