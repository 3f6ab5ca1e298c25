//! Node repository — the persistent n-gram tree.
//!
//! Nodes are addressed only by opaque row ids; callers never own a subtree.
//! `usage` and `count` increments saturate at the column maximum instead of
//! wrapping.

use babbler_core::{BrainId, NodeId, Symbol};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::errors::{Result, StoreError};

/// A full node row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeRow {
    /// Node id.
    pub id: NodeId,
    /// Parent node, `None` at a root.
    pub parent: Option<NodeId>,
    /// Word at this position, `None` for the reserved symbol 0.
    pub word: Option<Symbol>,
    /// Traversal count through this node as an intermediate context step.
    pub usage: i64,
    /// Times this node was the realized next symbol from its parent.
    pub count: i64,
}

/// A child row as returned by [`NodeRepo::children`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildRow {
    /// Node id.
    pub id: NodeId,
    /// Word at this position, `None` for the terminator leaf.
    pub word: Option<Symbol>,
    /// Traversal count.
    pub usage: i64,
    /// Selection count.
    pub count: i64,
}

const CHILD_COLUMNS: &str = "id, word, usage, count";

/// Node repository — stateless, every method takes `&Connection`.
pub struct NodeRepo;

impl NodeRepo {
    /// Insert a node with explicit statistics. Used by tree building and by
    /// the codec when replaying a brain file.
    pub fn insert(
        conn: &Connection,
        brain: BrainId,
        parent: Option<NodeId>,
        word: Option<Symbol>,
        usage: i64,
        count: i64,
    ) -> Result<NodeId> {
        let _ = conn.execute(
            "INSERT INTO nodes (brain, parent, word, usage, count) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![brain, parent, word, usage, count],
        )?;
        Ok(NodeId::new(conn.last_insert_rowid()))
    }

    /// Load one node.
    pub fn get(conn: &Connection, id: NodeId) -> Result<NodeRow> {
        conn.query_row(
            "SELECT id, parent, word, usage, count FROM nodes WHERE id = ?1",
            params![id],
            |row| {
                Ok(NodeRow {
                    id: row.get(0)?,
                    parent: row.get(1)?,
                    word: row.get(2)?,
                    usage: row.get(3)?,
                    count: row.get(4)?,
                })
            },
        )
        .optional()?
        .ok_or(StoreError::NotFound {
            entity: "node",
            key: id.to_string(),
        })
    }

    /// Overwrite a node's statistics.
    pub fn update(conn: &Connection, id: NodeId, usage: i64, count: i64) -> Result<()> {
        let _ = conn.execute(
            "UPDATE nodes SET usage = ?2, count = ?3 WHERE id = ?1",
            params![id, usage, count],
        )?;
        Ok(())
    }

    /// Increment a node's usage, saturating at the column maximum.
    pub fn bump_usage(conn: &Connection, id: NodeId) -> Result<()> {
        let _ = conn.execute(
            "UPDATE nodes SET usage = CASE WHEN usage >= ?2 THEN usage ELSE usage + 1 END
             WHERE id = ?1",
            params![id, i64::MAX],
        )?;
        Ok(())
    }

    /// Increment a node's count, saturating at the column maximum.
    pub fn bump_count(conn: &Connection, id: NodeId) -> Result<()> {
        let _ = conn.execute(
            "UPDATE nodes SET count = CASE WHEN count >= ?2 THEN count ELSE count + 1 END
             WHERE id = ?1",
            params![id, i64::MAX],
        )?;
        Ok(())
    }

    /// Find the child of `parent` keyed by `word` (`None` = terminator).
    pub fn find_child(
        conn: &Connection,
        parent: NodeId,
        word: Option<Symbol>,
    ) -> Result<Option<NodeId>> {
        let id = conn
            .query_row(
                "SELECT id FROM nodes WHERE parent = ?1 AND word IS ?2",
                params![parent, word],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// All children of `parent`, ordered by word text with the terminator
    /// last. The order is stable, which the cycle cursor depends on.
    pub fn children(conn: &Connection, parent: NodeId) -> Result<Vec<ChildRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {CHILD_COLUMNS} FROM nodes WHERE parent = ?1
             ORDER BY (SELECT w.word FROM words w WHERE w.id = nodes.word) NULLS LAST, id"
        ))?;
        let rows = stmt
            .query_map(params![parent], Self::map_child)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of children of `parent`.
    pub fn child_count(conn: &Connection, parent: NodeId) -> Result<i64> {
        let n = conn.query_row(
            "SELECT COUNT(*) FROM nodes WHERE parent = ?1",
            params![parent],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// A uniformly random child of `parent`, if any.
    pub fn random_child(conn: &Connection, parent: NodeId) -> Result<Option<ChildRow>> {
        let row = conn
            .query_row(
                &format!(
                    "SELECT {CHILD_COLUMNS} FROM nodes WHERE parent = ?1
                     ORDER BY RANDOM() LIMIT 1"
                ),
                params![parent],
                Self::map_child,
            )
            .optional()?;
        Ok(row)
    }

    /// Whether `word` occurs anywhere in the brain's trees.
    pub fn contains_word(conn: &Connection, brain: BrainId, word: Symbol) -> Result<bool> {
        let hit: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM nodes WHERE brain = ?1 AND word = ?2 LIMIT 1",
                params![brain, word],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hit.is_some())
    }

    /// Every distinct word used by the brain's trees, ordered by text.
    /// Consumed only by the brain file codec.
    pub fn dump_words(conn: &Connection, brain: BrainId) -> Result<Vec<(Symbol, String)>> {
        let mut stmt = conn.prepare(
            "SELECT w.id, w.word FROM words w
             WHERE w.id IN (SELECT word FROM nodes WHERE brain = ?1 AND word IS NOT NULL)
             ORDER BY w.word",
        )?;
        let rows = stmt
            .query_map(params![brain], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_child(row: &Row<'_>) -> rusqlite::Result<ChildRow> {
        Ok(ChildRow {
            id: row.get(0)?,
            word: row.get(1)?,
            usage: row.get(2)?,
            count: row.get(3)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
