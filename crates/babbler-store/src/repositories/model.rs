//! Model repository — per-brain order and root nodes.

use babbler_core::{BrainId, NodeId};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::repositories::node::NodeRepo;

/// Default context depth for a brain that has never been configured.
pub const DEFAULT_ORDER: i64 = 5;

/// Model repository — stateless, every method takes `&Connection`.
pub struct ModelRepo;

impl ModelRepo {
    /// The brain's context order, creating the model row with
    /// [`DEFAULT_ORDER`] on first use.
    pub fn order(conn: &Connection, brain: BrainId) -> Result<i64> {
        if let Some(order) = Self::find_order(conn, brain)? {
            return Ok(order);
        }
        let _ = conn.execute(
            "INSERT INTO models (brain, contexts) VALUES (?1, ?2)",
            params![brain, DEFAULT_ORDER],
        )?;
        Ok(DEFAULT_ORDER)
    }

    /// The brain's context order, if a model row exists.
    pub fn find_order(conn: &Connection, brain: BrainId) -> Result<Option<i64>> {
        let order = conn
            .query_row(
                "SELECT contexts FROM models WHERE brain = ?1",
                params![brain],
                |row| row.get(0),
            )
            .optional()?;
        Ok(order)
    }

    /// Set the brain's context order, creating the model row if needed.
    pub fn set_order(conn: &Connection, brain: BrainId, order: i64) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO models (brain, contexts) VALUES (?1, ?2)
             ON CONFLICT (brain) DO UPDATE SET contexts = excluded.contexts",
            params![brain, order],
        )?;
        Ok(())
    }

    /// The brain's forward and backward roots, created on first use.
    pub fn roots(conn: &Connection, brain: BrainId) -> Result<(NodeId, NodeId)> {
        // Ensure the model row exists before reading root pointers.
        let _ = Self::order(conn, brain)?;

        let (forward, backward): (Option<NodeId>, Option<NodeId>) = conn.query_row(
            "SELECT forward, backward FROM models WHERE brain = ?1",
            params![brain],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut created = false;
        let forward = match forward {
            Some(id) => id,
            None => {
                created = true;
                NodeRepo::insert(conn, brain, None, None, 0, 0)?
            }
        };
        let backward = match backward {
            Some(id) => id,
            None => {
                created = true;
                NodeRepo::insert(conn, brain, None, None, 0, 0)?
            }
        };

        if created {
            let _ = conn.execute(
                "UPDATE models SET forward = ?2, backward = ?3 WHERE brain = ?1",
                params![brain, forward, backward],
            )?;
        }

        Ok((forward, backward))
    }

    /// Destroy the brain's model: every tree node and the model row itself.
    pub fn zap(conn: &Connection, brain: BrainId) -> Result<()> {
        // Detach root pointers first so the node delete does not trip the
        // models → nodes references.
        let _ = conn.execute(
            "UPDATE models SET forward = NULL, backward = NULL WHERE brain = ?1",
            params![brain],
        )?;
        let _ = conn.execute("DELETE FROM nodes WHERE brain = ?1", params![brain])?;
        let _ = conn.execute("DELETE FROM models WHERE brain = ?1", params![brain])?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
