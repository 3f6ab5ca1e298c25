//! High-level `BrainStore` facade.
//!
//! Owns the single connection and composes the repositories into the store
//! contract the model, codec and reply layers consume. Writes are expected
//! to happen inside a caller-scoped transaction ([`BrainStore::begin`] /
//! [`BrainStore::commit`] / [`BrainStore::rollback`] or
//! [`BrainStore::with_transaction`]) — commit on success, rollback on any
//! failure, never a partial state.

use std::path::Path;

use babbler_core::{BrainId, NodeId, Symbol};
use rand::Rng;
use rusqlite::Connection;
use tracing::debug;

use crate::connection::{ConnectionConfig, open_file, open_in_memory};
use crate::errors::{Result, StoreError};
use crate::migrations::run_migrations;
use crate::repositories::brain::BrainRepo;
use crate::repositories::list::{ListCategory, ListRepo};
use crate::repositories::map::{MapCategory, MapRepo};
use crate::repositories::model::ModelRepo;
use crate::repositories::node::{ChildRow, NodeRepo, NodeRow};
use crate::repositories::word::WordRepo;

/// Stateful cursor over one node's children: starts at a random offset and
/// visits each child exactly once per cycle. The child order is snapshotted
/// at creation, so it is stable for the cursor's lifetime.
#[derive(Debug)]
pub struct ChildCycle {
    children: Vec<ChildRow>,
    offset: usize,
    step: usize,
}

impl ChildCycle {
    fn new(children: Vec<ChildRow>) -> Self {
        let offset = if children.is_empty() {
            0
        } else {
            rand::rng().random_range(0..children.len())
        };
        Self {
            children,
            offset,
            step: 0,
        }
    }

    /// Number of children in the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the node had no children at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Iterator for ChildCycle {
    type Item = ChildRow;

    /// Next unvisited child, or `None` once the cycle is complete.
    fn next(&mut self) -> Option<ChildRow> {
        if self.step >= self.children.len() {
            return None;
        }
        let child = self.children[(self.offset + self.step) % self.children.len()];
        self.step += 1;
        Some(child)
    }
}

/// High-level brain store wrapping one `SQLite` connection.
pub struct BrainStore {
    conn: Connection,
}

impl BrainStore {
    /// Open (creating if needed) a file-backed store and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = open_file(path, &ConnectionConfig::default())?;
        let applied = run_migrations(&conn)?;
        debug!(path = %path.display(), applied, "brain store opened");
        Ok(Self { conn })
    }

    /// Open an in-memory store (for testing) and run migrations.
    pub fn open_in_memory() -> Result<Self> {
        let conn = open_in_memory(&ConnectionConfig::default())?;
        let _ = run_migrations(&conn)?;
        Ok(Self { conn })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────

    /// Begin a deferred transaction.
    pub fn begin(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    /// Commit the current transaction.
    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    /// Roll back the current transaction.
    pub fn rollback(&self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    /// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
    pub fn with_transaction<T, E>(
        &self,
        f: impl FnOnce(&Self) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<StoreError>,
    {
        self.begin().map_err(E::from)?;
        match f(self) {
            Ok(value) => {
                self.commit().map_err(E::from)?;
                Ok(value)
            }
            Err(err) => {
                // The original error is what the caller needs; a rollback
                // failure at this point means the connection is gone anyway.
                let _ = self.rollback();
                Err(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Words (interner)
    // ─────────────────────────────────────────────────────────────────────

    /// Intern a word, returning its symbol.
    pub fn intern(&self, word: &str) -> Result<Symbol> {
        WordRepo::get_or_create(&self.conn, word)
    }

    /// Look up a word without interning it.
    pub fn lookup(&self, word: &str) -> Result<Option<Symbol>> {
        WordRepo::find(&self.conn, word)
    }

    /// Text for an interned symbol.
    pub fn word_text(&self, symbol: Symbol) -> Result<String> {
        WordRepo::text(&self.conn, symbol)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Brains
    // ─────────────────────────────────────────────────────────────────────

    /// Get or create a brain by name.
    pub fn brain(&self, name: &str) -> Result<BrainId> {
        BrainRepo::get_or_create(&self.conn, name)
    }

    /// Look up a brain without creating it.
    pub fn find_brain(&self, name: &str) -> Result<Option<BrainId>> {
        BrainRepo::find(&self.conn, name)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lists and maps
    // ─────────────────────────────────────────────────────────────────────

    /// Whether `word` is on the brain's list.
    pub fn list_contains(
        &self,
        brain: BrainId,
        category: ListCategory,
        word: Symbol,
    ) -> Result<bool> {
        ListRepo::contains(&self.conn, brain, category, word)
    }

    /// Add `word` to the brain's list.
    pub fn list_add(&self, brain: BrainId, category: ListCategory, word: Symbol) -> Result<()> {
        ListRepo::add(&self.conn, brain, category, word)
    }

    /// Clear the brain's list for a category.
    pub fn list_clear(&self, brain: BrainId, category: ListCategory) -> Result<()> {
        ListRepo::clear(&self.conn, brain, category)
    }

    /// Value for `key` in the brain's map.
    pub fn map_get(
        &self,
        brain: BrainId,
        category: MapCategory,
        key: Symbol,
    ) -> Result<Option<Symbol>> {
        MapRepo::get(&self.conn, brain, category, key)
    }

    /// Map `key` to `value` in the brain's map.
    pub fn map_put(
        &self,
        brain: BrainId,
        category: MapCategory,
        key: Symbol,
        value: Symbol,
    ) -> Result<()> {
        MapRepo::put(&self.conn, brain, category, key, value)
    }

    /// Clear the brain's map for a category.
    pub fn map_clear(&self, brain: BrainId, category: MapCategory) -> Result<()> {
        MapRepo::clear(&self.conn, brain, category)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Model settings
    // ─────────────────────────────────────────────────────────────────────

    /// The brain's context order, created with the default on first use.
    pub fn order(&self, brain: BrainId) -> Result<i64> {
        ModelRepo::order(&self.conn, brain)
    }

    /// Set the brain's context order.
    pub fn set_order(&self, brain: BrainId, order: i64) -> Result<()> {
        if order < 1 {
            return Err(StoreError::InvalidArgument(format!(
                "order must be positive, got {order}"
            )));
        }
        ModelRepo::set_order(&self.conn, brain, order)
    }

    /// The brain's forward and backward roots, created on first use.
    pub fn roots(&self, brain: BrainId) -> Result<(NodeId, NodeId)> {
        ModelRepo::roots(&self.conn, brain)
    }

    /// Destroy the brain's trees and model settings.
    pub fn zap_model(&self, brain: BrainId) -> Result<()> {
        ModelRepo::zap(&self.conn, brain)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tree
    // ─────────────────────────────────────────────────────────────────────

    /// Load one node.
    pub fn node(&self, id: NodeId) -> Result<NodeRow> {
        NodeRepo::get(&self.conn, id)
    }

    /// Insert a node with explicit statistics (codec replay).
    pub fn insert_node(
        &self,
        brain: BrainId,
        parent: Option<NodeId>,
        word: Option<Symbol>,
        usage: i64,
        count: i64,
    ) -> Result<NodeId> {
        NodeRepo::insert(&self.conn, brain, parent, word, usage, count)
    }

    /// Create a fresh child with count 1 (first traversal of this suffix).
    pub fn create_child(
        &self,
        brain: BrainId,
        parent: NodeId,
        word: Option<Symbol>,
    ) -> Result<NodeId> {
        NodeRepo::insert(&self.conn, brain, Some(parent), word, 0, 1)
    }

    /// Overwrite a node's statistics.
    pub fn update_node(&self, id: NodeId, usage: i64, count: i64) -> Result<()> {
        NodeRepo::update(&self.conn, id, usage, count)
    }

    /// Increment a node's usage, saturating.
    pub fn bump_usage(&self, id: NodeId) -> Result<()> {
        NodeRepo::bump_usage(&self.conn, id)
    }

    /// Increment a node's count, saturating.
    pub fn bump_count(&self, id: NodeId) -> Result<()> {
        NodeRepo::bump_count(&self.conn, id)
    }

    /// Find the child of `parent` keyed by `word` (`None` = terminator).
    pub fn find_child(&self, parent: NodeId, word: Option<Symbol>) -> Result<Option<NodeId>> {
        NodeRepo::find_child(&self.conn, parent, word)
    }

    /// All children of `parent` in stable text order.
    pub fn children(&self, parent: NodeId) -> Result<Vec<ChildRow>> {
        NodeRepo::children(&self.conn, parent)
    }

    /// Number of children of `parent`.
    pub fn child_count(&self, parent: NodeId) -> Result<i64> {
        NodeRepo::child_count(&self.conn, parent)
    }

    /// A uniformly random child of `parent`.
    pub fn random_child(&self, parent: NodeId) -> Result<Option<ChildRow>> {
        NodeRepo::random_child(&self.conn, parent)
    }

    /// A fresh exactly-once cycle cursor over the children of `parent`.
    pub fn child_cycle(&self, parent: NodeId) -> Result<ChildCycle> {
        Ok(ChildCycle::new(self.children(parent)?))
    }

    /// Whether `word` occurs anywhere in the brain's trees.
    pub fn contains_word(&self, brain: BrainId, word: Symbol) -> Result<bool> {
        NodeRepo::contains_word(&self.conn, brain, word)
    }

    /// Every distinct word in the brain's trees, ordered by text.
    pub fn dump_words(&self, brain: BrainId) -> Result<Vec<(Symbol, String)>> {
        NodeRepo::dump_words(&self.conn, brain)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn store() -> BrainStore {
        BrainStore::open_in_memory().unwrap()
    }

    #[test]
    fn open_file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brains.db");
        let store = BrainStore::open(&path).unwrap();
        let sym = store.intern("CAT").unwrap();
        drop(store);
        let store = BrainStore::open(&path).unwrap();
        assert_eq!(store.lookup("CAT").unwrap(), Some(sym));
    }

    #[test]
    fn with_transaction_commits_on_success() {
        let store = store();
        let sym = store
            .with_transaction::<_, StoreError>(|s| s.intern("KEPT"))
            .unwrap();
        assert_eq!(store.lookup("KEPT").unwrap(), Some(sym));
    }

    #[test]
    fn with_transaction_rolls_back_on_error() {
        let store = store();
        let result: std::result::Result<(), StoreError> = store.with_transaction(|s| {
            let _ = s.intern("DISCARDED")?;
            Err(StoreError::InvalidArgument("boom".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.lookup("DISCARDED").unwrap(), None);
    }

    #[test]
    fn explicit_rollback_discards_writes() {
        let store = store();
        store.begin().unwrap();
        let _ = store.intern("GONE").unwrap();
        store.rollback().unwrap();
        assert_eq!(store.lookup("GONE").unwrap(), None);
    }

    #[test]
    fn cycle_visits_each_child_exactly_once() {
        let store = store();
        let brain = store.brain("b").unwrap();
        let (forward, _) = store.roots(brain).unwrap();
        let mut expected = HashSet::new();
        for text in ["A", "B", "C", "D", "E"] {
            let word = store.intern(text).unwrap();
            let id = store.create_child(brain, forward, Some(word)).unwrap();
            let _ = expected.insert(id);
        }

        let mut cycle = store.child_cycle(forward).unwrap();
        assert_eq!(cycle.len(), 5);
        let mut seen = HashSet::new();
        while let Some(child) = cycle.next() {
            assert!(seen.insert(child.id), "child visited twice");
        }
        assert_eq!(seen, expected);
        assert_eq!(cycle.next(), None);
    }

    #[test]
    fn cycle_on_leaf_is_empty() {
        let store = store();
        let brain = store.brain("b").unwrap();
        let (forward, _) = store.roots(brain).unwrap();
        let mut cycle = store.child_cycle(forward).unwrap();
        assert!(cycle.is_empty());
        assert_eq!(cycle.next(), None);
    }

    #[test]
    fn set_order_rejects_non_positive_values() {
        let store = store();
        let brain = store.brain("b").unwrap();
        assert!(store.set_order(brain, 0).is_err());
        assert!(store.set_order(brain, 3).is_ok());
        assert_eq!(store.order(brain).unwrap(), 3);
    }
}
