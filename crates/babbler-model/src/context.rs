//! Per-direction sliding context window.
//!
//! Slot 0 always holds the direction's root ("empty context"); slot *i*
//! holds the node reached by the last *i* symbols, or `None` once that
//! exact suffix has no stored path. Keeping one live reference per context
//! length lets generation sample from the longest populated context and
//! fall back to shorter ones for free.

use babbler_core::{BrainId, NodeId, Symbol};
use babbler_store::{BrainStore, Result};

/// Traversal direction over a brain's trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Sentence order; extends replies to the right.
    Forward,
    /// Reverse sentence order; extends replies to the left.
    Backward,
}

/// Sliding window of node references, one per context length.
pub struct Context<'a> {
    store: &'a BrainStore,
    brain: BrainId,
    order: usize,
    slots: Vec<Option<NodeId>>,
}

impl<'a> Context<'a> {
    /// Create a window for `brain` sized to its configured order. All slots
    /// start empty; call [`Context::init`] before advancing.
    pub fn new(store: &'a BrainStore, brain: BrainId) -> Result<Self> {
        let order = usize::try_from(store.order(brain)?).unwrap_or(0);
        Ok(Self {
            store,
            brain,
            order,
            slots: vec![None; order + 2],
        })
    }

    /// The brain's context order.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Reset every slot and point slot 0 at the direction's root.
    pub fn init(&mut self, direction: Direction) -> Result<()> {
        let (forward, backward) = self.store.roots(self.brain)?;
        self.slots.fill(None);
        self.slots[0] = Some(match direction {
            Direction::Forward => forward,
            Direction::Backward => backward,
        });
        Ok(())
    }

    /// Extend every populated context with `word` (`None` = terminator).
    ///
    /// With `persist` set, this is the learning path: the parent's usage is
    /// bumped on every child lookup, a found child's count is bumped, and a
    /// missing child is created with count 1. Without `persist` the walk is
    /// read-only — a missing child just clears the slot.
    pub fn advance(&mut self, word: Option<Symbol>, persist: bool) -> Result<()> {
        for i in (1..self.slots.len()).rev() {
            self.slots[i] = match self.slots[i - 1] {
                Some(parent) => self.step(parent, word, persist)?,
                None => None,
            };
        }
        Ok(())
    }

    fn step(&self, parent: NodeId, word: Option<Symbol>, persist: bool) -> Result<Option<NodeId>> {
        if !persist {
            return self.store.find_child(parent, word);
        }
        self.store.bump_usage(parent)?;
        match self.store.find_child(parent, word)? {
            Some(child) => {
                self.store.bump_count(child)?;
                Ok(Some(child))
            }
            None => Ok(Some(self.store.create_child(self.brain, parent, word)?)),
        }
    }

    /// The deepest populated context node. `None` only before `init`.
    #[must_use]
    pub fn deepest(&self) -> Option<NodeId> {
        self.slots.iter().rev().find_map(|slot| *slot)
    }

    /// The root slot. `None` only before `init`.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.slots[0]
    }

    /// View the window slots, shallowest first.
    #[must_use]
    pub fn slots(&self) -> &[Option<NodeId>] {
        &self.slots
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (BrainStore, BrainId) {
        let store = BrainStore::open_in_memory().unwrap();
        let brain = store.brain("test").unwrap();
        store.set_order(brain, 2).unwrap();
        (store, brain)
    }

    #[test]
    fn window_is_order_plus_two_slots() {
        let (store, brain) = setup();
        let ctx = Context::new(&store, brain).unwrap();
        assert_eq!(ctx.slots().len(), 4);
        assert_eq!(ctx.order(), 2);
    }

    #[test]
    fn init_points_slot_zero_at_the_root() {
        let (store, brain) = setup();
        let (forward, backward) = store.roots(brain).unwrap();
        let mut ctx = Context::new(&store, brain).unwrap();

        ctx.init(Direction::Forward).unwrap();
        assert_eq!(ctx.root(), Some(forward));
        ctx.init(Direction::Backward).unwrap();
        assert_eq!(ctx.root(), Some(backward));
    }

    #[test]
    fn persistent_advance_creates_nodes_with_count_one() {
        let (store, brain) = setup();
        let cat = store.intern("CAT").unwrap();
        let mut ctx = Context::new(&store, brain).unwrap();
        ctx.init(Direction::Forward).unwrap();
        ctx.advance(Some(cat), true).unwrap();

        let (forward, _) = store.roots(brain).unwrap();
        let child = store.find_child(forward, Some(cat)).unwrap().unwrap();
        let row = store.node(child).unwrap();
        assert_eq!(row.count, 1);
        assert_eq!(row.usage, 0);
        assert_eq!(store.node(forward).unwrap().usage, 1);
    }

    #[test]
    fn persistent_advance_bumps_existing_counts() {
        let (store, brain) = setup();
        let cat = store.intern("CAT").unwrap();
        let mut ctx = Context::new(&store, brain).unwrap();
        for _ in 0..3 {
            ctx.init(Direction::Forward).unwrap();
            ctx.advance(Some(cat), true).unwrap();
        }

        let (forward, _) = store.roots(brain).unwrap();
        let child = store.find_child(forward, Some(cat)).unwrap().unwrap();
        assert_eq!(store.node(child).unwrap().count, 3);
        assert_eq!(store.node(forward).unwrap().usage, 3);
    }

    #[test]
    fn window_tracks_every_context_length() {
        let (store, brain) = setup();
        let a = store.intern("A").unwrap();
        let b = store.intern("B").unwrap();
        let mut ctx = Context::new(&store, brain).unwrap();
        ctx.init(Direction::Forward).unwrap();
        ctx.advance(Some(a), true).unwrap();
        ctx.advance(Some(b), true).unwrap();

        // Slots: root, root→B, root→A→B, and nothing at depth 3 yet.
        let slots = ctx.slots();
        assert!(slots[0].is_some());
        assert!(slots[1].is_some());
        assert!(slots[2].is_some());
        assert!(slots[3].is_none());
        assert_eq!(ctx.deepest(), slots[2]);
    }

    #[test]
    fn non_persistent_advance_never_mutates() {
        let (store, brain) = setup();
        let cat = store.intern("CAT").unwrap();
        let dog = store.intern("DOG").unwrap();

        // Learn CAT so the tree has one path.
        let mut ctx = Context::new(&store, brain).unwrap();
        ctx.init(Direction::Forward).unwrap();
        ctx.advance(Some(cat), true).unwrap();
        let (forward, _) = store.roots(brain).unwrap();
        let usage_before = store.node(forward).unwrap().usage;

        // A generation walk over known and unknown symbols.
        ctx.init(Direction::Forward).unwrap();
        ctx.advance(Some(cat), false).unwrap();
        ctx.advance(Some(dog), false).unwrap();

        assert_eq!(store.node(forward).unwrap().usage, usage_before);
        assert_eq!(store.find_child(forward, Some(dog)).unwrap(), None);
    }

    #[test]
    fn non_persistent_miss_clears_the_slot() {
        let (store, brain) = setup();
        let cat = store.intern("CAT").unwrap();
        let dog = store.intern("DOG").unwrap();
        let mut ctx = Context::new(&store, brain).unwrap();
        ctx.init(Direction::Forward).unwrap();
        ctx.advance(Some(cat), true).unwrap();

        ctx.init(Direction::Forward).unwrap();
        ctx.advance(Some(dog), false).unwrap();
        // Root stays; every deeper slot is cleared by the miss.
        assert_eq!(ctx.deepest(), ctx.root());
    }

    #[test]
    fn reinit_is_indistinguishable_from_fresh() {
        let (store, brain) = setup();
        let cat = store.intern("CAT").unwrap();
        let mut used = Context::new(&store, brain).unwrap();
        used.init(Direction::Forward).unwrap();
        used.advance(Some(cat), true).unwrap();
        used.advance(None, true).unwrap();
        used.init(Direction::Forward).unwrap();

        let mut fresh = Context::new(&store, brain).unwrap();
        fresh.init(Direction::Forward).unwrap();

        assert_eq!(used.slots(), fresh.slots());
    }
}
