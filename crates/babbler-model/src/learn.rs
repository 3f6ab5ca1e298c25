//! Sentence learning.
//!
//! A sentence is fed through the forward tree in order and the backward
//! tree reversed, each pass closed with the 0-terminator so the model also
//! learns where sentences end. Sentences no longer than the order carry no
//! usable n-gram and are skipped.

use babbler_core::{BrainId, List};
use babbler_store::{BrainStore, Result};
use tracing::debug;

use crate::context::{Context, Direction};

/// Learn one tokenized sentence into both of the brain's trees.
pub fn learn(store: &BrainStore, brain: BrainId, words: &List) -> Result<()> {
    let mut ctx = Context::new(store, brain)?;
    if words.len() <= ctx.order() {
        debug!(len = words.len(), order = ctx.order(), "sentence too short to learn");
        return Ok(());
    }

    ctx.init(Direction::Forward)?;
    for word in words.iter() {
        ctx.advance(Some(word), true)?;
    }
    ctx.advance(None, true)?;

    ctx.init(Direction::Backward)?;
    for word in words.iter().rev() {
        ctx.advance(Some(word), true)?;
    }
    ctx.advance(None, true)?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
