//! Line-oriented loaders for word lists and swap maps.
//!
//! File format: one entry per line, `#` starts a comment, blank lines are
//! skipped, tokens are whitespace-delimited. List files carry one word per
//! line; map files carry a key and a value. Loading clears the category
//! first, so a load replaces rather than merges.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use babbler_core::BrainId;
use babbler_store::{BrainStore, ListCategory, MapCategory};
use tracing::debug;

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(['\t', ' ', '#']).filter(|t| !t.is_empty())
}

/// Replace the brain's list for `category` with the contents of `path`.
pub fn load_list(
    store: &BrainStore,
    brain: BrainId,
    category: ListCategory,
    path: &Path,
) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read list file {}", path.display()))?;
    store.list_clear(brain, category)?;

    let mut entries = 0u32;
    for line in text.lines() {
        if line.starts_with('#') {
            continue;
        }
        let Some(token) = tokens(line).next() else {
            continue;
        };
        let word = store.intern(token)?;
        store.list_add(brain, category, word)?;
        entries += 1;
    }

    debug!(?category, entries, path = %path.display(), "list loaded");
    Ok(())
}

/// Replace the brain's map for `category` with the contents of `path`.
pub fn load_map(
    store: &BrainStore,
    brain: BrainId,
    category: MapCategory,
    path: &Path,
) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read map file {}", path.display()))?;
    store.map_clear(brain, category)?;

    let mut entries = 0u32;
    for line in text.lines() {
        if line.starts_with('#') {
            continue;
        }
        let mut parts = tokens(line);
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let key = store.intern(key)?;
        let value = store.intern(value)?;
        store.map_put(brain, category, key, value)?;
        entries += 1;
    }

    debug!(?category, entries, path = %path.display(), "map loaded");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
