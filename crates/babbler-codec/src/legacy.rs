//! Legacy fixed-width brain format.
//!
//! Layout: 9-byte cookie, order byte, forward tree, backward tree,
//! dictionary trailer. Per-node record: symbol u16, usage u32, count u16,
//! branch u16 — host-native byte order, preserved as-is. Children follow
//! immediately in depth-first pre-order.
//!
//! The dictionary sits at end-of-file while tree records reference it by
//! index, so decoding is two-phase: a skip-pass streams the tree bodies to
//! reach the trailer and intern the dictionary, then a resolve-pass rewinds
//! and replays the trees into the store.
//!
//! Statistics that overflow their fields saturate to the field maximum —
//! the format's deliberate lossy behavior, preserved rather than turned
//! into an error.

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom, Write};

use babbler_core::{BrainId, NodeId, Symbol};
use babbler_store::BrainStore;
use tracing::debug;

use crate::dict::{FIN_INDEX, build_dictionary, resolve_dictionary, resolve_symbol};
use crate::errors::{CodecError, Result};
use crate::wire::{
    read_bytes, read_u8, read_u16_ne, read_u32_ne, write_u8, write_u16_ne, write_u32_ne,
};

/// Magic cookie of the legacy format.
pub const COOKIE: &[u8; 9] = b"MegaHALv8";

/// Largest dictionary the 16-bit symbol field can address.
const MAX_DICT: usize = 1 << 16;

// ─────────────────────────────────────────────────────────────────────────────
// Save
// ─────────────────────────────────────────────────────────────────────────────

/// Serialize a brain in the legacy format.
pub fn save<W: Write>(store: &BrainStore, brain: BrainId, w: &mut W) -> Result<()> {
    let order = store.order(brain)?;
    let order_byte = u8::try_from(order)
        .map_err(|_| CodecError::CapacityExceeded(format!("order {order} exceeds one byte")))?;

    let (texts, index) = build_dictionary(store, brain)?;
    if texts.len() > MAX_DICT {
        return Err(CodecError::CapacityExceeded(format!(
            "dictionary has {} entries, format limit is {MAX_DICT}",
            texts.len()
        )));
    }

    w.write_all(COOKIE)?;
    write_u8(w, order_byte)?;

    let (forward, backward) = store.roots(brain)?;
    write_tree(store, &index, forward, true, w)?;
    write_tree(store, &index, backward, true, w)?;

    write_u32_ne(w, texts.len() as u32)?;
    for text in &texts {
        let bytes = text.as_bytes();
        let len = u8::try_from(bytes.len()).map_err(|_| {
            CodecError::CapacityExceeded(format!("word {text:?} exceeds 255 bytes"))
        })?;
        write_u8(w, len)?;
        w.write_all(bytes)?;
    }

    debug!(words = texts.len(), "legacy brain saved");
    Ok(())
}

fn write_tree<W: Write>(
    store: &BrainStore,
    index: &HashMap<Symbol, u64>,
    node: NodeId,
    is_root: bool,
    w: &mut W,
) -> Result<()> {
    let row = store.node(node)?;
    let children = store.children(node)?;

    let symbol = if is_root {
        0
    } else {
        match row.word {
            None => FIN_INDEX as u16,
            // Index values are bounded by the dictionary cap checked above.
            Some(word) => index[&word] as u16,
        }
    };

    // Saturating truncation, a preserved quirk of the format. The branch
    // field is also saturated; the child walk below emits exactly the
    // written number so the record stays structurally sound.
    let usage = u32::try_from(row.usage).unwrap_or(u32::MAX);
    let count = u16::try_from(row.count).unwrap_or(u16::MAX);
    let branch = u16::try_from(children.len()).unwrap_or(u16::MAX);

    write_u16_ne(w, symbol)?;
    write_u32_ne(w, usage)?;
    write_u16_ne(w, count)?;
    write_u16_ne(w, branch)?;

    for child in children.iter().take(usize::from(branch)) {
        write_tree(store, index, child.id, false, w)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Load
// ─────────────────────────────────────────────────────────────────────────────

/// Deserialize a legacy brain file into `brain`, replacing its model.
pub fn load<R: Read + Seek>(store: &BrainStore, brain: BrainId, r: &mut R) -> Result<()> {
    // Phase 1: stream past the trees to the dictionary trailer.
    let cookie = read_bytes::<9, _>(r)?;
    if &cookie != COOKIE {
        return Err(CodecError::Corrupt("bad magic cookie".into()));
    }
    let order = read_u8(r)?;
    if order == 0 {
        return Err(CodecError::Corrupt("order must be positive".into()));
    }
    let max_depth = u32::from(order) + 1;

    skip_tree(r, 0, max_depth)?;
    skip_tree(r, 0, max_depth)?;
    let texts = read_dict(r)?;
    let symbols = resolve_dictionary(store, &texts)?;

    // Phase 2: rewind and replay the trees into the store.
    let _ = r.seek(SeekFrom::Start(0))?;
    let _ = read_bytes::<9, _>(r)?;
    let _ = read_u8(r)?;

    store.zap_model(brain)?;
    store.set_order(brain, i64::from(order))?;
    let (forward, backward) = store.roots(brain)?;

    load_tree(store, brain, &symbols, r, None, Some(forward), 0, max_depth)?;
    load_tree(store, brain, &symbols, r, None, Some(backward), 0, max_depth)?;

    debug!(words = texts.len(), order, "legacy brain loaded");
    Ok(())
}

/// Read one tree without interpreting it, to get past it in the stream.
fn skip_tree<R: Read>(r: &mut R, depth: u32, max_depth: u32) -> Result<()> {
    if depth > max_depth {
        return Err(CodecError::Corrupt(format!(
            "tree deeper than order allows ({max_depth})"
        )));
    }
    let _symbol = read_u16_ne(r)?;
    let _usage = read_u32_ne(r)?;
    let _count = read_u16_ne(r)?;
    let branch = read_u16_ne(r)?;
    for _ in 0..branch {
        skip_tree(r, depth + 1, max_depth)?;
    }
    Ok(())
}

fn read_dict<R: Read>(r: &mut R) -> Result<Vec<String>> {
    let size = read_u32_ne(r)?;
    let mut texts = Vec::with_capacity(size.min(1 << 20) as usize);
    for _ in 0..size {
        let len = read_u8(r)?;
        let mut buf = vec![0u8; usize::from(len)];
        r.read_exact(&mut buf)?;
        let text = String::from_utf8(buf)
            .map_err(|_| CodecError::Corrupt("dictionary word is not valid UTF-8".into()))?;
        texts.push(text);
    }
    Ok(texts)
}

#[allow(clippy::too_many_arguments)]
fn load_tree<R: Read>(
    store: &BrainStore,
    brain: BrainId,
    symbols: &[Option<Symbol>],
    r: &mut R,
    parent: Option<NodeId>,
    root: Option<NodeId>,
    depth: u32,
    max_depth: u32,
) -> Result<()> {
    if depth > max_depth {
        return Err(CodecError::Corrupt(format!(
            "tree deeper than order allows ({max_depth})"
        )));
    }
    let symbol = read_u16_ne(r)?;
    let usage = i64::from(read_u32_ne(r)?);
    let count = i64::from(read_u16_ne(r)?);
    let branch = read_u16_ne(r)?;

    let word = resolve_symbol(symbols, u64::from(symbol))?;
    let node = match root {
        Some(id) => {
            store.update_node(id, usage, count)?;
            id
        }
        None => store.insert_node(brain, parent, word, usage, count)?,
    };

    for _ in 0..branch {
        load_tree(store, brain, symbols, r, Some(node), None, depth + 1, max_depth)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
