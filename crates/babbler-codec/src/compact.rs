//! Compact bit-packed brain format.
//!
//! Layout: 9-byte cookie, order byte, dictionary, forward tree, backward
//! tree — all multi-byte fields big-endian. The dictionary comes first so
//! decoding is a single pass with no rewind.
//!
//! Every node record opens with a *sizes byte*: bits 1:0, 3:2, 5:4 and 7:6
//! are 2-bit width codes (0 → u8, 1 → u16, 2 → u32, 3 → u64) for the
//! symbol, branch, usage and count fields respectively. Fields are then
//! omitted where their value is implied:
//!
//! - usage is omitted whenever branch = 0 (it is always 0 on a leaf);
//! - branch is omitted only for the FIN leaf (always 0);
//! - the ERROR root never stores a count (always 0).
//!
//! On a leaf the freed sizes-byte bits carry the count itself as an
//! MSB-first prefix code, so common leaves need no count field at all:
//!
//! - FIN leaf, bits 7:2 — `1vvvvv` count 1–32, `01vvvv` 33–48,
//!   `001vvv` 49–56, `0001vv` 57–60, `0000cc` explicit count of width `cc`;
//! - ordinary leaf, bits 7:4 — `1vvv` count 1–8, `01vv` 9–12,
//!   `00cc` explicit count of width `cc`.
//!
//! A packed FIN leaf is exactly two bytes: sizes + symbol.

use std::collections::HashMap;
use std::io::{Read, Write};

use babbler_core::{BrainId, NodeId, Symbol};
use babbler_store::BrainStore;
use tracing::debug;

use crate::dict::{ERROR_INDEX, FIN_INDEX, build_dictionary, resolve_dictionary, resolve_symbol};
use crate::errors::{CodecError, Result};
use crate::wire::{
    into_stat, read_bytes, read_u8, read_u32_be, read_uint_be, width_code, write_u8, write_u32_be,
    write_uint_be,
};

/// Magic cookie of the compact format.
pub const COOKIE: &[u8; 9] = b"BABBLERv0";

// ─────────────────────────────────────────────────────────────────────────────
// Leaf count packing
// ─────────────────────────────────────────────────────────────────────────────

/// Pack a FIN leaf count into the six spare sizes-byte bits, if it fits.
fn pack_fin(count: u64) -> Option<u8> {
    match count {
        1..=32 => Some(0b10_0000 | (count as u8 - 1)),
        33..=48 => Some(0b01_0000 | (count as u8 - 33)),
        49..=56 => Some(0b00_1000 | (count as u8 - 49)),
        57..=60 => Some(0b00_0100 | (count as u8 - 57)),
        _ => None,
    }
}

/// Unpack a FIN leaf count; `None` means an explicit count field follows,
/// of the width coded in the pattern's low bits.
fn unpack_fin(bits: u8) -> Option<u64> {
    if bits & 0b10_0000 != 0 {
        Some(u64::from(bits & 0b01_1111) + 1)
    } else if bits & 0b01_0000 != 0 {
        Some(u64::from(bits & 0b00_1111) + 33)
    } else if bits & 0b00_1000 != 0 {
        Some(u64::from(bits & 0b00_0111) + 49)
    } else if bits & 0b00_0100 != 0 {
        Some(u64::from(bits & 0b00_0011) + 57)
    } else {
        None
    }
}

/// Pack an ordinary leaf count into the four spare sizes-byte bits.
fn pack_ordinary(count: u64) -> Option<u8> {
    match count {
        1..=8 => Some(0b1000 | (count as u8 - 1)),
        9..=12 => Some(0b0100 | (count as u8 - 9)),
        _ => None,
    }
}

/// Unpack an ordinary leaf count; `None` means an explicit field follows.
fn unpack_ordinary(bits: u8) -> Option<u64> {
    if bits & 0b1000 != 0 {
        Some(u64::from(bits & 0b0111) + 1)
    } else if bits & 0b0100 != 0 {
        Some(u64::from(bits & 0b0011) + 9)
    } else {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Save
// ─────────────────────────────────────────────────────────────────────────────

/// Serialize a brain in the compact format.
pub fn save<W: Write>(store: &BrainStore, brain: BrainId, w: &mut W) -> Result<()> {
    let order = store.order(brain)?;
    let order_byte = u8::try_from(order)
        .map_err(|_| CodecError::CapacityExceeded(format!("order {order} exceeds one byte")))?;

    let (texts, index) = build_dictionary(store, brain)?;
    let dict_len = u32::try_from(texts.len()).map_err(|_| {
        CodecError::CapacityExceeded(format!(
            "dictionary has {} entries, format limit is {}",
            texts.len(),
            u32::MAX
        ))
    })?;

    w.write_all(COOKIE)?;
    write_u8(w, order_byte)?;

    write_u32_be(w, dict_len)?;
    for text in &texts {
        let bytes = text.as_bytes();
        let len = u8::try_from(bytes.len()).map_err(|_| {
            CodecError::CapacityExceeded(format!("word {text:?} exceeds 255 bytes"))
        })?;
        write_u8(w, len)?;
        w.write_all(bytes)?;
    }

    let (forward, backward) = store.roots(brain)?;
    write_node(store, &index, forward, true, w)?;
    write_node(store, &index, backward, true, w)?;

    debug!(words = texts.len(), "compact brain saved");
    Ok(())
}

fn write_node<W: Write>(
    store: &BrainStore,
    index: &HashMap<Symbol, u64>,
    node: NodeId,
    is_root: bool,
    w: &mut W,
) -> Result<()> {
    let row = store.node(node)?;
    let children = store.children(node)?;
    let branch = children.len() as u64;
    let usage = row.usage as u64;
    let count = row.count as u64;

    let symbol = if is_root {
        ERROR_INDEX
    } else {
        match row.word {
            None => FIN_INDEX,
            Some(word) => index[&word],
        }
    };
    let sym_w = width_code(symbol);

    if is_root {
        // ERROR root: count implied 0, bits 7:6 left clear.
        let branch_w = width_code(branch);
        let usage_w = width_code(usage);
        write_u8(w, (usage_w << 4) | (branch_w << 2) | sym_w)?;
        write_uint_be(w, sym_w, symbol)?;
        write_uint_be(w, branch_w, branch)?;
        write_uint_be(w, usage_w, usage)?;
    } else if row.word.is_none() {
        // FIN leaf: branch and usage implied 0.
        if branch != 0 {
            return Err(CodecError::Corrupt(
                "terminator node has children".into(),
            ));
        }
        match pack_fin(count) {
            Some(bits) => {
                write_u8(w, (bits << 2) | sym_w)?;
                write_uint_be(w, sym_w, symbol)?;
            }
            None => {
                let count_w = width_code(count);
                write_u8(w, (count_w << 2) | sym_w)?;
                write_uint_be(w, sym_w, symbol)?;
                write_uint_be(w, count_w, count)?;
            }
        }
    } else if branch == 0 {
        // Ordinary leaf: usage implied 0, branch field written (it is the
        // decoder's signal that this is a leaf).
        let branch_w = width_code(branch);
        match pack_ordinary(count) {
            Some(bits) => {
                write_u8(w, (bits << 4) | (branch_w << 2) | sym_w)?;
                write_uint_be(w, sym_w, symbol)?;
                write_uint_be(w, branch_w, branch)?;
            }
            None => {
                let count_w = width_code(count);
                write_u8(w, (count_w << 4) | (branch_w << 2) | sym_w)?;
                write_uint_be(w, sym_w, symbol)?;
                write_uint_be(w, branch_w, branch)?;
                write_uint_be(w, count_w, count)?;
            }
        }
    } else {
        let branch_w = width_code(branch);
        let usage_w = width_code(usage);
        let count_w = width_code(count);
        write_u8(w, (count_w << 6) | (usage_w << 4) | (branch_w << 2) | sym_w)?;
        write_uint_be(w, sym_w, symbol)?;
        write_uint_be(w, branch_w, branch)?;
        write_uint_be(w, usage_w, usage)?;
        write_uint_be(w, count_w, count)?;
    }

    for child in children {
        write_node(store, index, child.id, false, w)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Load
// ─────────────────────────────────────────────────────────────────────────────

/// Deserialize a compact brain file into `brain`, replacing its model.
pub fn load<R: Read>(store: &BrainStore, brain: BrainId, r: &mut R) -> Result<()> {
    let cookie = read_bytes::<9, _>(r)?;
    if &cookie != COOKIE {
        return Err(CodecError::Corrupt("bad magic cookie".into()));
    }
    let order = read_u8(r)?;
    if order == 0 {
        return Err(CodecError::Corrupt("order must be positive".into()));
    }

    let texts = read_dict(r)?;
    let symbols = resolve_dictionary(store, &texts)?;

    store.zap_model(brain)?;
    store.set_order(brain, i64::from(order))?;
    let (forward, backward) = store.roots(brain)?;

    let max_depth = u32::from(order) + 1;
    read_node(store, brain, &symbols, r, None, Some(forward), 0, max_depth)?;
    read_node(store, brain, &symbols, r, None, Some(backward), 0, max_depth)?;

    debug!(words = texts.len(), order, "compact brain loaded");
    Ok(())
}

fn read_dict<R: Read>(r: &mut R) -> Result<Vec<String>> {
    let size = read_u32_be(r)?;
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
fn read_node<R: Read>(
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

    let sizes = read_u8(r)?;
    let sym_w = sizes & 0b11;
    let symbol = read_uint_be(r, sym_w)?;

    let (branch, usage, count) = if symbol == FIN_INDEX {
        let bits = sizes >> 2;
        let count = match unpack_fin(bits) {
            Some(packed) => packed,
            None => read_uint_be(r, bits & 0b11)?,
        };
        (0, 0, count)
    } else if symbol == ERROR_INDEX {
        if root.is_none() {
            return Err(CodecError::Corrupt("root marker below the root".into()));
        }
        let branch = read_uint_be(r, (sizes >> 2) & 0b11)?;
        let usage = read_uint_be(r, (sizes >> 4) & 0b11)?;
        (branch, usage, 0)
    } else {
        let branch = read_uint_be(r, (sizes >> 2) & 0b11)?;
        if branch == 0 {
            let bits = sizes >> 4;
            let count = match unpack_ordinary(bits) {
                Some(packed) => packed,
                None => read_uint_be(r, bits & 0b11)?,
            };
            (0, 0, count)
        } else {
            let usage = read_uint_be(r, (sizes >> 4) & 0b11)?;
            let count = read_uint_be(r, sizes >> 6)?;
            (branch, usage, count)
        }
    };

    let word = resolve_symbol(symbols, symbol)?;
    let usage = into_stat(usage, "usage")?;
    let count = into_stat(count, "count")?;

    let node = match root {
        Some(id) => {
            store.update_node(id, usage, count)?;
            id
        }
        None => store.insert_node(brain, parent, word, usage, count)?,
    };

    for _ in 0..branch {
        read_node(store, brain, symbols, r, Some(node), None, depth + 1, max_depth)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{node_stats, train_cat_brain};
    use assert_matches::assert_matches;
    use std::io::Cursor;

    #[test]
    fn round_trip_preserves_topology_and_statistics() {
        let (store, brain) = train_cat_brain();
        let mut buf = Vec::new();
        save(&store, brain, &mut buf).unwrap();

        let original = node_stats(&store, brain);

        let restored = BrainStore::open_in_memory().unwrap();
        let target = restored.brain("copy").unwrap();
        load(&restored, target, &mut Cursor::new(buf)).unwrap();

        assert_eq!(node_stats(&restored, target), original);
        assert_eq!(restored.order(target).unwrap(), store.order(brain).unwrap());
    }

    #[test]
    fn fin_leaf_packs_every_graduated_range_in_two_bytes() {
        for count in [1i64, 32, 33, 48, 49, 56, 57, 60] {
            let store = BrainStore::open_in_memory().unwrap();
            let brain = store.brain("b").unwrap();
            let (forward, _) = store.roots(brain).unwrap();
            let _ = store.insert_node(brain, Some(forward), None, 0, count).unwrap();

            let mut buf = Vec::new();
            save(&store, brain, &mut buf).unwrap();

            // cookie + order + dictionary (u32 count + two reserved words)
            // + two root records of 4 bytes each (sizes, symbol, branch,
            // usage); what remains is the FIN leaf record.
            let dict = 4 + (1 + 7) + (1 + 5);
            let fin_record = buf.len() - (9 + 1 + dict + 4 + 4);
            assert_eq!(fin_record, 2, "count {count} should pack into the sizes byte");

            let restored = BrainStore::open_in_memory().unwrap();
            let target = restored.brain("copy").unwrap();
            load(&restored, target, &mut Cursor::new(buf)).unwrap();
            let (forward, _) = restored.roots(target).unwrap();
            let fin = restored.find_child(forward, None).unwrap().unwrap();
            assert_eq!(restored.node(fin).unwrap().count, count);
        }
    }

    #[test]
    fn fin_leaf_counts_outside_the_ranges_use_an_explicit_field() {
        for count in [61i64, 300, 70_000] {
            let store = BrainStore::open_in_memory().unwrap();
            let brain = store.brain("b").unwrap();
            let (forward, _) = store.roots(brain).unwrap();
            let _ = store.insert_node(brain, Some(forward), None, 0, count).unwrap();

            let mut buf = Vec::new();
            save(&store, brain, &mut buf).unwrap();

            let restored = BrainStore::open_in_memory().unwrap();
            let target = restored.brain("copy").unwrap();
            load(&restored, target, &mut Cursor::new(buf)).unwrap();
            let (forward, _) = restored.roots(target).unwrap();
            let fin = restored.find_child(forward, None).unwrap().unwrap();
            assert_eq!(restored.node(fin).unwrap().count, count);
        }
    }

    #[test]
    fn ordinary_leaf_packs_both_ranges() {
        for count in [1i64, 8, 9, 12] {
            let store = BrainStore::open_in_memory().unwrap();
            let brain = store.brain("b").unwrap();
            let (forward, _) = store.roots(brain).unwrap();
            let word = store.intern("CAT").unwrap();
            let _ = store
                .insert_node(brain, Some(forward), Some(word), 0, count)
                .unwrap();

            let mut buf = Vec::new();
            save(&store, brain, &mut buf).unwrap();

            // Record is sizes + symbol + branch: three bytes, no count.
            let dict = 4 + (1 + 7) + (1 + 5) + (1 + 3);
            let leaf_record = buf.len() - (9 + 1 + dict + 4 + 4);
            assert_eq!(leaf_record, 3, "count {count} should pack into the sizes byte");

            let restored = BrainStore::open_in_memory().unwrap();
            let target = restored.brain("copy").unwrap();
            load(&restored, target, &mut Cursor::new(buf)).unwrap();
            let (forward, _) = restored.roots(target).unwrap();
            let leaf = restored
                .find_child(forward, restored.lookup("CAT").unwrap())
                .unwrap()
                .unwrap();
            assert_eq!(restored.node(leaf).unwrap().count, count);
        }
    }

    #[test]
    fn ordinary_leaf_counts_outside_the_ranges_round_trip() {
        for count in [0i64, 13, 4000, 1 << 20] {
            let store = BrainStore::open_in_memory().unwrap();
            let brain = store.brain("b").unwrap();
            let (forward, _) = store.roots(brain).unwrap();
            let word = store.intern("CAT").unwrap();
            let _ = store
                .insert_node(brain, Some(forward), Some(word), 0, count)
                .unwrap();

            let mut buf = Vec::new();
            save(&store, brain, &mut buf).unwrap();

            let restored = BrainStore::open_in_memory().unwrap();
            let target = restored.brain("copy").unwrap();
            load(&restored, target, &mut Cursor::new(buf)).unwrap();
            let (forward, _) = restored.roots(target).unwrap();
            let leaf = restored
                .find_child(forward, restored.lookup("CAT").unwrap())
                .unwrap()
                .unwrap();
            assert_eq!(restored.node(leaf).unwrap().count, count);
        }
    }

    #[test]
    fn pack_fin_covers_exactly_one_to_sixty() {
        assert_eq!(pack_fin(0), None);
        assert_eq!(pack_fin(61), None);
        for count in 1..=60 {
            let bits = pack_fin(count).unwrap();
            assert_eq!(unpack_fin(bits), Some(count), "count {count}");
        }
    }

    #[test]
    fn pack_ordinary_covers_exactly_one_to_twelve() {
        assert_eq!(pack_ordinary(0), None);
        assert_eq!(pack_ordinary(13), None);
        for count in 1..=12 {
            let bits = pack_ordinary(count).unwrap();
            assert_eq!(unpack_ordinary(bits), Some(count), "count {count}");
        }
    }

    #[test]
    fn bad_magic_is_corrupt() {
        let store = BrainStore::open_in_memory().unwrap();
        let brain = store.brain("b").unwrap();
        let mut data = b"MegaHALv8".to_vec();
        data.push(5);
        assert_matches!(
            load(&store, brain, &mut Cursor::new(data)),
            Err(CodecError::Corrupt(_))
        );
    }

    #[test]
    fn wrong_reserved_token_is_corrupt() {
        let (store, brain) = train_cat_brain();
        let mut buf = Vec::new();
        save(&store, brain, &mut buf).unwrap();
        let pos = buf
            .windows(5)
            .position(|w| w == b"<FIN>")
            .expect("dictionary contains the terminator marker");
        buf[pos + 1] = b'Z';

        let restored = BrainStore::open_in_memory().unwrap();
        let target = restored.brain("copy").unwrap();
        assert_matches!(
            load(&restored, target, &mut Cursor::new(buf)),
            Err(CodecError::Corrupt(_))
        );
    }

    #[test]
    fn symbol_index_out_of_range_is_corrupt() {
        let store = BrainStore::open_in_memory().unwrap();
        let brain = store.brain("b").unwrap();
        let mut buf = Vec::new();
        buf.extend_from_slice(COOKIE);
        buf.push(1); // order
        buf.extend_from_slice(&2u32.to_be_bytes()); // dictionary: reserved only
        buf.push(7);
        buf.extend_from_slice(b"<ERROR>");
        buf.push(5);
        buf.extend_from_slice(b"<FIN>");
        // Forward root with one child whose symbol index is past the dict.
        buf.push(0b0000_0000); // sizes: all u8
        buf.push(0); // symbol = ERROR
        buf.push(1); // branch = 1
        buf.push(0); // usage = 0
        buf.push(0b0000_0000); // child sizes
        buf.push(9); // symbol index 9: out of range
        buf.push(0); // branch = 0
        buf.push(0); // explicit count = 0

        assert_matches!(
            load(&store, brain, &mut Cursor::new(buf)),
            Err(CodecError::Corrupt(_))
        );
    }
}
