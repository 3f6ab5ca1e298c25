//! # babbler-codec
//!
//! Binary brain file codec with two incompatible on-disk formats:
//!
//! - **[`legacy`]** (`MegaHALv8`): fixed-width fields, host-native byte
//!   order, dictionary trailer at end-of-file, two-phase decode
//! - **[`compact`]** (`BABBLERv0`): big-endian, per-field width codes in a
//!   sizes byte, leaf count packing, dictionary first, single-pass decode
//!
//! [`save_brain`] picks the format from an explicit [`BrainFileFormat`];
//! [`load_brain`] sniffs the magic cookie and dispatches.

#![deny(unsafe_code)]

pub mod compact;
mod dict;
pub mod errors;
pub mod legacy;
mod wire;

pub use errors::{CodecError, Result};

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use babbler_core::BrainId;
use babbler_store::BrainStore;
use tracing::info;

/// The two on-disk brain formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrainFileFormat {
    /// Fixed-width legacy format (`MegaHALv8`).
    Legacy,
    /// Bit-packed compact format (`BABBLERv0`).
    Compact,
}

/// Serialize a brain to `path` in the chosen format.
pub fn save_brain(
    store: &BrainStore,
    brain: BrainId,
    format: BrainFileFormat,
    path: &Path,
) -> Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    match format {
        BrainFileFormat::Legacy => legacy::save(store, brain, &mut w)?,
        BrainFileFormat::Compact => compact::save(store, brain, &mut w)?,
    }
    w.flush()?;
    info!(?format, path = %path.display(), "brain saved");
    Ok(())
}

/// Load a brain file from `path` into `brain`, replacing its model.
/// The format is detected from the magic cookie.
pub fn load_brain(store: &BrainStore, brain: BrainId, path: &Path) -> Result<BrainFileFormat> {
    let file = File::open(path)?;
    let mut r = BufReader::new(file);

    let mut cookie = [0u8; 9];
    r.read_exact(&mut cookie)?;
    let _ = r.seek(SeekFrom::Start(0))?;

    let format = if &cookie == legacy::COOKIE {
        BrainFileFormat::Legacy
    } else if &cookie == compact::COOKIE {
        BrainFileFormat::Compact
    } else {
        return Err(CodecError::Corrupt("unrecognized brain file magic".into()));
    };

    match format {
        BrainFileFormat::Legacy => legacy::load(store, brain, &mut r)?,
        BrainFileFormat::Compact => compact::load(store, brain, &mut r)?,
    }
    info!(?format, path = %path.display(), "brain loaded");
    Ok(format)
}

// ─────────────────────────────────────────────────────────────────────────────
// Test support
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_support {
    use babbler_core::{BrainId, List, NodeId};
    use babbler_store::BrainStore;

    /// One depth-first fingerprint entry: depth, word text, usage, count.
    pub type Fingerprint = Vec<(u32, Option<String>, i64, i64)>;

    /// A small brain trained on two sentences, order 2.
    pub fn train_cat_brain() -> (BrainStore, BrainId) {
        let store = BrainStore::open_in_memory().unwrap();
        let brain = store.brain("cat").unwrap();
        store.set_order(brain, 2).unwrap();
        for sentence in ["THE CAT SAT.", "THE CAT SPAT."] {
            let words: List = babbler_core::tokenize(sentence)
                .iter()
                .map(|t| store.intern(t).unwrap())
                .collect();
            babbler_model::learn(&store, brain, &words).unwrap();
        }
        (store, brain)
    }

    /// Depth-first structural fingerprint of both trees, word texts instead
    /// of raw symbols so it is comparable across stores.
    pub fn node_stats(store: &BrainStore, brain: BrainId) -> Fingerprint {
        fn walk(store: &BrainStore, node: NodeId, depth: u32, out: &mut Fingerprint) {
            let row = store.node(node).unwrap();
            let text = row.word.map(|w| store.word_text(w).unwrap());
            out.push((depth, text, row.usage, row.count));
            for child in store.children(node).unwrap() {
                walk(store, child.id, depth + 1, out);
            }
        }

        let (forward, backward) = store.roots(brain).unwrap();
        let mut out = Vec::new();
        walk(store, forward, 0, &mut out);
        walk(store, backward, 0, &mut out);
        out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
