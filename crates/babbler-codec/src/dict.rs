//! Shared dictionary handling for both formats.
//!
//! A brain file dictionary always reserves index 0 for `"<ERROR>"` (the
//! root marker) and index 1 for `"<FIN>"` (the terminator marker); both
//! resolve to symbol 0 — `None` in this codebase. A file carrying any
//! other text at those indices is rejected as corrupt.

use std::collections::HashMap;

use babbler_core::{BrainId, Symbol};
use babbler_store::BrainStore;

use crate::errors::{CodecError, Result};

/// Reserved dictionary entry marking the tree root.
pub(crate) const ERROR_TOKEN: &str = "<ERROR>";
/// Reserved dictionary entry marking the sentence terminator.
pub(crate) const FIN_TOKEN: &str = "<FIN>";

/// Dictionary index of the root marker.
pub(crate) const ERROR_INDEX: u64 = 0;
/// Dictionary index of the terminator marker.
pub(crate) const FIN_INDEX: u64 = 1;

/// Build the save-side dictionary: reserved tokens first, then every word
/// the brain's trees use, ordered by text. Returns the texts and the
/// symbol → index map used while walking the trees.
pub(crate) fn build_dictionary(
    store: &BrainStore,
    brain: BrainId,
) -> Result<(Vec<String>, HashMap<Symbol, u64>)> {
    let words = store.dump_words(brain)?;
    let mut texts = Vec::with_capacity(words.len() + 2);
    texts.push(ERROR_TOKEN.to_owned());
    texts.push(FIN_TOKEN.to_owned());

    let mut index = HashMap::with_capacity(words.len());
    for (position, (symbol, text)) in words.into_iter().enumerate() {
        let _ = index.insert(symbol, position as u64 + 2);
        texts.push(text);
    }
    Ok((texts, index))
}

/// Resolve a decoded dictionary: verify the reserved entries and intern the
/// rest. Index 0 and 1 map to `None` (symbol 0).
pub(crate) fn resolve_dictionary(
    store: &BrainStore,
    texts: &[String],
) -> Result<Vec<Option<Symbol>>> {
    if texts.len() < 2 {
        return Err(CodecError::Corrupt(format!(
            "dictionary has {} entries, reserved tokens missing",
            texts.len()
        )));
    }
    if texts[0] != ERROR_TOKEN {
        return Err(CodecError::Corrupt(format!(
            "expected {ERROR_TOKEN:?} at dictionary index 0, found {:?}",
            texts[0]
        )));
    }
    if texts[1] != FIN_TOKEN {
        return Err(CodecError::Corrupt(format!(
            "expected {FIN_TOKEN:?} at dictionary index 1, found {:?}",
            texts[1]
        )));
    }

    let mut symbols = Vec::with_capacity(texts.len());
    symbols.push(None);
    symbols.push(None);
    for text in &texts[2..] {
        symbols.push(Some(store.intern(text)?));
    }
    Ok(symbols)
}

/// Resolve a node record's dictionary index to a word. The reserved
/// indices are the symbol-0 sentinel; anything past the dictionary is
/// corrupt.
pub(crate) fn resolve_symbol(symbols: &[Option<Symbol>], index: u64) -> Result<Option<Symbol>> {
    let position = usize::try_from(index)
        .ok()
        .filter(|&p| p < symbols.len())
        .ok_or_else(|| CodecError::Corrupt(format!("symbol index {index} out of range")))?;
    Ok(symbols[position])
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn store_with_words(texts: &[&str]) -> (BrainStore, BrainId) {
        let store = BrainStore::open_in_memory().unwrap();
        let brain = store.brain("b").unwrap();
        let (root, _) = store.roots(brain).unwrap();
        for text in texts {
            let sym = store.intern(text).unwrap();
            let _ = store.create_child(brain, root, Some(sym)).unwrap();
        }
        (store, brain)
    }

    #[test]
    fn build_reserves_the_first_two_indices() {
        let (store, brain) = store_with_words(&["CAT", "ANT"]);
        let (texts, index) = build_dictionary(&store, brain).unwrap();
        assert_eq!(texts, vec!["<ERROR>", "<FIN>", "ANT", "CAT"]);
        let ant = store.lookup("ANT").unwrap().unwrap();
        let cat = store.lookup("CAT").unwrap().unwrap();
        assert_eq!(index[&ant], 2);
        assert_eq!(index[&cat], 3);
    }

    #[test]
    fn resolve_round_trips_reserved_and_real_words() {
        let store = BrainStore::open_in_memory().unwrap();
        let texts = vec![
            "<ERROR>".to_owned(),
            "<FIN>".to_owned(),
            "CAT".to_owned(),
        ];
        let symbols = resolve_dictionary(&store, &texts).unwrap();
        assert_eq!(symbols[0], None);
        assert_eq!(symbols[1], None);
        assert_eq!(symbols[2], store.lookup("CAT").unwrap());
    }

    #[test]
    fn resolve_rejects_wrong_reserved_text() {
        let store = BrainStore::open_in_memory().unwrap();
        let texts = vec!["<OOPS>".to_owned(), "<FIN>".to_owned()];
        assert_matches!(
            resolve_dictionary(&store, &texts),
            Err(CodecError::Corrupt(_))
        );
        let texts = vec!["<ERROR>".to_owned(), "<END>".to_owned()];
        assert_matches!(
            resolve_dictionary(&store, &texts),
            Err(CodecError::Corrupt(_))
        );
    }

    #[test]
    fn resolve_rejects_short_dictionaries() {
        let store = BrainStore::open_in_memory().unwrap();
        assert_matches!(
            resolve_dictionary(&store, &["<ERROR>".to_owned()]),
            Err(CodecError::Corrupt(_))
        );
    }

    #[test]
    fn resolve_symbol_bounds_checks() {
        let symbols = vec![None, None, Some(Symbol::new(7))];
        assert_eq!(resolve_symbol(&symbols, 0).unwrap(), None);
        assert_eq!(resolve_symbol(&symbols, 1).unwrap(), None);
        assert_eq!(resolve_symbol(&symbols, 2).unwrap(), Some(Symbol::new(7)));
        assert_matches!(resolve_symbol(&symbols, 3), Err(CodecError::Corrupt(_)));
    }
}
