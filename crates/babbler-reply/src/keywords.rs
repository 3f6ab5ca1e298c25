//! Keyword extraction.
//!
//! Input symbols are swapped through the brain's substitution map, then
//! filtered: banned words and words the brain has never seen are dropped,
//! auxiliary words are held back for a fallback pass, and only words that
//! start with an alphanumeric character qualify at all. If the first pass
//! yields nothing, a second pass admits auxiliary words present in the
//! model so the reply can still be steered.

use babbler_core::{BrainId, Dict, List, Symbol};
use babbler_store::{BrainStore, ListCategory, MapCategory, Result};
use tracing::trace;

/// Extract the keyword set for one input sentence.
pub fn extract_keywords(store: &BrainStore, brain: BrainId, input: &List) -> Result<Dict> {
    let mut keywords = Dict::new();

    for word in input.iter() {
        let word = swap(store, brain, word)?;
        if store.list_contains(brain, ListCategory::Ban, word)? {
            continue;
        }
        if store.list_contains(brain, ListCategory::Aux, word)? {
            continue;
        }
        if !store.contains_word(brain, word)? {
            continue;
        }
        add_keyword(store, &mut keywords, word)?;
    }

    if keywords.is_empty() {
        // Fallback pass: nothing qualified, so admit auxiliary words the
        // model does know.
        for word in input.iter() {
            let word = swap(store, brain, word)?;
            if !store.list_contains(brain, ListCategory::Aux, word)? {
                continue;
            }
            if !store.contains_word(brain, word)? {
                continue;
            }
            add_keyword(store, &mut keywords, word)?;
        }
    }

    trace!(keywords = keywords.len(), "keywords extracted");
    Ok(keywords)
}

/// Apply the brain's swap map, or keep the word unchanged.
fn swap(store: &BrainStore, brain: BrainId, word: Symbol) -> Result<Symbol> {
    Ok(store
        .map_get(brain, MapCategory::Swap, word)?
        .unwrap_or(word))
}

/// Admit `word` if its text starts with an alphanumeric character.
/// Separator and punctuation tokens never become keywords.
fn add_keyword(store: &BrainStore, keywords: &mut Dict, word: Symbol) -> Result<()> {
    let text = store.word_text(word)?;
    if text.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        let _ = keywords.add(word);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
