//! Text-level orchestration: parse input, learn it, reply to it, render
//! the reply back to a sentence. This is the layer the CLI talks to.

use babbler_core::{BrainId, List, capitalise, tokenize};
use babbler_store::{BrainStore, Result};

use crate::generator::{ReplyOptions, reply};
use crate::surprise::Surprise;

/// Tokenize `text` and intern every token.
pub fn parse(store: &BrainStore, text: &str) -> Result<List> {
    let mut words = List::new();
    for token in tokenize(text) {
        words.append(store.intern(&token)?);
    }
    Ok(words)
}

/// Render a symbol sequence back into a sentence-cased string.
pub fn render(store: &BrainStore, words: &List) -> Result<String> {
    let mut out = String::new();
    for word in words.iter() {
        out.push_str(&store.word_text(word)?);
    }
    Ok(capitalise(&out))
}

/// Learn `text` into the brain.
pub fn learn_text(store: &BrainStore, brain: BrainId, text: &str) -> Result<()> {
    let words = parse(store, text)?;
    babbler_model::learn(store, brain, &words)
}

/// Reply to `text`. `None` means the brain had nothing to say — the caller
/// maps that to its canned response.
pub fn reply_text(
    store: &BrainStore,
    brain: BrainId,
    text: &str,
    surprise: &dyn Surprise,
    options: &ReplyOptions,
) -> Result<Option<String>> {
    let words = parse(store, text)?;
    let response = reply(store, brain, &words, surprise, options)?;
    if response.is_empty() {
        Ok(None)
    } else {
        Ok(Some(render(store, &response)?))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
