//! Reply generation.
//!
//! One candidate is grown from a seed symbol by babbling forward from the
//! deepest populated context, then babbling backward to reach a sentence
//! start. The caller-facing [`reply`] repeats this under a monotonic
//! deadline, scoring candidates with a pluggable [`Surprise`] strategy and
//! keeping the best one that differs from the input.
//!
//! Generation walks are strictly read-only: every context advance here
//! passes `persist = false`.

use std::time::{Duration, Instant};

use babbler_core::{BrainId, Dict, List, Symbol};
use babbler_model::{Context, Direction};
use babbler_store::{BrainStore, ListCategory, Result};
use rand::Rng;
use tracing::{debug, trace};

use crate::keywords::extract_keywords;
use crate::surprise::Surprise;

/// Tunables for the candidate loop.
#[derive(Clone, Copy, Debug)]
pub struct ReplyOptions {
    /// Wall-clock budget for candidate generation. The check is
    /// cooperative: one in-flight candidate may overrun it.
    pub timeout: Duration,
}

impl Default for ReplyOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
        }
    }
}

/// Pick the symbol a candidate starts from.
///
/// Baseline is a uniformly random child of the forward root — any word
/// ever seen sentence-initial, or the terminator, which ends generation
/// immediately. When keywords exist, a scan from a random offset picks the
/// first non-auxiliary keyword instead.
fn seed(store: &BrainStore, brain: BrainId, ctx: &Context<'_>, keywords: &Dict) -> Result<Option<Symbol>> {
    let mut word = match ctx.root() {
        Some(root) => store.random_child(root)?.and_then(|child| child.word),
        None => None,
    };

    if !keywords.is_empty() {
        let len = keywords.len();
        let offset = rand::rng().random_range(0..len);
        for i in 0..len {
            let Some(candidate) = keywords.get((i + offset) % len) else {
                continue;
            };
            if store.list_contains(brain, ListCategory::Aux, candidate)? {
                continue;
            }
            word = Some(candidate);
            break;
        }
    }

    Ok(word)
}

/// Sample the next acceptable symbol from the deepest populated context.
///
/// Children are visited through a random-start cycle, each exactly once. A
/// candidate is accepted only if it is a keyword, is not auxiliary (unless
/// auxiliary words are unlocked), and does not already occur in the
/// sentence. The first acceptance unlocks auxiliary words for the rest of
/// this generation.
fn babble(
    store: &BrainStore,
    brain: BrainId,
    ctx: &Context<'_>,
    keywords: &Dict,
    sentence: &List,
    use_aux: &mut bool,
) -> Result<Option<Symbol>> {
    let Some(node) = ctx.deepest() else {
        return Ok(None);
    };

    for child in store.child_cycle(node)? {
        let Some(word) = child.word else {
            continue;
        };
        if !keywords.contains(word) {
            continue;
        }
        if !*use_aux && store.list_contains(brain, ListCategory::Aux, word)? {
            continue;
        }
        if sentence.contains(word) {
            continue;
        }
        *use_aux = true;
        return Ok(Some(word));
    }
    Ok(None)
}

/// Generate one candidate sentence biased toward `keywords`.
pub fn generate(store: &BrainStore, brain: BrainId, keywords: &Dict) -> Result<List> {
    let mut ctx = Context::new(store, brain)?;
    let order = ctx.order();
    let mut sentence = List::new();
    let mut use_aux = false;

    // Forward extension from the seed.
    ctx.init(Direction::Forward)?;
    let mut start = true;
    loop {
        let word = if start {
            start = false;
            seed(store, brain, &ctx, keywords)?
        } else {
            babble(store, brain, &ctx, keywords, &sentence, &mut use_aux)?
        };
        let Some(word) = word else { break };

        sentence.append(word);
        ctx.advance(Some(word), false)?;
    }

    // Backward continuation: replay the sentence head into the backward
    // context, then extend toward the sentence start.
    ctx.init(Direction::Backward)?;
    let replay = (order + 1).min(sentence.len());
    for i in 0..replay {
        if let Some(word) = sentence.get(i) {
            ctx.advance(Some(word), false)?;
        }
    }
    loop {
        let Some(word) = babble(store, brain, &ctx, keywords, &sentence, &mut use_aux)? else {
            break;
        };
        sentence.prepend(word);
        ctx.advance(Some(word), false)?;
    }

    trace!(len = sentence.len(), "candidate generated");
    Ok(sentence)
}

/// Produce the best reply to `input` within the configured deadline.
///
/// Candidates identical to the input are discarded; the highest-scoring
/// distinct candidate wins, with the first candidate (possibly empty) as
/// the fallback. An empty result is a valid outcome, never an error — the
/// caller maps it to a canned response.
pub fn reply(
    store: &BrainStore,
    brain: BrainId,
    input: &List,
    surprise: &dyn Surprise,
    options: &ReplyOptions,
) -> Result<List> {
    let keywords = extract_keywords(store, brain, input)?;
    let deadline = Instant::now() + options.timeout;

    let mut first: Option<List> = None;
    let mut best: Option<(List, f64)> = None;
    let mut candidates = 0u32;

    loop {
        let candidate = generate(store, brain, &keywords)?;
        candidates += 1;
        if first.is_none() {
            first = Some(candidate.clone());
        }
        if candidate != *input {
            let score = surprise.score(store, brain, &keywords, &candidate)?;
            if best.as_ref().map_or(true, |(_, high)| score > *high) {
                best = Some((candidate, score));
            }
        }
        if Instant::now() >= deadline {
            break;
        }
    }

    debug!(candidates, "candidate loop finished");
    Ok(best
        .map(|(candidate, _)| candidate)
        .or(first)
        .unwrap_or_default())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
