//! Candidate scoring strategy.
//!
//! The candidate loop ranks generated replies by "surprise" — how novel a
//! candidate is relative to the keyword context. The scoring formula is a
//! strategy object; [`ConstantSurprise`] is the default placeholder, which
//! keeps the loop's selection behavior (first distinct candidate wins under
//! strictly-greater comparison) without pretending to a statistical model.

use babbler_core::{BrainId, Dict, List};
use babbler_store::{BrainStore, Result};

/// Scores a candidate reply; higher means more novel or informative.
pub trait Surprise {
    /// Score `candidate` against the keyword context.
    fn score(
        &self,
        store: &BrainStore,
        brain: BrainId,
        keywords: &Dict,
        candidate: &List,
    ) -> Result<f64>;
}

/// Scoring stub that returns the same value for every candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantSurprise {
    value: f64,
}

impl ConstantSurprise {
    /// Create a constant scorer with the given value.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Surprise for ConstantSurprise {
    fn score(
        &self,
        _store: &BrainStore,
        _brain: BrainId,
        _keywords: &Dict,
        _candidate: &List,
    ) -> Result<f64> {
        Ok(self.value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use babbler_core::Symbol;

    #[test]
    fn constant_surprise_scores_every_candidate_the_same() {
        let store = BrainStore::open_in_memory().unwrap();
        let brain = store.brain("b").unwrap();
        let scorer = ConstantSurprise::new(1.5);

        let keywords = Dict::new();
        let a: List = [Symbol::new(1)].into_iter().collect();
        let b: List = [Symbol::new(2), Symbol::new(3)].into_iter().collect();
        assert_eq!(scorer.score(&store, brain, &keywords, &a).unwrap(), 1.5);
        assert_eq!(scorer.score(&store, brain, &keywords, &b).unwrap(), 1.5);
    }

    #[test]
    fn default_scorer_returns_zero() {
        let store = BrainStore::open_in_memory().unwrap();
        let brain = store.brain("b").unwrap();
        let scorer = ConstantSurprise::default();
        let keywords = Dict::new();
        let candidate = List::new();
        assert_eq!(
            scorer.score(&store, brain, &keywords, &candidate).unwrap(),
            0.0
        );
    }
}
