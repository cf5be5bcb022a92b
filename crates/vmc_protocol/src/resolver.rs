//! Joint name resolution.
//!
//! Senders re-transmit the same joint names every frame, so the outcome of a
//! name lookup, including a failed one, is memoized the first time a name is
//! seen. After warm-up a resolution is a single hash lookup by `&str`.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::debug;

use crate::{HumanBone, LOG_RESOLVER};

/// Marker for a joint name outside the canonical vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("joint name is not part of the humanoid vocabulary")]
pub struct Unresolvable;

/// Counters describing the memo table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolverStats {
    /// Distinct names seen so far.
    pub names: usize,
    /// Of those, names that did not resolve.
    pub unresolved: usize,
    /// Vocabulary lookups performed (one per distinct name).
    pub lookups: u64,
}

/// Memoizing map from sender joint names to [`HumanBone`].
///
/// Once a name is entered its outcome never changes.
#[derive(Debug, Default)]
pub struct JointResolver {
    memo: HashMap<String, Result<HumanBone, Unresolvable>>,
    lookups: u64,
}

impl JointResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name`, consulting the vocabulary only on first sight.
    pub fn resolve(&mut self, name: &str) -> Option<HumanBone> {
        if let Some(outcome) = self.memo.get(name) {
            return outcome.ok();
        }

        self.lookups += 1;
        let outcome = HumanBone::from_str(name).map_err(|_| Unresolvable);
        if outcome.is_err() {
            debug!(
                target: LOG_RESOLVER,
                "joint name {name:?} is not a humanoid bone, ignoring it from now on"
            );
        }
        self.memo.insert(name.to_owned(), outcome);
        outcome.ok()
    }

    /// Memoized outcome for `name` without touching the table.
    ///
    /// `None` means the name has never been seen.
    pub fn outcome(&self, name: &str) -> Option<Result<HumanBone, Unresolvable>> {
        self.memo.get(name).copied()
    }

    /// Names memoized as unresolvable, in no particular order.
    pub fn unresolved_names(&self) -> impl Iterator<Item = &str> {
        self.memo
            .iter()
            .filter(|(_, outcome)| outcome.is_err())
            .map(|(name, _)| name.as_str())
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            names: self.memo.len(),
            unresolved: self.unresolved_names().count(),
            lookups: self.lookups,
        }
    }
}
