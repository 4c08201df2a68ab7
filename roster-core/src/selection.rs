//! Reviewer selection
//!
//! Selection is a pure function over data the caller already fetched: the
//! active members of the author's team and the set of users that must not be
//! picked. Which eligible member wins is delegated to a [`SelectionStrategy`].

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::model::Candidate;

/// Picks one reviewer out of a non-empty eligible set
pub trait SelectionStrategy: Debug + Send + Sync {
    /// Choose a candidate; `eligible` is never empty
    fn choose<'a>(&self, eligible: &'a [Candidate]) -> Option<&'a Candidate>;
}

/// Uniformly random choice over eligible candidates
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelection;

impl SelectionStrategy for RandomSelection {
    fn choose<'a>(&self, eligible: &'a [Candidate]) -> Option<&'a Candidate> {
        eligible.choose(&mut rand::thread_rng())
    }
}

/// Deterministic choice of the candidate with the fewest open reviews
///
/// Ties go to the lexicographically smallest user id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastLoadedSelection;

impl SelectionStrategy for LeastLoadedSelection {
    fn choose<'a>(&self, eligible: &'a [Candidate]) -> Option<&'a Candidate> {
        eligible.iter().min_by(|a, b| {
            a.open_reviews
                .cmp(&b.open_reviews)
                .then_with(|| a.user_id.cmp(&b.user_id))
        })
    }
}

/// Configurable strategy names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Random,
    LeastLoaded,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Random => "random",
            StrategyKind::LeastLoaded => "least_loaded",
        }
    }

    /// Parse a strategy name as used in config files and environment variables
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "random" => Some(StrategyKind::Random),
            "least_loaded" | "least-loaded" => Some(StrategyKind::LeastLoaded),
            _ => None,
        }
    }

    /// Instantiate the strategy
    pub fn build(&self) -> Arc<dyn SelectionStrategy> {
        match self {
            StrategyKind::Random => Arc::new(RandomSelection),
            StrategyKind::LeastLoaded => Arc::new(LeastLoadedSelection),
        }
    }
}

/// Select one reviewer from `active` that is not in `excluded`
///
/// Returns `None` when no eligible candidate remains.
pub fn select_candidate(
    active: &[Candidate],
    excluded: &HashSet<&str>,
    strategy: &dyn SelectionStrategy,
) -> Option<String> {
    let eligible: Vec<Candidate> = active
        .iter()
        .filter(|c| !excluded.contains(c.user_id.as_str()))
        .cloned()
        .collect();

    if eligible.is_empty() {
        return None;
    }

    strategy.choose(&eligible).map(|c| c.user_id.clone())
}
