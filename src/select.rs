// src/select.rs
//! Two-phase shortlist selection.
//!
//! Phase 1 builds the guaranteed set — per-source top-N by heat sub-score and
//! per-category top-M by total — so no single dominant source or category can
//! crowd out the rest. Phase 2 fills the remaining slots from the leftover
//! pool by descending total score above a fixed floor. Guaranteed members are
//! never dropped; all orderings tie-break on id for reproducible output.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::candidate::ScoredCandidate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SelectionSettings {
    pub shortlist_cap: usize,
    pub score_floor: u8,
    pub per_source_keep: usize,
    pub per_category_keep: usize,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            shortlist_cap: 40,
            score_floor: 50,
            per_source_keep: 3,
            per_category_keep: 2,
        }
    }
}

#[derive(Debug)]
pub struct Selection {
    pub items: Vec<ScoredCandidate>,
    pub guaranteed: usize,
    pub filled: usize,
}

fn by_total_then_id(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.prerank_score
        .cmp(&a.prerank_score)
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

/// Ids of the guaranteed set: per-source top-N ranked by heat sub-score (ties
/// by total, then id) unioned with per-category top-M ranked by total.
pub fn guaranteed_ids(scored: &[ScoredCandidate], settings: &SelectionSettings) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();

    let mut by_source: BTreeMap<&str, Vec<&ScoredCandidate>> = BTreeMap::new();
    for c in scored {
        by_source.entry(c.candidate.source.as_str()).or_default().push(c);
    }
    for (_source, mut members) in by_source {
        members.sort_by(|a, b| {
            b.prerank_breakdown
                .source_heat
                .cmp(&a.prerank_breakdown.source_heat)
                .then(b.prerank_score.cmp(&a.prerank_score))
                .then_with(|| a.candidate.id.cmp(&b.candidate.id))
        });
        for c in members.into_iter().take(settings.per_source_keep) {
            ids.insert(c.candidate.id.clone());
        }
    }

    let mut by_category: BTreeMap<&str, Vec<&ScoredCandidate>> = BTreeMap::new();
    for c in scored {
        by_category
            .entry(c.candidate.category_or_unknown())
            .or_default()
            .push(c);
    }
    for (_category, mut members) in by_category {
        members.sort_by(|a, b| by_total_then_id(a, b));
        for c in members.into_iter().take(settings.per_category_keep) {
            ids.insert(c.candidate.id.clone());
        }
    }

    ids
}

/// Run both phases over an immutable slice and return the bounded shortlist,
/// sorted by descending total score.
pub fn select(scored: &[ScoredCandidate], settings: &SelectionSettings) -> Selection {
    let ids = guaranteed_ids(scored, settings);

    let mut guaranteed: Vec<ScoredCandidate> = scored
        .iter()
        .filter(|c| ids.contains(&c.candidate.id))
        .cloned()
        .collect();
    guaranteed.sort_by(by_total_then_id);
    let guaranteed_count = guaranteed.len();

    let remaining = settings.shortlist_cap.saturating_sub(guaranteed_count);
    let mut fill: Vec<ScoredCandidate> = scored
        .iter()
        .filter(|c| !ids.contains(&c.candidate.id) && c.prerank_score >= settings.score_floor)
        .cloned()
        .collect();
    fill.sort_by(by_total_then_id);
    fill.truncate(remaining);
    let filled = fill.len();

    let mut items = guaranteed;
    items.append(&mut fill);
    items.sort_by(by_total_then_id);

    Selection {
        items,
        guaranteed: guaranteed_count,
        filled,
    }
}
