// src/score/mod.rs
//! Pre-rank scoring engine: four independent 0..=25 sub-scores summing to a
//! 0..=100 total. Pure — all lookup tables are immutable configuration and
//! `now` is passed in explicitly, so the engine is trivially testable.

pub mod credibility;
pub mod heat;
pub mod keywords;

use chrono::{DateTime, Utc};

use crate::candidate::{Candidate, ScoreBreakdown, ScoredCandidate};
use crate::config::PipelineConfig;
pub use credibility::CredibilityTable;
pub use heat::{HeatStrategy, HeatTable};
pub use keywords::KeywordTables;

/// Timeliness as a step function of age; unknown age scores low but not zero.
pub fn timeliness_score(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u8 {
    let Some(ts) = published_at else { return 5 };
    let hours = (now - ts).num_seconds() as f64 / 3600.0;
    if hours <= 6.0 {
        25
    } else if hours <= 12.0 {
        20
    } else if hours <= 24.0 {
        15
    } else if hours <= 36.0 {
        10
    } else if hours <= 48.0 {
        5
    } else {
        0
    }
}

/// Immutable scoring tables, assembled from configuration.
#[derive(Debug, Clone)]
pub struct ScoringTables {
    pub keywords: KeywordTables,
    pub credibility: CredibilityTable,
    pub heat: HeatTable,
}

impl ScoringTables {
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self {
            keywords: KeywordTables::new(
                &cfg.priorities.high,
                &cfg.priorities.medium,
                &cfg.priorities.low,
                &cfg.keywords.actionability,
                &cfg.keywords.domain_terms,
            ),
            credibility: cfg.credibility.clone(),
            heat: HeatTable::with_overrides(&cfg.heat),
        }
    }
}

pub struct ScoringEngine {
    tables: ScoringTables,
}

impl ScoringEngine {
    pub fn new(tables: ScoringTables) -> Self {
        Self { tables }
    }

    pub fn score(&self, candidate: &Candidate, now: DateTime<Utc>) -> ScoreBreakdown {
        let timeliness = timeliness_score(candidate.published_at, now);
        let source_heat = self.tables.heat.for_source(&candidate.source).heat(
            candidate.raw_score,
            candidate.comments,
            &candidate.metadata,
        );
        let keywords = self
            .tables
            .keywords
            .score(&candidate.title, &candidate.summary);
        let credibility = self.tables.credibility.weight_for(&candidate.source);

        ScoreBreakdown {
            timeliness,
            source_heat,
            keywords,
            credibility,
        }
    }

    /// Score every candidate, retaining the breakdown for auditability and
    /// deterministic tie-breaking downstream.
    pub fn score_all(
        &self,
        candidates: Vec<Candidate>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        candidates
            .into_iter()
            .map(|candidate| {
                let breakdown = self.score(&candidate, now);
                ScoredCandidate {
                    prerank_score: breakdown.total(),
                    prerank_breakdown: breakdown,
                    candidate,
                }
            })
            .collect()
    }
}
