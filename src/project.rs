// src/project.rs
//! Projection step: trims full candidates down to the fields the downstream
//! ranking stage actually reads, with a short summary cap.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

const SLIM_SUMMARY_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlimCandidate {
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    pub source_type: String,
    pub summary: String,
    #[serde(
        default,
        with = "crate::candidate::lenient_rfc3339",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<DateTime<Utc>>,
    pub raw_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub comments: u32,
    pub cross_platform_count: usize,
    pub related_sources: BTreeSet<String>,
}

pub fn slim(candidates: &[Candidate]) -> Vec<SlimCandidate> {
    candidates
        .iter()
        .map(|c| SlimCandidate {
            id: c.id.clone(),
            title: c.title.clone(),
            url: c.url.clone(),
            source: c.source.clone(),
            source_type: c.source_type.clone(),
            summary: c.summary.chars().take(SLIM_SUMMARY_CHARS).collect(),
            published_at: c.published_at,
            raw_score: c.raw_score,
            category: c.category.clone(),
            comments: c.comments,
            cross_platform_count: c.cross_platform_count,
            related_sources: c.related_sources.clone(),
        })
        .collect()
}
