//! Pipeline-internal candidate records.
//!
//! A `Candidate` is one deduplicated story assembled from one or more source
//! batches; a `ScoredCandidate` adds the pre-rank total and its breakdown.
//! Artifacts serialize camelCase to stay wire-compatible with the harvesters.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::types::RawItem;

/// One failed or partially-failed source, surfaced in the run artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_quotes: Vec<String>,
    #[serde(
        default,
        with = "lenient_rfc3339",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
    #[serde(default)]
    pub raw_score: f64,
    #[serde(default)]
    pub comments: u32,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Number of distinct sources that reported this story.
    pub cross_platform_count: usize,
    /// Always contains the record's own source; len == cross_platform_count.
    pub related_sources: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_titles: Vec<String>,
}

impl Candidate {
    /// Build a candidate from one raw item of a source batch. Missing optional
    /// fields fall back to documented defaults; a missing id is derived from
    /// source + url so re-runs stay deterministic.
    pub fn from_raw(
        item: RawItem,
        source: &str,
        source_type: &str,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let id = if item.id.trim().is_empty() {
            fallback_id(source, &item.url)
        } else {
            item.id
        };
        let mut related_sources = BTreeSet::new();
        related_sources.insert(source.to_string());

        Self {
            id,
            title: crate::normalize::clean_text(&item.title),
            url: item.url.trim().to_string(),
            source: source.to_string(),
            source_type: source_type.to_string(),
            category: item.category,
            summary: crate::normalize::clean_text(&item.summary.unwrap_or_default()),
            key_quotes: Vec::new(),
            published_at: item.published_at,
            fetched_at,
            raw_score: item.score.unwrap_or(0.0),
            comments: item.comments.unwrap_or(0),
            metadata: item.extra,
            cross_platform_count: 1,
            related_sources,
            merged_titles: Vec::new(),
        }
    }

    /// Category used for grouping; records without one share the same bucket.
    pub fn category_or_unknown(&self) -> &str {
        self.category.as_deref().unwrap_or("unknown")
    }
}

/// Per-candidate sub-scores, each in 0..=25.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub timeliness: u8,
    pub source_heat: u8,
    pub keywords: u8,
    pub credibility: u8,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        self.timeliness + self.source_heat + self.keywords + self.credibility
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub prerank_score: u8,
    pub prerank_breakdown: ScoreBreakdown,
}

/// Deterministic id for items that arrive without one: `<source>-<hex6>`,
/// digest over source + url.
pub fn fallback_id(source: &str, url: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"/");
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(source.len() + 13);
    out.push_str(source);
    out.push('-');
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Lenient RFC3339 (de)serialization: harvested timestamps that fail to parse
/// become `None` instead of failing the whole artifact.
pub(crate) mod lenient_rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_lenient))
    }

    pub(crate) fn parse_lenient(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
