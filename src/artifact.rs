// src/artifact.rs
//! Run artifacts: the persisted candidate set and the scored shortlist, plus
//! atomic JSON IO. Writes go to a sibling temp file and are renamed into
//! place so a concurrent reader never observes partial JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, ScoredCandidate, SourceFailure};

/// Full deduplicated, recency-filtered candidate set for one run.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateArtifact {
    pub date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub source_failures: Vec<SourceFailure>,
    pub candidates: Vec<Candidate>,
}

/// Ordered shortlist with full scoring breakdowns and run diagnostics.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortlistArtifact {
    pub date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub source_failures: Vec<SourceFailure>,
    pub guaranteed: usize,
    pub filled: usize,
    pub items: Vec<ScoredCandidate>,
}

/// Serialize `value` to `path` atomically (temp file + rename, same dir).
/// Parent directories are created as needed.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("serializing artifact")?;

    let tmp: PathBuf = {
        let mut os = path.as_os_str().to_owned();
        os.push(".tmp");
        PathBuf::from(os)
    };
    fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} into place", tmp.display()))?;
    Ok(())
}

/// Read and parse a JSON artifact. Missing or malformed input is an error the
/// caller treats as fatal for its stage.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading artifact {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing artifact {}", path.display()))
}
