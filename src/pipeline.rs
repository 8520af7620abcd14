// src/pipeline.rs
//! Run orchestration: fetch → merge/dedup → recency filter → persist, then
//! project → score → select → persist. Each run owns its candidate set; the
//! stages after fetch are synchronous single passes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tracing::info;

use crate::artifact::{self, CandidateArtifact, ShortlistArtifact};
use crate::candidate::Candidate;
use crate::config::PipelineConfig;
use crate::ingest::{self, providers::JsonFileSource, providers::ScriptSource, types::SourceAdapter};
use crate::merge;
use crate::project;
use crate::recency;
use crate::score::{ScoringEngine, ScoringTables};
use crate::select;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "prerank_candidates_total",
            "Candidates kept after dedup + recency filter."
        );
        describe_counter!("prerank_url_dups_total", "Items dropped by exact URL dedup.");
        describe_counter!(
            "prerank_fuzzy_merged_total",
            "Items merged away by fuzzy cross-source dedup."
        );
        describe_counter!("prerank_stale_total", "Candidates dropped as stale.");
        describe_counter!("prerank_selected_total", "Shortlisted candidates.");
        describe_gauge!("prerank_last_run_ts", "Unix ts of the last pipeline run.");
    });
}

/// Artifact layout for one run date: `<out_dir>/<date>/…`.
#[derive(Debug, Clone)]
pub struct RunPaths {
    root: PathBuf,
}

impl RunPaths {
    pub fn new(out_dir: &Path, date: NaiveDate) -> Self {
        Self {
            root: out_dir.join(date.to_string()),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn candidates(&self) -> PathBuf {
        self.root.join("candidates.json")
    }

    pub fn slim(&self) -> PathBuf {
        self.root.join("candidates-slim.json")
    }

    pub fn shortlist(&self) -> PathBuf {
        self.root.join("shortlist.json")
    }
}

#[derive(Debug)]
pub struct FetchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub candidates: usize,
    pub cross_platform: usize,
    pub url_dropped: usize,
    pub fuzzy_merged: usize,
    pub stale_dropped: usize,
}

#[derive(Debug)]
pub struct PrerankSummary {
    pub input: usize,
    pub selected: usize,
    pub guaranteed: usize,
    pub filled: usize,
}

/// Build one adapter per enabled source, in config (alphabetical) order.
/// Returns the adapters plus the number of disabled sources skipped.
pub fn build_adapters(
    cfg: &PipelineConfig,
    paths: &RunPaths,
) -> (Vec<Box<dyn SourceAdapter>>, usize) {
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();
    let mut skipped = 0usize;

    for (name, source) in &cfg.sources {
        if !source.enabled {
            info!(source = %name, "skipping disabled source");
            skipped += 1;
            continue;
        }
        let batch_file = source
            .file
            .clone()
            .unwrap_or_else(|| paths.data_dir().join(format!("{name}.json")));
        match &source.command {
            Some(command) => adapters.push(Box::new(ScriptSource::new(
                name.clone(),
                command.clone(),
                source.args.clone(),
                batch_file,
            ))),
            None => adapters.push(Box::new(JsonFileSource::new(name.clone(), batch_file))),
        }
    }

    (adapters, skipped)
}

/// Ingest stage: fetch all enabled sources concurrently, merge and dedup,
/// drop stale candidates, and persist the full candidate set atomically.
pub async fn run_fetch(
    cfg: &PipelineConfig,
    date: NaiveDate,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<FetchSummary> {
    ensure_metrics_described();
    let paths = RunPaths::new(out_dir, date);
    std::fs::create_dir_all(paths.data_dir())?;

    let (adapters, skipped) = build_adapters(cfg, &paths);
    let adapter_count = adapters.len();
    let timeout = Duration::from_secs(cfg.settings.fetch_timeout_secs);
    let outcome = ingest::fetch_all(adapters, timeout).await;

    let succeeded = outcome.batches.len();
    let failed = adapter_count - succeeded;

    // Batches arrive in source-processing order; items keep their batch order,
    // which fixes the exact-dedup "first occurrence wins" semantics.
    let mut raw: Vec<Candidate> = Vec::new();
    for batch in outcome.batches {
        let source = batch.source.clone();
        let source_type = batch.source_type.clone().unwrap_or_else(|| "script".into());
        let fetched_at = batch.fetched_at.unwrap_or(now);
        for item in batch.items {
            raw.push(Candidate::from_raw(item, &source, &source_type, fetched_at));
        }
    }

    let merged = merge::merge_and_dedup(raw, &cfg.settings.dedup);
    let (kept, stale_dropped) =
        recency::drop_stale(merged.candidates, now, cfg.settings.max_age_hours);
    let cross_platform = kept.iter().filter(|c| c.cross_platform_count > 1).count();

    let artifact = CandidateArtifact {
        date,
        generated_at: now,
        source_failures: outcome.failures,
        candidates: kept,
    };
    artifact::write_json_atomic(&paths.candidates(), &artifact)?;

    counter!("prerank_candidates_total").increment(artifact.candidates.len() as u64);
    counter!("prerank_url_dups_total").increment(merged.url_dropped as u64);
    counter!("prerank_fuzzy_merged_total").increment(merged.fuzzy_merged as u64);
    counter!("prerank_stale_total").increment(stale_dropped as u64);
    gauge!("prerank_last_run_ts").set(now.timestamp() as f64);

    let summary = FetchSummary {
        succeeded,
        failed,
        skipped,
        candidates: artifact.candidates.len(),
        cross_platform,
        url_dropped: merged.url_dropped,
        fuzzy_merged: merged.fuzzy_merged,
        stale_dropped,
    };
    info!(
        target: "pipeline",
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        candidates = summary.candidates,
        cross_platform = summary.cross_platform,
        url_dropped = summary.url_dropped,
        fuzzy_merged = summary.fuzzy_merged,
        stale_dropped = summary.stale_dropped,
        "fetch stage complete"
    );
    Ok(summary)
}

/// Pre-rank stage: read the persisted candidate set, write the slim
/// projection, score, select, and persist the shortlist. A missing or
/// malformed candidate artifact is fatal here.
pub fn run_prerank(
    cfg: &PipelineConfig,
    date: NaiveDate,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<PrerankSummary> {
    ensure_metrics_described();
    let paths = RunPaths::new(out_dir, date);

    let input: CandidateArtifact = artifact::read_json(&paths.candidates())?;
    let pool = input.candidates.len();

    artifact::write_json_atomic(&paths.slim(), &project::slim(&input.candidates))?;

    let engine = ScoringEngine::new(ScoringTables::from_config(cfg));
    let scored = engine.score_all(input.candidates, now);
    let selection = select::select(&scored, &cfg.selection_settings());

    let artifact_out = ShortlistArtifact {
        date,
        generated_at: now,
        source_failures: input.source_failures,
        guaranteed: selection.guaranteed,
        filled: selection.filled,
        items: selection.items,
    };
    artifact::write_json_atomic(&paths.shortlist(), &artifact_out)?;

    counter!("prerank_selected_total").increment(artifact_out.items.len() as u64);

    for item in artifact_out.items.iter().take(5) {
        let b = &item.prerank_breakdown;
        info!(
            target: "pipeline",
            score = item.prerank_score,
            source = %item.candidate.source,
            id = %item.candidate.id,
            timeliness = b.timeliness,
            heat = b.source_heat,
            keywords = b.keywords,
            credibility = b.credibility,
            "top candidate"
        );
    }

    let summary = PrerankSummary {
        input: pool,
        selected: artifact_out.items.len(),
        guaranteed: selection.guaranteed,
        filled: selection.filled,
    };
    info!(
        target: "pipeline",
        input = summary.input,
        selected = summary.selected,
        guaranteed = summary.guaranteed,
        filled = summary.filled,
        "prerank stage complete"
    );
    Ok(summary)
}

/// Full pipeline for one run date.
pub async fn run_all(
    cfg: &PipelineConfig,
    date: NaiveDate,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<PrerankSummary> {
    run_fetch(cfg, date, out_dir, now).await?;
    run_prerank(cfg, date, out_dir, now)
}
