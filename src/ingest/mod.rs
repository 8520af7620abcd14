// src/ingest/mod.rs
pub mod providers;
pub mod types;

use std::time::Duration;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tokio::task::JoinSet;
use tracing::warn;

use crate::candidate::SourceFailure;
use crate::ingest::types::{SourceAdapter, SourceBatch};

/// One-time metrics registration for the ingest stage.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("prerank_items_total", "Raw items received from adapters.");
        describe_counter!(
            "prerank_source_errors_total",
            "Adapter fetch failures and timeouts."
        );
    });
}

/// Batches in adapter order plus the per-run failure diagnostics.
#[derive(Debug)]
pub struct FetchOutcome {
    pub batches: Vec<SourceBatch>,
    pub failures: Vec<SourceFailure>,
}

/// Fetch every adapter concurrently, each bounded by `fetch_timeout`. A failed
/// or timed-out adapter contributes zero items and one failure record; batch
/// order follows adapter order so downstream dedup stays deterministic.
pub async fn fetch_all(
    adapters: Vec<Box<dyn SourceAdapter>>,
    fetch_timeout: Duration,
) -> FetchOutcome {
    ensure_metrics_described();

    let count = adapters.len();
    let mut set = JoinSet::new();
    for (idx, adapter) in adapters.into_iter().enumerate() {
        set.spawn(async move {
            let name = adapter.name().to_string();
            let source_type = adapter.source_type().to_string();
            let result = tokio::time::timeout(fetch_timeout, adapter.fetch()).await;
            (idx, name, source_type, result)
        });
    }

    let mut slots: Vec<Option<SourceBatch>> = (0..count).map(|_| None).collect();
    let mut failures = Vec::new();

    while let Some(joined) = set.join_next().await {
        let (idx, name, source_type, result) = match joined {
            Ok(v) => v,
            Err(e) => {
                warn!(error = ?e, "adapter task failed to join");
                continue;
            }
        };
        match result {
            Ok(Ok(mut batch)) => {
                if batch.source.is_empty() {
                    batch.source = name.clone();
                }
                if batch.source_type.is_none() {
                    batch.source_type = Some(source_type);
                }
                counter!("prerank_items_total").increment(batch.items.len() as u64);
                for err in &batch.errors {
                    failures.push(SourceFailure {
                        source: name.clone(),
                        error: err.clone(),
                    });
                }
                slots[idx] = Some(batch);
            }
            Ok(Err(e)) => {
                warn!(source = %name, error = ?e, "adapter error");
                counter!("prerank_source_errors_total").increment(1);
                failures.push(SourceFailure {
                    source: name,
                    error: format!("{e:#}"),
                });
            }
            Err(_elapsed) => {
                warn!(source = %name, timeout_secs = fetch_timeout.as_secs(), "adapter timed out");
                counter!("prerank_source_errors_total").increment(1);
                failures.push(SourceFailure {
                    source: name,
                    error: format!("timed out after {}s", fetch_timeout.as_secs()),
                });
            }
        }
    }

    // Tasks complete in arbitrary order; sort diagnostics so artifacts stay
    // reproducible across runs.
    failures.sort_by(|a, b| a.source.cmp(&b.source).then_with(|| a.error.cmp(&b.error)));

    FetchOutcome {
        batches: slots.into_iter().flatten().collect(),
        failures,
    }
}
