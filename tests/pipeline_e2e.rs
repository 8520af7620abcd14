// tests/pipeline_e2e.rs
// End-to-end run over pre-harvested batch files in a temp directory.

use std::collections::HashSet;
use std::fs;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use hotspot_prerank::artifact::{self, CandidateArtifact, ShortlistArtifact};
use hotspot_prerank::config::PipelineConfig;
use hotspot_prerank::pipeline;

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
}

/// Three batches: hackernews and rss share one story (near-duplicate titles),
/// rss repeats a hackernews URL, and github carries one stale item.
fn write_batches(dir: &std::path::Path) {
    let now = fixed_now();
    let fresh = (now - Duration::hours(2)).to_rfc3339();
    let stale = (now - Duration::hours(80)).to_rfc3339();

    let hackernews = serde_json::json!({
        "source": "hackernews",
        "fetchedAt": now.to_rfc3339(),
        "items": [
            {"id": "hn-1", "title": "OpenAI releases GPT-5", "url": "https://hn.example/1",
             "category": "news", "score": 420, "comments": 300, "publishedAt": fresh},
            {"id": "hn-2", "title": "Ask HN: favorite profilers?", "url": "https://hn.example/2",
             "category": "discussion", "score": 35, "comments": 40, "publishedAt": fresh},
        ]
    });
    let rss = serde_json::json!({
        "source": "rss",
        "fetchedAt": now.to_rfc3339(),
        "items": [
            {"id": "rss-1", "title": "OpenAI releases GPT-5 model today", "url": "https://rss.example/1",
             "category": "news", "score": 60, "publishedAt": fresh},
            // same URL as hn-1, must be dropped before anything else
            {"id": "rss-2", "title": "A different headline", "url": "https://hn.example/1",
             "category": "news", "score": 10, "publishedAt": fresh},
        ]
    });
    let github = serde_json::json!({
        "source": "github",
        "fetchedAt": now.to_rfc3339(),
        "items": [
            {"id": "gh-1", "title": "awesome-agents trending", "url": "https://gh.example/1",
             "category": "project", "score": 250, "publishedAt": fresh,
             "extra": {"aiRelated": true}},
            {"id": "gh-2", "title": "old repo resurfaces", "url": "https://gh.example/2",
             "category": "project", "score": 90, "publishedAt": stale},
        ]
    });

    for (name, batch) in [
        ("hackernews", &hackernews),
        ("rss", &rss),
        ("github", &github),
    ] {
        fs::write(
            dir.join(format!("{name}.json")),
            serde_json::to_string_pretty(batch).unwrap(),
        )
        .unwrap();
    }
}

fn config(dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig::from_toml_str(&format!(
        r#"
        [settings]
        max_age_hours = 48

        [priorities]
        high = ["gpt-5"]
        medium = ["agents"]
        low = ["profilers"]

        [sources.hackernews]
        file = "{0}/hackernews.json"

        [sources.rss]
        file = "{0}/rss.json"

        [sources.github]
        file = "{0}/github.json"

        [sources.broken]
        file = "{0}/broken.json"
        "#,
        dir.display()
    ))
    .unwrap()
}

#[tokio::test]
async fn fetch_then_prerank_produces_consistent_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let batches = tmp.path().join("batches");
    fs::create_dir_all(&batches).unwrap();
    write_batches(&batches);

    let cfg = config(&batches);
    let out_dir = tmp.path().join("runs");

    let fetch = pipeline::run_fetch(&cfg, date(), &out_dir, fixed_now())
        .await
        .unwrap();
    assert_eq!(fetch.succeeded, 3);
    assert_eq!(fetch.failed, 1); // the "broken" source has no batch file
    assert_eq!(fetch.url_dropped, 1); // rss-2 repeats hn-1's url
    assert_eq!(fetch.fuzzy_merged, 1); // hn-1 + rss-1 are one story
    assert_eq!(fetch.stale_dropped, 1); // gh-2 is 80h old

    let run_root = out_dir.join(date().to_string());
    let candidates: CandidateArtifact =
        artifact::read_json(&run_root.join("candidates.json")).unwrap();

    // hn-1 (merged), hn-2, gh-1
    assert_eq!(candidates.candidates.len(), 3);
    assert_eq!(candidates.source_failures.len(), 1);
    assert_eq!(candidates.source_failures[0].source, "broken");

    let mut urls = HashSet::new();
    for c in &candidates.candidates {
        assert!(urls.insert(c.url.clone()));
        assert!(c.related_sources.contains(&c.source));
        assert_eq!(c.related_sources.len(), c.cross_platform_count);
    }

    let merged = candidates
        .candidates
        .iter()
        .find(|c| c.cross_platform_count == 2)
        .expect("the GPT-5 story is corroborated");
    assert_eq!(merged.id, "hn-1"); // higher raw score wins identity
    assert!(merged.related_sources.contains("rss"));

    let prerank = pipeline::run_prerank(&cfg, date(), &out_dir, fixed_now()).unwrap();
    assert_eq!(prerank.input, 3);
    assert_eq!(prerank.selected, 3); // pool smaller than cap -> all kept

    let shortlist: ShortlistArtifact =
        artifact::read_json(&run_root.join("shortlist.json")).unwrap();
    assert_eq!(shortlist.items.len(), 3);
    for pair in shortlist.items.windows(2) {
        assert!(pair[0].prerank_score >= pair[1].prerank_score);
    }
    for item in &shortlist.items {
        let b = &item.prerank_breakdown;
        assert_eq!(
            item.prerank_score,
            b.timeliness + b.source_heat + b.keywords + b.credibility
        );
    }

    // Slim projection exists and parses as an array.
    let slim: Vec<serde_json::Value> =
        artifact::read_json(&run_root.join("candidates-slim.json")).unwrap();
    assert_eq!(slim.len(), 3);
}

#[tokio::test]
async fn rerunning_prerank_on_unchanged_candidates_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let batches = tmp.path().join("batches");
    fs::create_dir_all(&batches).unwrap();
    write_batches(&batches);

    let cfg = config(&batches);
    let out_dir = tmp.path().join("runs");
    pipeline::run_fetch(&cfg, date(), &out_dir, fixed_now())
        .await
        .unwrap();

    let shortlist_path = out_dir.join(date().to_string()).join("shortlist.json");
    pipeline::run_prerank(&cfg, date(), &out_dir, fixed_now()).unwrap();
    let first = fs::read_to_string(&shortlist_path).unwrap();
    pipeline::run_prerank(&cfg, date(), &out_dir, fixed_now()).unwrap();
    let second = fs::read_to_string(&shortlist_path).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn prerank_without_candidates_artifact_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = PipelineConfig::default();
    let err = pipeline::run_prerank(&cfg, date(), tmp.path(), fixed_now()).unwrap_err();
    assert!(format!("{err:#}").contains("candidates.json"));
}

#[tokio::test]
async fn malformed_candidates_artifact_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let run_root = tmp.path().join(date().to_string());
    fs::create_dir_all(&run_root).unwrap();
    fs::write(run_root.join("candidates.json"), "{broken").unwrap();

    let cfg = PipelineConfig::default();
    assert!(pipeline::run_prerank(&cfg, date(), tmp.path(), fixed_now()).is_err());
}
