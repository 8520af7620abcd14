// tests/merge_dedup.rs
// Cross-source merge behavior over the combined candidate list.

use std::collections::{BTreeSet, HashSet};

use chrono::{TimeZone, Utc};
use hotspot_prerank::candidate::Candidate;
use hotspot_prerank::merge::{merge_and_dedup, DedupSettings};

fn cand(id: &str, source: &str, title: &str, url: &str, raw_score: f64) -> Candidate {
    Candidate {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        source: source.to_string(),
        source_type: "script".into(),
        category: None,
        summary: String::new(),
        key_quotes: Vec::new(),
        published_at: None,
        fetched_at: Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap(),
        raw_score,
        comments: 0,
        metadata: serde_json::Map::new(),
        cross_platform_count: 1,
        related_sources: BTreeSet::from([source.to_string()]),
        merged_titles: Vec::new(),
    }
}

#[test]
fn no_two_outputs_share_a_url() {
    let pool = vec![
        cand("a", "hackernews", "Story one", "https://e.com/1", 10.0),
        cand("b", "rss", "Story one mirrored", "https://e.com/1", 90.0),
        cand("c", "rss", "Story two", "https://e.com/2", 20.0),
        cand("d", "github", "Story two", "https://e.com/2", 30.0),
        cand("e", "github", "Unrelated", "https://e.com/3", 5.0),
    ];
    let out = merge_and_dedup(pool, &DedupSettings::default());
    let mut urls = HashSet::new();
    for c in &out.candidates {
        assert!(urls.insert(c.url.clone()), "duplicate url {}", c.url);
    }
}

#[test]
fn later_item_with_same_url_is_dropped_before_anything_else() {
    // Same url from a different source: dropped by exact dedup, never merged.
    let pool = vec![
        cand("first", "hackernews", "Original headline", "https://e.com/x", 10.0),
        cand("second", "rss", "Totally different headline", "https://e.com/x", 99.0),
    ];
    let out = merge_and_dedup(pool, &DedupSettings::default());
    assert_eq!(out.url_dropped, 1);
    assert_eq!(out.candidates.len(), 1);
    assert_eq!(out.candidates[0].id, "first");
    assert_eq!(out.candidates[0].cross_platform_count, 1);
}

#[test]
fn near_duplicate_story_merges_with_higher_score_identity() {
    // "OpenAI releases GPT-5" (source A, 80) vs a near-duplicate (source B, 60).
    let pool = vec![
        cand("a-1", "source-a", "OpenAI releases GPT-5", "https://a.com/gpt5", 80.0),
        cand("b-1", "source-b", "OpenAI releases GPT-5 model today", "https://b.com/gpt5", 60.0),
    ];
    let out = merge_and_dedup(pool, &DedupSettings::default());
    assert_eq!(out.fuzzy_merged, 1);
    assert_eq!(out.candidates.len(), 1);

    let m = &out.candidates[0];
    assert_eq!(m.id, "a-1");
    assert_eq!(m.url, "https://a.com/gpt5");
    assert_eq!(m.source, "source-a");
    assert_eq!(m.cross_platform_count, 2);
    assert_eq!(
        m.related_sources,
        BTreeSet::from(["source-a".to_string(), "source-b".to_string()])
    );
    assert_eq!(m.merged_titles, vec!["OpenAI releases GPT-5 model today".to_string()]);
}

#[test]
fn related_sources_always_include_own_source_and_match_count() {
    let pool = vec![
        cand("a", "s1", "Falcon heavy launch", "https://1", 5.0),
        cand("b", "s2", "Falcon Heavy Launch!", "https://2", 7.0),
        cand("c", "s3", "quiet tuesday news", "https://3", 1.0),
    ];
    let out = merge_and_dedup(pool, &DedupSettings::default());
    for c in &out.candidates {
        assert!(c.related_sources.contains(&c.source), "{} missing own source", c.id);
        assert_eq!(c.related_sources.len(), c.cross_platform_count);
    }
}

#[test]
fn merge_is_idempotent_over_its_own_output() {
    let pool = vec![
        cand("a", "s1", "OpenAI releases GPT-5", "https://1", 80.0),
        cand("b", "s2", "OpenAI releases GPT-5!", "https://2", 60.0),
        cand("c", "s3", "Something else entirely", "https://3", 40.0),
    ];
    let once = merge_and_dedup(pool, &DedupSettings::default());
    let again = merge_and_dedup(once.candidates.clone(), &DedupSettings::default());

    let a = serde_json::to_string(&once.candidates).unwrap();
    // Merging a merged set only touches already-related sources, so the set
    // and order are unchanged.
    let b = serde_json::to_string(&again.candidates).unwrap();
    assert_eq!(a, b);
}
