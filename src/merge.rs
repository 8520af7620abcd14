// src/merge.rs
//! Merge & dedup engine: exact URL dedup in source-processing order, then
//! fuzzy cross-source title clustering.
//!
//! Fuzzy matching clusters candidates with a union-find over every
//! cross-source pair whose title similarity meets the threshold, then keeps
//! each cluster's highest-scoring record (earlier-seen wins ties). The result
//! does not depend on input order beyond that tie-break.

use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DedupSettings {
    pub url_exact_match: bool,
    pub fuzzy_cross_source: bool,
    pub similarity_threshold: f64,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            url_exact_match: true,
            fuzzy_cross_source: true,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

#[derive(Debug)]
pub struct MergeOutcome {
    pub candidates: Vec<Candidate>,
    pub url_dropped: usize,
    pub fuzzy_merged: usize,
}

/// Lowercase and strip all whitespace and Unicode punctuation; the comparison
/// key for fuzzy title matching.
pub fn normalized_title(s: &str) -> String {
    static RE_STRIP: OnceCell<Regex> = OnceCell::new();
    let re = RE_STRIP.get_or_init(|| Regex::new(r"[\s\p{P}]+").unwrap());
    re.replace_all(&s.to_lowercase(), "").into_owned()
}

/// Title similarity in 0.0..=1.0: 1.0 for identical normalized strings, 0.9
/// when one contains the other, otherwise the Dice coefficient over character
/// bigrams. Strings shorter than two chars after normalization only ever
/// match exactly.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    similarity_of_keys(&normalized_title(a), &normalized_title(b))
}

/// Exact URL dedup: first occurrence wins, later items with the same URL are
/// dropped unconditionally.
pub fn dedup_by_url(candidates: Vec<Candidate>) -> (Vec<Candidate>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    let mut kept = Vec::with_capacity(candidates.len());
    let mut dropped = 0usize;
    for c in candidates {
        if !seen.insert(c.url.clone()) {
            dropped += 1;
            continue;
        }
        kept.push(c);
    }
    (kept, dropped)
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower index as root keeps cluster iteration stable.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Fuzzy cross-source merge. Candidates from *different* sources whose titles
/// meet the similarity threshold collapse into one record that keeps the
/// identity fields of the highest-raw-score member; the others contribute
/// their titles and sources. Same-source pairs never merge here.
pub fn merge_cross_source(candidates: Vec<Candidate>, threshold: f64) -> (Vec<Candidate>, usize) {
    let n = candidates.len();
    let mut uf = UnionFind::new(n);

    // Titles normalize once up front; the sweep itself is O(n^2), fine for
    // the few hundred candidates a run carries.
    let keys: Vec<String> = candidates.iter().map(|c| normalized_title(&c.title)).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            if candidates[i].source == candidates[j].source {
                continue;
            }
            if similarity_of_keys(&keys[i], &keys[j]) >= threshold {
                uf.union(i, j);
            }
        }
    }

    // Group members per cluster, in first-seen order.
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut root_to_cluster: HashMap<usize, usize> = HashMap::new();
    for i in 0..n {
        let root = uf.find(i);
        match root_to_cluster.get(&root) {
            Some(&slot) => clusters[slot].push(i),
            None => {
                root_to_cluster.insert(root, clusters.len());
                clusters.push(vec![i]);
            }
        }
    }

    let mut merged_away = 0usize;
    let mut out: Vec<Candidate> = Vec::with_capacity(clusters.len());
    for members in clusters {
        let rep_idx = members
            .iter()
            .copied()
            .reduce(|best, cur| {
                if candidates[cur].raw_score > candidates[best].raw_score {
                    cur
                } else {
                    best
                }
            })
            .expect("cluster is never empty");

        let mut rep = candidates[rep_idx].clone();
        let mut related: BTreeSet<String> = rep.related_sources.clone();
        let mut titles: Vec<String> = rep.merged_titles.clone();
        for &m in &members {
            if m == rep_idx {
                continue;
            }
            let other = &candidates[m];
            related.extend(other.related_sources.iter().cloned());
            titles.extend(other.merged_titles.iter().cloned());
            titles.push(other.title.clone());
            merged_away += 1;
        }
        rep.cross_platform_count = related.len();
        rep.related_sources = related;
        rep.merged_titles = titles;
        out.push(rep);
    }

    // Corroborated stories first, then raw score, then id.
    out.sort_by(|a, b| {
        b.cross_platform_count
            .cmp(&a.cross_platform_count)
            .then(b.raw_score.total_cmp(&a.raw_score))
            .then_with(|| a.id.cmp(&b.id))
    });

    (out, merged_away)
}

// The similarity ladder, over pre-normalized keys.
fn similarity_of_keys(na: &str, nb: &str) -> f64 {
    if na == nb {
        return 1.0;
    }
    if na.chars().count() < 2 || nb.chars().count() < 2 {
        return 0.0;
    }
    if na.contains(nb) || nb.contains(na) {
        return 0.9;
    }
    strsim::sorensen_dice(na, nb)
}

/// Full merge stage: URL dedup, then fuzzy cross-source clustering, per the
/// run's dedup settings.
pub fn merge_and_dedup(candidates: Vec<Candidate>, settings: &DedupSettings) -> MergeOutcome {
    let (after_url, url_dropped) = if settings.url_exact_match {
        dedup_by_url(candidates)
    } else {
        (candidates, 0)
    };

    let (candidates, fuzzy_merged) = if settings.fuzzy_cross_source {
        merge_cross_source(after_url, settings.similarity_threshold)
    } else {
        (after_url, 0)
    };

    MergeOutcome {
        candidates,
        url_dropped,
        fuzzy_merged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn cand(id: &str, source: &str, title: &str, url: &str, raw_score: f64) -> Candidate {
        let mut related = BTreeSet::new();
        related.insert(source.to_string());
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
            related_sources: related,
            merged_titles: Vec::new(),
        }
    }

    #[test]
    fn normalization_strips_case_space_and_punctuation() {
        assert_eq!(normalized_title("OpenAI Releases GPT-5!"), "openaireleasesgpt5");
        assert_eq!(normalized_title("open-ai releases gpt 5"), "openaireleasesgpt5");
    }

    #[test]
    fn url_dedup_first_occurrence_wins() {
        let items = vec![
            cand("a", "hackernews", "Story", "https://e.com/x", 80.0),
            cand("b", "rss", "Story again", "https://e.com/x", 99.0),
            cand("c", "rss", "Other", "https://e.com/y", 10.0),
        ];
        let (kept, dropped) = dedup_by_url(items);
        assert_eq!(dropped, 1);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].id, "a");
    }

    #[test]
    fn cross_source_merge_keeps_higher_score_identity() {
        let items = vec![
            cand("a1", "src-a", "OpenAI releases GPT-5", "https://a.com/1", 80.0),
            cand("b1", "src-b", "OpenAI Releases GPT-5!", "https://b.com/1", 60.0),
        ];
        let (merged, away) = merge_cross_source(items, 0.5);
        assert_eq!(away, 1);
        assert_eq!(merged.len(), 1);
        let m = &merged[0];
        assert_eq!(m.id, "a1");
        assert_eq!(m.url, "https://a.com/1");
        assert_eq!(m.cross_platform_count, 2);
        assert!(m.related_sources.contains("src-a") && m.related_sources.contains("src-b"));
        assert_eq!(m.merged_titles, vec!["OpenAI Releases GPT-5!".to_string()]);
    }

    #[test]
    fn same_source_titles_never_fuzzy_merge() {
        let items = vec![
            cand("a1", "rss", "Big model release", "https://e.com/1", 10.0),
            cand("a2", "rss", "Big model release", "https://e.com/2", 20.0),
        ];
        let (merged, away) = merge_cross_source(items, 0.5);
        assert_eq!(away, 0);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn chains_merge_transitively() {
        // a~b and b~c meet the threshold; a~c does not need to.
        let items = vec![
            cand("a", "s1", "Anthropic ships Claude agents", "https://1", 10.0),
            cand("b", "s2", "Claude agents", "https://2", 30.0),
            cand("c", "s3", "Claude agents ship to all enterprise users", "https://3", 20.0),
        ];
        let (merged, _) = merge_cross_source(items, 0.5);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "b");
        assert_eq!(merged[0].cross_platform_count, 3);
    }

    #[test]
    fn merge_result_ignores_input_order() {
        let a = cand("a", "s1", "Rust 2.0 announced", "https://1", 50.0);
        let b = cand("b", "s2", "Rust 2.0 announced!", "https://2", 70.0);
        let c = cand("c", "s3", "Completely unrelated story", "https://3", 10.0);

        let (fwd, _) = merge_cross_source(vec![a.clone(), b.clone(), c.clone()], 0.5);
        let (rev, _) = merge_cross_source(vec![c, b, a], 0.5);

        let ids = |v: &[Candidate]| v.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&fwd), ids(&rev));
        assert_eq!(fwd[0].cross_platform_count, rev[0].cross_platform_count);
    }

    #[test]
    fn disabled_flags_skip_stages() {
        let items = vec![
            cand("a", "s1", "Same story", "https://e.com/x", 10.0),
            cand("b", "s2", "Same story", "https://e.com/x", 20.0),
        ];
        let settings = DedupSettings {
            url_exact_match: false,
            fuzzy_cross_source: false,
            similarity_threshold: 0.5,
        };
        let out = merge_and_dedup(items, &settings);
        assert_eq!(out.candidates.len(), 2);
        assert_eq!(out.url_dropped, 0);
        assert_eq!(out.fuzzy_merged, 0);
    }
}
