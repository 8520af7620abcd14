// src/score/keywords.rs
//! Keyword relevance: case-insensitive substring match of title+summary
//! against three priority tiers (15/10/5, first match per tier only) plus
//! flat bonuses for actionability terms and domain high-frequency terms.
//! Capped at 25.

use once_cell::sync::OnceCell;
use regex::Regex;

pub const MAX_KEYWORDS: u8 = 25;

/// Fold Unicode dash/hyphen glyphs to an ASCII hyphen so "GPT‑5" and "GPT-5"
/// match the same keyword.
pub fn fold_dashes(s: &str) -> String {
    static RE_DASH: OnceCell<Regex> = OnceCell::new();
    let re = RE_DASH.get_or_init(|| {
        Regex::new(r"[\u{2010}-\u{2015}\u{FE58}\u{FE63}\u{FF0D}]").unwrap()
    });
    re.replace_all(s, "-").into_owned()
}

/// Immutable keyword tables; all entries are lowercased (and empties dropped)
/// at construction so matching stays a plain substring scan.
#[derive(Debug, Clone)]
pub struct KeywordTables {
    high: Vec<String>,
    medium: Vec<String>,
    low: Vec<String>,
    actionability: Vec<String>,
    domain_terms: Vec<String>,
}

impl KeywordTables {
    pub fn new(
        high: &[String],
        medium: &[String],
        low: &[String],
        actionability: &[String],
        domain_terms: &[String],
    ) -> Self {
        Self {
            high: prepare(high),
            medium: prepare(medium),
            low: prepare(low),
            actionability: prepare(actionability),
            domain_terms: prepare(domain_terms),
        }
    }

    pub fn score(&self, title: &str, summary: &str) -> u8 {
        let text = fold_dashes(&format!("{title} {summary}")).to_lowercase();

        let mut score = 0u8;
        if matches_any(&text, &self.high) {
            score += 15;
        }
        if matches_any(&text, &self.medium) {
            score += 10;
        }
        if matches_any(&text, &self.low) {
            score += 5;
        }
        if matches_any(&text, &self.actionability) {
            score += 5;
        }
        if matches_any(&text, &self.domain_terms) {
            score += 5;
        }
        score.min(MAX_KEYWORDS)
    }
}

fn prepare(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn matches_any(text: &str, words: &[String]) -> bool {
    words.iter().any(|w| text.contains(w.as_str()))
}

/// Actionability terms signalling a shipped release or usable tool.
pub fn seed_actionability() -> Vec<String> {
    [
        "release",
        "released",
        "launches",
        "launched",
        "launch",
        "发布",
        "开源",
        "open source",
        "open-source",
        "api",
        "available",
        "now available",
        "sdk",
        "framework",
        "library",
        "tool",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Domain high-frequency terms (Chinese AI-news vocabulary).
pub fn seed_domain_terms() -> Vec<String> {
    ["模型", "大模型", "发布", "融资", "开源", "训练", "推理"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
