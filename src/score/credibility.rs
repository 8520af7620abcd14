//! # Source credibility
//!
//! Fixed per-source trust scores on the 0..=25 sub-score scale (seed values
//! run 10–22), with a default fallback for unknown sources.
//!
//! - Case-insensitive lookup with normalization of punctuation, dashes, etc.
//! - Aliases map alternative spellings to canonical sources.
//! - Fallback order: aliases → exact match → substring match → default.
//! - Ships a built-in seed table; configuration can replace it wholesale.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MAX_CREDIBILITY: u8 = 25;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredibilityTable {
    /// Default score when no match is found.
    #[serde(default = "default_default_weight")]
    pub default_weight: u8,
    /// Explicit scores for canonical source names (normalized keys).
    #[serde(default)]
    pub weights: HashMap<String, u8>,
    /// Aliases mapping non-canonical names → canonical names.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn default_default_weight() -> u8 {
    10
}

impl CredibilityTable {
    /// Get the credibility score for a given source name.
    ///
    /// Steps:
    /// 1. Alias lookup (normalized) → canonical → score.
    /// 2. Exact match.
    /// 3. Substring fallback (e.g. "arxiv-cs" → "arxiv").
    /// 4. Default.
    pub fn weight_for(&self, source: &str) -> u8 {
        let s = normalize(source);

        // 1) Alias resolution.
        if let Some(canon) = self.aliases.get(&s) {
            let c = normalize(canon);
            if let Some(&w) = self.weights.get(&c) {
                return w.min(MAX_CREDIBILITY);
            }
        }

        // 2) Exact match.
        if let Some(&w) = self.weights.get(&s) {
            return w.min(MAX_CREDIBILITY);
        }

        // 3) Substring fallback.
        for (k, &w) in &self.weights {
            if s.contains(k.as_str()) {
                return w.min(MAX_CREDIBILITY);
            }
        }

        // 4) Default.
        self.default_weight.min(MAX_CREDIBILITY)
    }

    /// Built-in seed covering the stock harvest sources.
    pub fn seed() -> Self {
        let mut weights = HashMap::new();
        let mut aliases = HashMap::new();

        for (k, v) in [
            ("hackernews", 22),
            ("arxiv", 20),
            ("papers with code", 19),
            ("semantic scholar", 19),
            ("github", 18),
            ("alphaxiv", 18),
            ("huggingface", 18),
            ("rss", 17),
            ("alphasignal", 17),
            ("deep learning monitor", 16),
            ("quantumbit", 15),
            ("replicate", 14),
            ("websearch", 13),
            ("product hunt", 12),
            ("x twitter", 10),
        ] {
            weights.insert(k.to_string(), v);
        }

        for (a, c) in [
            ("hn", "hackernews"),
            ("hacker news", "hackernews"),
            ("news ycombinator com", "hackernews"),
            ("pwc", "papers with code"),
            ("hf", "huggingface"),
            ("hugging face", "huggingface"),
            ("twitter", "x twitter"),
            ("x com", "x twitter"),
            ("ph", "product hunt"),
        ] {
            aliases.insert(a.to_string(), c.to_string());
        }

        Self {
            default_weight: 10,
            weights,
            aliases,
        }
    }
}

impl Default for CredibilityTable {
    fn default() -> Self {
        Self::seed()
    }
}

/// Normalize input string: lowercase, replace punctuation/dashes with spaces,
/// collapse multiple spaces into one.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();

    // Replace common separators with spaces.
    for ch in ['—', '–', '-', '_', '/', '\\'] {
        out = out.replace(ch, " ");
    }

    // Replace disruptive punctuation/whitespace with spaces.
    out = out.replace(['\n', '\r', '\t', '.', ',', '\''], " ");

    // Collapse multiple spaces.
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
