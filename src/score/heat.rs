// src/score/heat.rs
//! Source-heat normalization: maps heterogeneous raw popularity signals
//! (stars, upvotes, likes, views) onto a comparable 0..=25 scale.
//!
//! Each source declares a strategy; new sources plug in through configuration
//! without touching the scoring core.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const MAX_HEAT: u8 = 25;

/// One band of a fixed-scale lookup: raw scores up to `up_to` map to `heat`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub up_to: f64,
    pub heat: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeatStrategy {
    /// Square-root dampening for high-variance engagement sources:
    /// `min(25, round(sqrt(raw + comments * comment_weight) * scale))`, plus
    /// an optional +5 when the named metadata flag is set.
    Damped {
        #[serde(default)]
        comment_weight: f64,
        #[serde(default = "default_scale")]
        scale: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bonus_key: Option<String>,
    },
    /// Banded lookup for fixed-scale sources; `zero` applies when the raw
    /// signal is absent, `above` past the last band.
    Banded {
        #[serde(default = "default_bands")]
        bands: Vec<Band>,
        #[serde(default = "default_zero")]
        zero: u8,
        #[serde(default = "default_above")]
        above: u8,
    },
}

fn default_scale() -> f64 {
    1.0
}

fn default_bands() -> Vec<Band> {
    vec![
        Band { up_to: 10.0, heat: 8 },
        Band { up_to: 30.0, heat: 12 },
        Band { up_to: 50.0, heat: 16 },
    ]
}

fn default_zero() -> u8 {
    5
}

fn default_above() -> u8 {
    20
}

impl Default for HeatStrategy {
    fn default() -> Self {
        HeatStrategy::Banded {
            bands: default_bands(),
            zero: default_zero(),
            above: default_above(),
        }
    }
}

impl HeatStrategy {
    pub fn heat(
        &self,
        raw_score: f64,
        comments: u32,
        metadata: &serde_json::Map<String, serde_json::Value>,
    ) -> u8 {
        match self {
            HeatStrategy::Damped {
                comment_weight,
                scale,
                bonus_key,
            } => {
                let combined = raw_score.max(0.0) + f64::from(comments) * comment_weight;
                let base = (combined.sqrt() * scale).round().clamp(0.0, f64::from(MAX_HEAT)) as u8;
                let bonus = match bonus_key {
                    Some(key) => match metadata.get(key) {
                        Some(v) if v.as_bool() == Some(true) => 5,
                        _ => 0,
                    },
                    None => 0,
                };
                (base + bonus).min(MAX_HEAT)
            }
            HeatStrategy::Banded { bands, zero, above } => {
                let heat = if raw_score <= 0.0 {
                    *zero
                } else {
                    bands
                        .iter()
                        .find(|b| raw_score <= b.up_to)
                        .map(|b| b.heat)
                        .unwrap_or(*above)
                };
                heat.min(MAX_HEAT)
            }
        }
    }
}

/// Source → strategy mapping with a banded default for unknown sources.
#[derive(Debug, Clone)]
pub struct HeatTable {
    strategies: HashMap<String, HeatStrategy>,
    default: HeatStrategy,
}

impl HeatTable {
    /// Built-in strategies for the high-variance sources, overridable (or
    /// extendable) from configuration.
    pub fn with_overrides(overrides: &HashMap<String, HeatStrategy>) -> Self {
        let mut strategies = seed_strategies();
        for (source, strategy) in overrides {
            strategies.insert(source.to_ascii_lowercase(), strategy.clone());
        }
        Self {
            strategies,
            default: HeatStrategy::default(),
        }
    }

    pub fn for_source(&self, source: &str) -> &HeatStrategy {
        self.strategies
            .get(&source.to_ascii_lowercase())
            .unwrap_or(&self.default)
    }
}

impl Default for HeatTable {
    fn default() -> Self {
        Self::with_overrides(&HashMap::new())
    }
}

fn seed_strategies() -> HashMap<String, HeatStrategy> {
    let mut map = HashMap::new();
    map.insert(
        "hackernews".to_string(),
        HeatStrategy::Damped {
            comment_weight: 2.0,
            scale: 1.0,
            bonus_key: None,
        },
    );
    map.insert(
        "github".to_string(),
        HeatStrategy::Damped {
            comment_weight: 0.0,
            scale: 1.1,
            bonus_key: Some("aiRelated".to_string()),
        },
    );
    map
}
