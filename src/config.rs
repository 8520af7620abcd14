// src/config.rs
//! Declarative pipeline configuration (TOML).
//!
//! Resolution order: explicit `--config` path → `$PRERANK_CONFIG_PATH` →
//! `config/pipeline.toml` if present → built-in seed defaults. A config file
//! that exists but fails to read or parse is fatal.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::merge::DedupSettings;
use crate::score::credibility::CredibilityTable;
use crate::score::heat::HeatStrategy;
use crate::select::SelectionSettings;

pub const ENV_CONFIG_PATH: &str = "PRERANK_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub settings: Settings,
    pub priorities: Priorities,
    pub keywords: KeywordBonuses,
    pub credibility: CredibilityTable,
    /// Per-source heat strategy overrides, merged over the built-in seed.
    pub heat: HashMap<String, HeatStrategy>,
    /// Sources keyed by name; processing order is the map's (alphabetical)
    /// order, which keeps exact-dedup "first occurrence wins" deterministic.
    pub sources: BTreeMap<String, SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Offset applied to UTC when resolving the default target date.
    pub utc_offset_hours: i32,
    /// Candidates older than this are dropped; 0 disables the filter.
    pub max_age_hours: u32,
    pub fetch_timeout_secs: u64,
    pub shortlist_cap: usize,
    pub score_floor: u8,
    pub per_source_keep: usize,
    pub per_category_keep: usize,
    pub dedup: DedupSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            utc_offset_hours: 0,
            max_age_hours: 48,
            fetch_timeout_secs: 15,
            shortlist_cap: 40,
            score_floor: 50,
            per_source_keep: 3,
            per_category_keep: 2,
            dedup: DedupSettings::default(),
        }
    }
}

/// Keyword priority tiers. Empty by default — the lists are domain
/// configuration, not code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Priorities {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeywordBonuses {
    pub actionability: Vec<String>,
    pub domain_terms: Vec<String>,
}

impl Default for KeywordBonuses {
    fn default() -> Self {
        Self {
            actionability: crate::score::keywords::seed_actionability(),
            domain_terms: crate::score::keywords::seed_domain_terms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub enabled: bool,
    /// Harvester command; when set the source runs as a `ScriptSource`.
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Pre-harvested batch file; defaults to `<data dir>/<name>.json`.
    pub file: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
            args: Vec::new(),
            file: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration, following the documented resolution order.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            return Self::from_path(Path::new(&p));
        }
        let default = Path::new(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::from_path(default);
        }
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config at {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing pipeline config at {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PipelineConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    pub fn selection_settings(&self) -> SelectionSettings {
        SelectionSettings {
            shortlist_cap: self.settings.shortlist_cap,
            score_floor: self.settings.score_floor,
            per_source_keep: self.settings.per_source_keep,
            per_category_keep: self.settings.per_category_keep,
        }
    }
}
