// src/ingest/providers/json_file.rs
//! Adapter over a pre-harvested `<source>.json` batch in the run's data
//! directory. Also the seam integration tests plug into.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::ingest::types::{SourceAdapter, SourceBatch};

pub struct JsonFileSource {
    name: String,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for JsonFileSource {
    async fn fetch(&self) -> Result<SourceBatch> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading source batch from {}", self.path.display()))?;
        let batch: SourceBatch = serde_json::from_str(&content)
            .with_context(|| format!("parsing source batch {}", self.path.display()))?;
        Ok(batch)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source_type(&self) -> &str {
        "file"
    }
}
