// src/ingest/providers/script.rs
//! Adapter that runs an external harvester command. The command is expected to
//! write a JSON source batch to the path passed via `--output`; this is how
//! the per-source fetchers stay outside the pipeline boundary.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::debug;

use crate::ingest::types::{SourceAdapter, SourceBatch};

pub struct ScriptSource {
    name: String,
    program: String,
    args: Vec<String>,
    output_path: PathBuf,
}

impl ScriptSource {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        args: Vec<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            output_path: output_path.into(),
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for ScriptSource {
    async fn fetch(&self) -> Result<SourceBatch> {
        debug!(source = %self.name, program = %self.program, "spawning harvester");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--output")
            .arg(&self.output_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("spawning harvester `{}` for {}", self.program, self.name))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let first_line = stderr.lines().next().unwrap_or("").trim().to_string();
            bail!(
                "harvester for {} exited with {}: {}",
                self.name,
                output.status,
                first_line
            );
        }

        let content = tokio::fs::read_to_string(&self.output_path)
            .await
            .with_context(|| {
                format!(
                    "reading harvester output {}",
                    self.output_path.display()
                )
            })?;
        let mut batch: SourceBatch = serde_json::from_str(&content)
            .with_context(|| format!("parsing harvester output for {}", self.name))?;
        if batch.source.is_empty() {
            batch.source = self.name.clone();
        }
        Ok(batch)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
