//! End-of-run summary written next to the session log.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use goap_runtime::{AgentSnapshot, MetricsSnapshot};
use serde::Serialize;

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub session: String,
    pub started_at: String,
    pub finished_at: String,
    /// Why the loop stopped: `aborted`, `deadline` or `interrupted`.
    pub reason: String,
    pub kills: u64,
    pub corpses_left: u32,
    pub metrics: MetricsSnapshot,
    pub snapshot: AgentSnapshot,
}

impl RunSummary {
    pub fn new(
        session: &str,
        started_at: DateTime<Utc>,
        reason: &str,
        metrics: MetricsSnapshot,
        snapshot: AgentSnapshot,
    ) -> Self {
        Self {
            session: session.to_owned(),
            started_at: started_at.to_rfc3339(),
            finished_at: Utc::now().to_rfc3339(),
            reason: reason.to_owned(),
            kills: snapshot.state.kills(),
            corpses_left: snapshot.state.consumable_corpses(),
            metrics,
            snapshot,
        }
    }

    /// Writes the summary as pretty JSON into `dir`, returning the file path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(SUMMARY_FILE);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("Failed to write summary: {}", path.display()))?;
        writer.flush()?;
        Ok(path)
    }
}
