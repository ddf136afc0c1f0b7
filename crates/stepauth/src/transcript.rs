//! JSONL transcript: append-only log of authentication runs, one line per step.

use crate::engine::LoginOutcome;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A single transcript line.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEvent {
    pub timestamp: String,
    pub run_id: String,
    pub source: String,
    pub step: Option<usize>,
    pub method: Option<String>,
    pub url: Option<String>,
    pub status: Option<u16>,
    pub duration_ms: u64,
    pub extracted: Vec<String>,
    pub outcome: String,
}

/// Append-only JSONL transcript writer.
pub struct Transcript {
    file: File,
    run_id: String,
}

impl Transcript {
    /// Open or create the transcript file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open transcript: {}", path.display()))?;

        Ok(Self {
            file,
            run_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    /// Default location, `~/.stepauth/transcript.jsonl`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".stepauth")
            .join("transcript.jsonl")
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log(&mut self, event: &TranscriptEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;
        writeln!(self.file, "{json}")?;
        Ok(())
    }

    /// Log every step of a finished run.
    pub fn log_outcome(&mut self, source: &str, outcome: &LoginOutcome) -> Result<()> {
        let last = outcome.steps.len();
        for report in &outcome.steps {
            let event = TranscriptEvent {
                timestamp: Utc::now().to_rfc3339(),
                run_id: self.run_id.clone(),
                source: source.to_string(),
                step: Some(report.index),
                method: Some(report.method.to_string()),
                url: Some(report.url.clone()),
                status: Some(report.status),
                duration_ms: report.elapsed_ms,
                extracted: report.extracted.iter().map(|p| p.name.clone()).collect(),
                outcome: if report.index == last { "final" } else { "ok" }.to_string(),
            };
            self.log(&event)?;
        }
        Ok(())
    }

    /// Log a run that aborted.
    pub fn log_failure(&mut self, source: &str, error: &str, duration_ms: u64) -> Result<()> {
        self.log(&TranscriptEvent {
            timestamp: Utc::now().to_rfc3339(),
            run_id: self.run_id.clone(),
            source: source.to_string(),
            step: None,
            method: None,
            url: None,
            status: None,
            duration_ms,
            extracted: Vec::new(),
            outcome: format!("error: {error}"),
        })
    }
}
