//! JSON export functionality

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use vllm_bench_core::RunReport;

use crate::memory::MemorySummary;

#[derive(Serialize)]
struct ExportDocument<'a> {
    #[serde(flatten)]
    report: &'a RunReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<&'a MemorySummary>,
}

/// Writes run reports to disk as pretty-printed JSON
pub struct JsonExporter;

impl JsonExporter {
    /// Export the full report (outcomes, stats and config) to a JSON file
    pub fn export(report: &RunReport, memory: Option<&MemorySummary>, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, &ExportDocument { report, memory })
            .context("failed to serialize run report")?;
        writer.flush()?;

        Ok(())
    }
}
