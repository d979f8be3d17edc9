//! Append-only CSV results report
//!
//! Header `buf,trail,CAGR,MaxDD`, one row per parsed grid cell. Rows are
//! flushed as they are written so an interrupted sweep still leaves usable
//! partial results on disk.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const REPORT_HEADER: [&str; 4] = ["buf", "trail", "CAGR", "MaxDD"];

/// One report row. CAGR / MaxDD keep the exact text captured from the engine
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub buf: f64,
    pub trail: f64,
    #[serde(rename = "CAGR")]
    pub cagr: String,
    #[serde(rename = "MaxDD")]
    pub max_dd: String,
}

/// Writer for the results file
pub struct SweepReport {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl SweepReport {
    /// Create the report file and write the header row immediately
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(REPORT_HEADER)?;
        writer.flush()?;

        Ok(SweepReport { path, writer })
    }

    /// Append one row and flush it to disk
    pub fn append(&mut self, row: &RunResult) -> Result<()> {
        self.writer
            .serialize(row)
            .with_context(|| format!("Failed to append row to {}", self.path.display()))?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
