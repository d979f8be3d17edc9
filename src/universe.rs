//! Universe file inspection
//!
//! The sweep hands the universe file to the engine untouched; the `check`
//! command reads it once up front to catch a missing or empty symbol list
//! before a long sweep burns hours on it.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Symbols shown in the preview.
const HEAD_LEN: usize = 12;

/// Symbols written to the smoke list.
pub const SMOKE_LEN: usize = 30;

#[derive(Debug)]
pub struct UniverseSummary {
    pub path: PathBuf,
    pub symbols: Vec<String>,
}

impl UniverseSummary {
    pub fn head(&self) -> &[String] {
        &self.symbols[..self.symbols.len().min(HEAD_LEN)]
    }
}

/// Read the universe CSV. The first column holds the symbol; a leading
/// `symbol` header row is recognized case-insensitively. Blank entries are
/// dropped and duplicates removed, preserving first-seen order.
pub fn inspect(path: impl AsRef<Path>) -> Result<UniverseSummary> {
    let path = path.as_ref().to_path_buf();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open universe file {}", path.display()))?;

    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        let Some(field) = record.get(0) else {
            continue;
        };
        let symbol = field.trim();
        if symbol.is_empty() {
            continue;
        }
        if row_idx == 0 && symbol.eq_ignore_ascii_case("symbol") {
            continue;
        }
        if seen.insert(symbol.to_string()) {
            symbols.push(symbol.to_string());
        }
    }

    Ok(UniverseSummary { path, symbols })
}

/// Write the first `SMOKE_LEN` symbols as a small universe for quick runs
pub fn write_smoke(summary: &UniverseSummary, out: impl AsRef<Path>) -> Result<()> {
    let out = out.as_ref();
    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("Failed to create smoke list {}", out.display()))?;

    writer.write_record(["symbol"])?;
    for symbol in summary.symbols.iter().take(SMOKE_LEN) {
        writer.write_record([symbol.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
