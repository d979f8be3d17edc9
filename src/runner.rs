//! Sweep runner
//!
//! Sequential loop over the parameter grid: render a patched config, run the
//! engine against it, scrape the metrics, append the report row. Failures
//! stay local to their cell except an engine launch failure, which aborts
//! the whole sweep.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{self, BREAKOUT_BUF_KEY, TRAIL_MULT_KEY};
use crate::engine::{BacktestEngine, EngineError};
use crate::grid::ParamGrid;
use crate::metrics::{MetricsParser, RunMetrics};
use crate::report::{RunResult, SweepReport};

/// Everything one sweep needs, passed in explicitly
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub universe: PathBuf,
    pub base_config: PathBuf,
    pub report_path: PathBuf,
    pub engine_program: PathBuf,
    pub max_positions: u32,
    pub grid: ParamGrid,
}

/// What happened to one grid cell
#[derive(Debug)]
pub enum CellOutcome {
    /// Metrics parsed and the report row written.
    Recorded(RunMetrics),
    /// Engine ran but its output carried no metrics line.
    ParseMiss,
    /// Engine exited non-zero; nothing inspected, no row written.
    EngineFailure { detail: String },
}

/// Counters reported at the end of a sweep
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepSummary {
    pub cells: usize,
    pub recorded: usize,
    pub parse_misses: usize,
    pub engine_failures: usize,
}

pub struct SweepRunner {
    cfg: SweepConfig,
    engine: BacktestEngine,
    parser: MetricsParser,
    report: SweepReport,
    warned_missing: HashSet<String>,
}

impl SweepRunner {
    /// Create the runner and its report file (header written immediately)
    pub fn new(cfg: SweepConfig) -> Result<Self> {
        let engine = BacktestEngine::new(&cfg.engine_program, cfg.max_positions);
        let report = SweepReport::create(&cfg.report_path)?;

        Ok(SweepRunner {
            engine,
            parser: MetricsParser::new(),
            report,
            warned_missing: HashSet::new(),
            cfg,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.cfg
    }

    /// Run every grid cell sequentially, logging one line per cell
    pub fn run(&mut self) -> Result<SweepSummary> {
        let mut summary = SweepSummary::default();

        for (buf, trail) in self.cfg.grid.cells() {
            summary.cells += 1;
            match self.run_cell(buf, trail)? {
                CellOutcome::Recorded(metrics) => {
                    summary.recorded += 1;
                    info!(
                        "buf={} trail={} -> CAGR={}% MaxDD={}%",
                        buf, trail, metrics.cagr, metrics.max_dd
                    );
                }
                CellOutcome::ParseMiss => {
                    summary.parse_misses += 1;
                    warn!(
                        "no CAGR/MaxDD in engine output for buf={}, trail={}",
                        buf, trail
                    );
                }
                CellOutcome::EngineFailure { detail } => {
                    summary.engine_failures += 1;
                    warn!("engine failed for buf={}, trail={}: {}", buf, trail, detail);
                }
            }
        }

        Ok(summary)
    }

    /// Process a single grid cell
    pub fn run_cell(&mut self, buf: f64, trail: f64) -> Result<CellOutcome> {
        // Fresh read per cell: cells must not see each other's edits.
        let base = fs::read_to_string(&self.cfg.base_config).with_context(|| {
            format!(
                "Failed to read base config {}",
                self.cfg.base_config.display()
            )
        })?;

        let rendered =
            config::render_overrides(&base, &[(BREAKOUT_BUF_KEY, buf), (TRAIL_MULT_KEY, trail)]);
        for key in &rendered.missing {
            if self.warned_missing.insert(key.clone()) {
                warn!(
                    "key '{}' not found in {}; cells run with the base value",
                    key,
                    self.cfg.base_config.display()
                );
            }
        }

        // The temp config lives next to the base so relative paths inside it
        // keep resolving; the guard deletes it on every exit path.
        let dir = parent_dir(&self.cfg.base_config);
        let mut tmp = tempfile::Builder::new()
            .prefix("config_")
            .suffix(".yaml")
            .tempfile_in(dir)
            .context("Failed to create temp config")?;
        tmp.write_all(rendered.text.as_bytes())
            .context("Failed to write temp config")?;
        tmp.flush().context("Failed to flush temp config")?;

        let outcome = match self.engine.run(
            self.cfg.start,
            self.cfg.end,
            &self.cfg.universe,
            tmp.path(),
        ) {
            Ok(stdout) => match self.parser.parse(&stdout) {
                Some(metrics) => {
                    self.report.append(&RunResult {
                        buf,
                        trail,
                        cagr: metrics.cagr.clone(),
                        max_dd: metrics.max_dd.clone(),
                    })?;
                    CellOutcome::Recorded(metrics)
                }
                None => CellOutcome::ParseMiss,
            },
            Err(err @ EngineError::Launch { .. }) => {
                return Err(err).context("Backtest engine could not be launched");
            }
            Err(err @ EngineError::Exit { .. }) => CellOutcome::EngineFailure {
                detail: err.to_string(),
            },
        };

        Ok(outcome)
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
