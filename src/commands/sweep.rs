//! Sweep command implementation with progress tracking

use anyhow::{Context, Result};
use breakout_sweep::grid::ParamGrid;
use breakout_sweep::runner::{CellOutcome, SweepConfig, SweepRunner};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn};

/// Parse comma-separated floats
fn parse_float_list(s: &str) -> Vec<f64> {
    s.split(',')
        .filter_map(|x| x.trim().parse().ok())
        .collect()
}

fn parse_date(label: &str, s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date '{}', expected YYYY-MM-DD", label, s))
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    start: String,
    end: String,
    universe: PathBuf,
    config: PathBuf,
    buffers: Option<String>,
    trails: Option<String>,
    engine: PathBuf,
    max_pos: u32,
    out: PathBuf,
) -> Result<()> {
    info!("Starting sweep");

    let start = parse_date("start", &start)?;
    let end = parse_date("end", &end)?;
    if end < start {
        anyhow::bail!("End date {} is before start date {}", end, start);
    }

    if !config.exists() {
        anyhow::bail!("Base config not found: {}", config.display());
    }
    if !universe.exists() {
        anyhow::bail!("Universe file not found: {}", universe.display());
    }

    let defaults = ParamGrid::default_grid();
    let grid = ParamGrid::new(
        buffers
            .as_deref()
            .map(parse_float_list)
            .unwrap_or(defaults.buffers),
        trails
            .as_deref()
            .map(parse_float_list)
            .unwrap_or(defaults.trail_multipliers),
    );
    if grid.is_empty() {
        anyhow::bail!("Parameter grid is empty; check --buffers/--trails");
    }

    info!("Date range: {} .. {}", start, end);
    info!(
        "Grid: {} buffers x {} trails = {} cells",
        grid.buffers.len(),
        grid.trail_multipliers.len(),
        grid.total()
    );

    // Print summary
    println!("\n{}", "=".repeat(70));
    println!("SWEEP SUMMARY");
    println!("{}", "=".repeat(70));
    println!("  Date range:  {} .. {}", start, end);
    println!("  Universe:    {}", universe.display());
    println!("  Base config: {}", config.display());
    println!("  Engine:      {}", engine.display());
    println!("  Buffers:     {:?}", grid.buffers);
    println!("  Trails:      {:?}", grid.trail_multipliers);
    println!("  Cells:       {}", grid.total());
    println!("  Report:      {}", out.display());
    println!("{}\n", "=".repeat(70));

    let cells = grid.cells();
    let mut runner = SweepRunner::new(SweepConfig {
        start,
        end,
        universe,
        base_config: config,
        report_path: out,
        engine_program: engine,
        max_positions: max_pos,
        grid,
    })?;

    let pb = ProgressBar::new(cells.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("⚡ {percent:>3}%|{bar:40}| {pos}/{len} [{elapsed}<{eta}] ✓ {msg}")
            .unwrap()
            .progress_chars("█░ "),
    );

    let mut recorded = 0usize;
    let mut parse_misses = 0usize;
    let mut engine_failures = 0usize;

    for (buf, trail) in cells {
        match runner.run_cell(buf, trail)? {
            CellOutcome::Recorded(metrics) => {
                recorded += 1;
                pb.println(format!(
                    "✓ buf={} trail={} -> CAGR={}% MaxDD={}%",
                    buf, trail, metrics.cagr, metrics.max_dd
                ));
                info!(
                    "buf={} trail={} -> CAGR={}% MaxDD={}%",
                    buf, trail, metrics.cagr, metrics.max_dd
                );
            }
            CellOutcome::ParseMiss => {
                parse_misses += 1;
                pb.println(format!("⚠ no CAGR/MaxDD for buf={}, trail={}", buf, trail));
                warn!(
                    "no CAGR/MaxDD in engine output for buf={}, trail={}",
                    buf, trail
                );
            }
            CellOutcome::EngineFailure { detail } => {
                engine_failures += 1;
                pb.println(format!(
                    "⚠ engine failed for buf={}, trail={}: {}",
                    buf, trail, detail
                ));
                warn!("engine failed for buf={}, trail={}: {}", buf, trail, detail);
            }
        }
        pb.inc(1);
        pb.set_message(format!("{} rows", recorded));
    }

    pb.finish_with_message(format!("{} rows", recorded));
    println!();

    println!("{}", "=".repeat(70));
    println!("SWEEP COMPLETE");
    println!("{}", "=".repeat(70));
    println!("  Cells run:       {}", runner.config().grid.total());
    println!("  Rows written:    {}", recorded);
    println!("  Parse misses:    {}", parse_misses);
    println!("  Engine failures: {}", engine_failures);
    println!("  Report:          {}", runner.config().report_path.display());
    println!("{}", "=".repeat(70));

    info!(
        "Sweep completed: {} rows, {} parse misses, {} engine failures",
        recorded, parse_misses, engine_failures
    );

    Ok(())
}
