//! Check command implementation
//!
//! Pre-flight validation: the universe file and the base config are the two
//! inputs a sweep depends on silently, so look at both before a long run.

use anyhow::{Context, Result};
use breakout_sweep::config::{has_key, BREAKOUT_BUF_KEY, TRAIL_MULT_KEY};
use breakout_sweep::universe;
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub fn run(universe_path: PathBuf, config: PathBuf, smoke: bool) -> Result<()> {
    info!("Checking sweep inputs");

    let summary = universe::inspect(&universe_path)?;
    if summary.symbols.is_empty() {
        anyhow::bail!("Universe {} is empty", universe_path.display());
    }

    println!("OK: universe file -> {}", summary.path.display());
    println!("Universe size: {}", summary.symbols.len());
    println!("Head:");
    for symbol in summary.head() {
        println!("  {}", symbol);
    }

    let contents = fs::read_to_string(&config)
        .with_context(|| format!("Failed to read base config {}", config.display()))?;

    let mut missing = Vec::new();
    for key in [BREAKOUT_BUF_KEY, TRAIL_MULT_KEY] {
        if has_key(&contents, key) {
            println!("OK: config key '{}' present", key);
        } else {
            missing.push(key);
        }
    }
    for key in &missing {
        println!(
            "WARN: config key '{}' missing from {}; a sweep would not override it",
            key,
            config.display()
        );
    }

    if smoke {
        let out = summary
            .path
            .parent()
            .map(|dir| dir.join("smoke30.csv"))
            .unwrap_or_else(|| PathBuf::from("smoke30.csv"));
        if out.exists() {
            println!("Found existing {} (not overwritten)", out.display());
        } else {
            universe::write_smoke(&summary, &out)?;
            println!(
                "Wrote smoke list {} ({} symbols)",
                out.display(),
                summary.symbols.len().min(universe::SMOKE_LEN)
            );
        }
    }

    if missing.is_empty() {
        info!("Check passed");
    } else {
        info!("Check passed with warnings");
    }

    Ok(())
}
