//! Render command implementation
//!
//! Writes a one-off patched copy of the base config, outside any sweep.

use anyhow::{Context, Result};
use breakout_sweep::config::{render_overrides, ATR_PCT_KEY, BREAKOUT_BUF_KEY, TRAIL_MULT_KEY};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

pub fn run(buf: f64, trail: f64, atr_pct: Option<f64>, base: PathBuf, out: PathBuf) -> Result<()> {
    let contents = fs::read_to_string(&base)
        .with_context(|| format!("Failed to read base config {}", base.display()))?;

    let mut overrides = vec![(BREAKOUT_BUF_KEY, buf), (TRAIL_MULT_KEY, trail)];
    if let Some(atr_pct) = atr_pct {
        overrides.push((ATR_PCT_KEY, atr_pct));
    }

    let rendered = render_overrides(&contents, &overrides);
    for key in &rendered.missing {
        warn!(
            "key '{}' not found in {}; output keeps the base value",
            key,
            base.display()
        );
    }

    fs::write(&out, rendered.text)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    info!("Wrote {}", out.display());
    Ok(())
}
