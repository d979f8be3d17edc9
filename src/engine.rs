//! External backtest engine invocation
//!
//! The engine is an opaque program driven entirely through command-line
//! arguments; each grid cell blocks on one run and captures its stdout.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

const STDERR_TAIL_LINES: usize = 5;

/// Engine-level failures, kept distinct from metric parse misses
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch backtest engine '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backtest engine {status}: {stderr_tail}")]
    Exit {
        status: ExitStatus,
        stderr_tail: String,
    },
}

/// Handle on the external backtest program
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    program: PathBuf,
    max_positions: u32,
}

impl BacktestEngine {
    pub fn new(program: impl Into<PathBuf>, max_positions: u32) -> Self {
        BacktestEngine {
            program: program.into(),
            max_positions,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run one backtest to completion and capture its stdout. The engine
    /// reports metrics on stdout; stderr is only kept for failure diagnostics.
    pub fn run(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        universe: &Path,
        config: &Path,
    ) -> Result<String, EngineError> {
        let output = Command::new(&self.program)
            .arg("--start")
            .arg(start.format("%Y-%m-%d").to_string())
            .arg("--end")
            .arg(end.format("%Y-%m-%d").to_string())
            .arg("--universe")
            .arg(universe)
            .arg("--max-pos")
            .arg(self.max_positions.to_string())
            .arg("--config")
            .arg(config)
            .output()
            .map_err(|source| EngineError::Launch {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::Exit {
                status: output.status,
                stderr_tail: stderr_tail(&output.stderr),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Last few stderr lines, enough to identify a failure without flooding logs
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}
