//! Metric extraction from engine output
//!
//! The engine reports a human-readable summary; the only interchange with it
//! is scraping `CAGR: <n>%, Max Drawdown: <n>%` out of the captured text.
//! Captured numbers stay as the exact matched text so the report reproduces
//! the engine's own formatting.

use regex::Regex;

const METRICS_PATTERN: &str = r"CAGR:\s*([-0-9.]+)%,\s*Max Drawdown:\s*([-0-9.]+)%";

/// One scraped observation from a backtest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetrics {
    pub cagr: String,
    pub max_dd: String,
}

/// Compiled extraction pattern, handed to the runner as a value
#[derive(Debug, Clone)]
pub struct MetricsParser {
    re: Regex,
}

impl MetricsParser {
    pub fn new() -> Self {
        MetricsParser {
            re: Regex::new(METRICS_PATTERN).expect("metrics pattern is valid"),
        }
    }

    /// First match wins; `None` when the output carries no metrics line
    pub fn parse(&self, output: &str) -> Option<RunMetrics> {
        self.re.captures(output).map(|caps| RunMetrics {
            cagr: caps[1].to_string(),
            max_dd: caps[2].to_string(),
        })
    }
}

impl Default for MetricsParser {
    fn default() -> Self {
        Self::new()
    }
}
