//! Breakout strategy parameter sweep
//!
//! Drives an external backtesting engine across a grid of breakout-buffer
//! and trailing-stop parameters, scraping CAGR / Max Drawdown from its
//! output into an append-only CSV report.

pub mod config;
pub mod engine;
pub mod grid;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod universe;

pub use grid::ParamGrid;
pub use metrics::{MetricsParser, RunMetrics};
pub use report::{RunResult, SweepReport};
pub use runner::{CellOutcome, SweepConfig, SweepRunner, SweepSummary};
