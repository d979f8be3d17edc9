//! Breakout sweep - main entry point
//!
//! This binary provides three subcommands:
//! - sweep: Run the parameter grid sweep against the backtest engine
//! - render: Write a single patched copy of the base config
//! - check: Pre-flight validation of the universe file and base config

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "breakout-sweep")]
#[command(about = "Parameter grid sweep for breakout strategy backtests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the parameter grid sweep
    Sweep {
        /// Backtest start date (YYYY-MM-DD)
        #[arg(long, default_value = "2023-01-01")]
        start: String,

        /// Backtest end date (YYYY-MM-DD)
        #[arg(long, default_value = "2024-12-31")]
        end: String,

        /// Symbol universe file, passed through to the engine unmodified
        #[arg(long, default_value = "./data/symbols_nifty500_clean.csv")]
        universe: PathBuf,

        /// Base configuration file
        #[arg(short, long, default_value = "./backtest/config.yaml")]
        config: PathBuf,

        /// Breakout ATR buffer values (comma-separated). E.g., "0.25,0.30"
        #[arg(long)]
        buffers: Option<String>,

        /// Trailing-stop ATR multipliers (comma-separated). E.g., "0.90,1.30"
        #[arg(long)]
        trails: Option<String>,

        /// Backtest engine program
        #[arg(long, default_value = "./backtest/run_backtest")]
        engine: PathBuf,

        /// Maximum concurrent positions passed to the engine
        #[arg(long, default_value = "3")]
        max_pos: u32,

        /// Results report path
        #[arg(short, long, default_value = "results.csv")]
        out: PathBuf,
    },

    /// Write a single patched copy of the base config
    Render {
        /// Breakout ATR buffer
        #[arg(long)]
        buf: f64,

        /// Trailing-stop ATR multiplier
        #[arg(long)]
        trail: f64,

        /// ATR percentage cap (left untouched when omitted)
        #[arg(long)]
        atr_pct: Option<f64>,

        /// Base configuration file
        #[arg(long, default_value = "./backtest/config.yaml")]
        base: PathBuf,

        /// Output path
        #[arg(long, default_value = "./backtest/config_tmp.yaml")]
        out: PathBuf,
    },

    /// Validate the universe file and base config before a sweep
    Check {
        /// Symbol universe file
        #[arg(long, default_value = "./data/symbols_nifty500_clean.csv")]
        universe: PathBuf,

        /// Base configuration file
        #[arg(short, long, default_value = "./backtest/config.yaml")]
        config: PathBuf,

        /// Also write a smoke list with the first 30 symbols
        #[arg(long)]
        smoke: bool,
    },
}

fn setup_logging(verbose: bool, command_name: &str, file_only: bool) -> Result<()> {
    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // Log file naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // File appender
    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    if file_only {
        // For the sweep: only log to file, keep console clean for progress bar
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    } else {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(true);

        // File layer - same format but without ANSI colors
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // File-only logging for the sweep keeps the progress bar readable
    let (command_name, file_only) = match &cli.command {
        Commands::Sweep { .. } => ("sweep", true),
        Commands::Render { .. } => ("render", false),
        Commands::Check { .. } => ("check", false),
    };

    setup_logging(cli.verbose, command_name, file_only)?;

    match cli.command {
        Commands::Sweep {
            start,
            end,
            universe,
            config,
            buffers,
            trails,
            engine,
            max_pos,
            out,
        } => commands::sweep::run(
            start, end, universe, config, buffers, trails, engine, max_pos, out,
        ),

        Commands::Render {
            buf,
            trail,
            atr_pct,
            base,
            out,
        } => commands::render::run(buf, trail, atr_pct, base, out),

        Commands::Check {
            universe,
            config,
            smoke,
        } => commands::check::run(universe, config, smoke),
    }
}
