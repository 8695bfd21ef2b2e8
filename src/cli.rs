//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvAdapter, CsvReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart;
use crate::domain::config_validation::{
    BACKTEST, parse_date_range, validate_backtest_config, validate_run_settings,
    validate_sweep_config,
};
use crate::domain::error::SigsweepError;
use crate::domain::metrics::{MetricValue, Metrics};
use crate::domain::strategy::StrategyConfig;
use crate::domain::sweep::{
    SweepConfig, SweepResult, SweepSettings, best_by_sharpe, evaluate, rank_by_sharpe, run_sweep,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "sigsweep",
    about = "Parameter sweeps over momentum, mean-reversion and SMA crossover signals"
)]
pub struct Cli {
    /// Log verbosity: trace, debug, info, warn or error
    #[arg(long, global = true, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every configuration of the [sweep] grid and rank by Sharpe ratio
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        /// Price CSV, overrides [backtest] data_path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Output directory, overrides [backtest] output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Rows in the printed ranking
        #[arg(long)]
        top: Option<usize>,
    },
    /// Backtest a single configuration
    Run {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long, value_enum)]
        strategy: StrategyArg,
        /// Momentum or mean-reversion lookback
        #[arg(long, default_value_t = 20)]
        window: usize,
        #[arg(long, default_value_t = 1.5)]
        entry_z: f64,
        #[arg(long, default_value_t = 0.5)]
        exit_z: f64,
        #[arg(long, default_value_t = 20)]
        short_window: usize,
        #[arg(long, default_value_t = 50)]
        long_window: usize,
        #[arg(long)]
        allow_shorting: bool,
        #[arg(long, default_value_t = 100_000.0)]
        initial_capital: f64,
        #[arg(long, default_value_t = 0.02)]
        risk_free_rate: f64,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Write the equity chart to this SVG file
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Validate a sweep configuration and report the grid size
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Momentum,
    MeanReversion,
    SmaCrossover,
}

/// Resolved `[backtest]` settings for a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub data_path: PathBuf,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub output_dir: PathBuf,
    pub top: usize,
    pub sweep: SweepSettings,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Sweep {
            config,
            data,
            output,
            top,
        } => run_sweep_command(&config, data.as_ref(), output.as_ref(), top),
        Command::Run {
            data,
            strategy,
            window,
            entry_z,
            exit_z,
            short_window,
            long_window,
            allow_shorting,
            initial_capital,
            risk_free_rate,
            start_date,
            end_date,
            chart,
        } => {
            let strategy = match strategy {
                StrategyArg::Momentum => StrategyConfig::momentum(window),
                StrategyArg::MeanReversion => {
                    StrategyConfig::mean_reversion(window, entry_z, exit_z)
                }
                StrategyArg::SmaCrossover => StrategyConfig::sma_crossover(short_window, long_window),
            };
            let config = SweepConfig {
                strategy,
                allow_shorting,
            };
            let settings = SweepSettings {
                initial_capital,
                risk_free_rate,
            };
            let data_port = CsvAdapter::new(data);
            match run_single(
                &data_port,
                &config,
                &settings,
                (start_date, end_date),
                chart.as_deref(),
            ) {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e}");
                    (&e).into()
                }
            }
        }
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_run_settings(
    adapter: &dyn ConfigPort,
    data_override: Option<&PathBuf>,
    output_override: Option<&PathBuf>,
    top_override: Option<usize>,
) -> Result<RunSettings, SigsweepError> {
    let data_path = match data_override {
        Some(path) => path.clone(),
        None => adapter
            .get_string(BACKTEST, "data_path")
            .map(PathBuf::from)
            .ok_or_else(|| SigsweepError::ConfigMissing {
                section: BACKTEST.into(),
                key: "data_path".into(),
            })?,
    };
    let output_dir = output_override.cloned().unwrap_or_else(|| {
        adapter
            .get_string(BACKTEST, "output_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("backtest_results"))
    });
    let top = match top_override {
        Some(n) => n,
        None => usize::try_from(adapter.get_int(BACKTEST, "top", 5)).unwrap_or(5),
    };
    let (start_date, end_date) = parse_date_range(adapter)?;

    Ok(RunSettings {
        data_path,
        start_date,
        end_date,
        output_dir,
        top,
        sweep: SweepSettings {
            initial_capital: adapter.get_double(BACKTEST, "initial_capital", 100_000.0),
            risk_free_rate: adapter.get_double(BACKTEST, "risk_free_rate", 0.02),
        },
    })
}

fn run_sweep_command(
    config_path: &Path,
    data_override: Option<&PathBuf>,
    output_override: Option<&PathBuf>,
    top_override: Option<usize>,
) -> ExitCode {
    // Stage 1: Load config
    tracing::info!(file = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate both sections and build the grid
    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let grid = match validate_sweep_config(&adapter) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Resolve settings
    let settings = match build_run_settings(&adapter, data_override, output_override, top_override)
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = CsvAdapter::new(settings.data_path.clone());
    let report = CsvReportAdapter::new(settings.output_dir.clone());
    match run_sweep_pipeline(&data_port, &report, &grid, &settings) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load prices, evaluate the grid, print the ranking and persist the report.
/// Returns the results in ranked order.
pub fn run_sweep_pipeline(
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    grid: &[SweepConfig],
    settings: &RunSettings,
) -> Result<Vec<SweepResult>, SigsweepError> {
    // Stage 4: Load prices
    let prices = data_port.fetch_prices(settings.start_date, settings.end_date)?;
    tracing::info!(
        prices = prices.len(),
        first = %prices.first_date(),
        last = %prices.last_date(),
        "price history ready"
    );

    // Stage 5: Evaluate every configuration
    let mut results = run_sweep(&prices, grid, &settings.sweep)?;
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    tracing::info!(
        configurations = results.len(),
        failed,
        "sweep finished"
    );

    // Stage 6: Rank and print
    rank_by_sharpe(&mut results);
    print!("{}", format_ranking(&results, settings.top));

    // Stage 7: Persist results and chart the best configuration
    report.write_results(&results)?;
    match best_by_sharpe(&results) {
        Some(best) => {
            print!("{}", format_best(best));
            report.write_best_chart(best)?;
        }
        None => println!("\nNo successful backtest runs found to determine the best performance."),
    }
    Ok(results)
}

/// Check the settings, evaluate one configuration and print its metrics
/// record.
pub fn run_single(
    data_port: &dyn DataPort,
    config: &SweepConfig,
    settings: &SweepSettings,
    (start_date, end_date): (Option<NaiveDate>, Option<NaiveDate>),
    chart: Option<&Path>,
) -> Result<Metrics, SigsweepError> {
    validate_run_settings(settings, (start_date, end_date))?;
    let prices = data_port.fetch_prices(start_date, end_date)?;
    let (trajectory, metrics) = evaluate(&prices, config, settings)?;

    println!("{config}");
    print!("{}", format_metrics(&metrics));
    if let Some(equity) = trajectory.final_equity() {
        println!("  {:<26}{:.2}", "Final Equity:", equity);
    }

    if let Some(path) = chart {
        let title = format!("{} (Sharpe: {:.2})", config.strategy, metrics.sharpe_ratio);
        svg_chart::write_equity_chart(path, &trajectory, &title)?;
    }
    Ok(metrics)
}

fn run_validate(config_path: &Path) -> ExitCode {
    tracing::info!(file = %config_path.display(), "validating config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let grid = match validate_sweep_config(&adapter) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print!("{}", format_grid_summary(&grid));
    println!("Configuration is valid.");
    ExitCode::SUCCESS
}

/// Configuration count per strategy, in first-seen order.
pub fn format_grid_summary(grid: &[SweepConfig]) -> String {
    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    for config in grid {
        let name = config.strategy.name();
        match counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }
    let mut out = String::new();
    for (name, count) in &counts {
        let _ = writeln!(out, "{name:<16} {count} configurations");
    }
    let _ = writeln!(out, "{:<16} {} configurations", "total", grid.len());
    out
}

const PERCENT_LABELS: [&str; 4] = [
    "CAGR",
    "Max Drawdown",
    "Cumulative Return",
    "Annualized Volatility",
];

/// Percentages for return-like metrics, two decimals for ratios.
pub fn format_metric(label: &str, value: MetricValue) -> String {
    if PERCENT_LABELS.contains(&label) {
        value.format_percent()
    } else if label == "Total Trades" {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_metrics(metrics: &Metrics) -> String {
    let mut out = String::new();
    for (label, value) in metrics.entries() {
        let _ = writeln!(out, "  {:<26}{}", format!("{label}:"), format_metric(label, value));
    }
    out
}

/// Top `top` rows of already ranked results.
pub fn format_ranking(results: &[SweepResult], top: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n--- Top {} Results (Sorted by Sharpe Ratio) ---",
        top.min(results.len())
    );
    let _ = writeln!(
        out,
        "{:>4}  {:<44} {:>5} {:>9} {:>7} {:>8} {:>9} {:>7} {:>10} {:>9} {:>7}",
        "rank", "strategy", "short", "CAGR", "Sharpe", "Sortino", "MaxDD", "Calmar", "CumRet", "Vol", "Trades"
    );
    for (i, result) in results.iter().take(top).enumerate() {
        let m = &result.metrics;
        let _ = writeln!(
            out,
            "{:>4}  {:<44} {:>5} {:>9} {:>7} {:>8} {:>9} {:>7} {:>10} {:>9} {:>7}",
            i + 1,
            result.config.strategy.to_string(),
            result.config.allow_shorting,
            format_metric("CAGR", m.cagr),
            format_metric("Annualized Sharpe Ratio", m.sharpe_ratio),
            format_metric("Annualized Sortino Ratio", m.sortino_ratio),
            format_metric("Max Drawdown", m.max_drawdown),
            format_metric("Calmar Ratio", m.calmar_ratio),
            format_metric("Cumulative Return", m.cumulative_return),
            format_metric("Annualized Volatility", m.annualized_volatility),
            format_metric("Total Trades", m.total_trades),
        );
    }
    out
}

fn format_best(best: &SweepResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n--- Best Performing Combination (Sharpe = {:.3}) ---",
        best.metrics.sharpe_ratio
    );
    let _ = writeln!(out, "{}", best.config);
    out.push_str(&format_metrics(&best.metrics));
    out
}
