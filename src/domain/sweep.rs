//! Parameter sweep: evaluate many configurations against one price series.
//!
//! Each configuration runs signal generation, simulation and metrics on its
//! own; nothing is shared between runs, so they are evaluated in parallel.
//! A configuration that fails validation yields an all-indeterminate record
//! instead of aborting the sweep.

use rayon::prelude::*;
use std::fmt;

use super::backtest::simulate;
use super::error::SigsweepError;
use super::metrics::{Metrics, compute_metrics};
use super::price_series::PriceSeries;
use super::strategy::{StrategyConfig, generate_signals};
use super::trajectory::Trajectory;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    pub strategy: StrategyConfig,
    pub allow_shorting: bool,
}

impl fmt::Display for SweepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} shorting={}", self.strategy, self.allow_shorting)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSettings {
    pub initial_capital: f64,
    pub risk_free_rate: f64,
}

#[derive(Debug, Clone)]
pub struct SweepResult {
    pub config: SweepConfig,
    pub metrics: Metrics,
    pub trajectory: Option<Trajectory>,
    pub error: Option<String>,
}

/// Signal generation, simulation and metrics for one configuration.
pub fn evaluate(
    prices: &PriceSeries,
    config: &SweepConfig,
    settings: &SweepSettings,
) -> Result<(Trajectory, Metrics), SigsweepError> {
    let signals = generate_signals(&config.strategy, prices)?;
    let trajectory = simulate(
        prices,
        &signals,
        settings.initial_capital,
        config.allow_shorting,
    )?;
    let metrics = compute_metrics(&trajectory, settings.risk_free_rate);
    Ok((trajectory, metrics))
}

/// Like [`evaluate`], but a validation error becomes an indeterminate result.
pub fn run_configuration(
    prices: &PriceSeries,
    config: &SweepConfig,
    settings: &SweepSettings,
) -> Result<SweepResult, SigsweepError> {
    match evaluate(prices, config, settings) {
        Ok((trajectory, metrics)) => {
            tracing::info!(
                config = %config,
                sharpe = %metrics.sharpe_ratio,
                cagr = %metrics.cagr.format_percent(),
                max_drawdown = %metrics.max_drawdown.format_percent(),
                "configuration evaluated"
            );
            Ok(SweepResult {
                config: *config,
                metrics,
                trajectory: Some(trajectory),
                error: None,
            })
        }
        Err(e) if e.is_validation() => {
            tracing::warn!(config = %config, error = %e, "configuration skipped");
            Ok(SweepResult {
                config: *config,
                metrics: Metrics::indeterminate(),
                trajectory: None,
                error: Some(e.to_string()),
            })
        }
        Err(e) => Err(e),
    }
}

/// Evaluate every configuration; results keep the input order.
pub fn run_sweep(
    prices: &PriceSeries,
    configs: &[SweepConfig],
    settings: &SweepSettings,
) -> Result<Vec<SweepResult>, SigsweepError> {
    tracing::info!(configurations = configs.len(), "starting sweep");
    configs
        .par_iter()
        .map(|config| run_configuration(prices, config, settings))
        .collect()
}

/// Sort best Sharpe first; indeterminate values go last, ties keep their order.
pub fn rank_by_sharpe(results: &mut [SweepResult]) {
    results.sort_by(|a, b| a.metrics.sharpe_ratio.cmp_descending(&b.metrics.sharpe_ratio));
}

/// Highest determinate Sharpe; the earliest result wins a tie.
pub fn best_by_sharpe(results: &[SweepResult]) -> Option<&SweepResult> {
    let mut best: Option<(&SweepResult, f64)> = None;
    for result in results.iter().filter(|r| r.trajectory.is_some()) {
        let Some(sharpe) = result.metrics.sharpe_ratio.value() else {
            continue;
        };
        if best.is_none_or(|(_, top)| sharpe > top) {
            best = Some((result, sharpe));
        }
    }
    best.map(|(result, _)| result)
}
