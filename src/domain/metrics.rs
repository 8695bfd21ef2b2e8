//! Performance metrics and statistics.
//!
//! Ratios annualise daily observations over 252 trading days; CAGR uses
//! calendar time (365.25 days per year). Degenerate inputs never fail: they
//! produce [`MetricValue::Indeterminate`] or [`MetricValue::Infinite`].

use std::cmp::Ordering;
use std::fmt;

use super::indicator::stddev::sample_stddev;
use super::trajectory::{EquityPoint, Trajectory};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Result of a statistic that may be undefined or unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Defined(f64),
    /// Unbounded above, e.g. a Sortino ratio with no downside.
    Infinite,
    Indeterminate,
}

impl MetricValue {
    /// NaN and negative infinity are indeterminate, positive infinity is infinite.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() || value == f64::NEG_INFINITY {
            MetricValue::Indeterminate
        } else if value == f64::INFINITY {
            MetricValue::Infinite
        } else {
            MetricValue::Defined(value)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            MetricValue::Defined(v) => Some(v),
            _ => None,
        }
    }

    /// Ordering for "best first" ranking: infinite, then defined values from
    /// high to low, then indeterminate.
    pub fn cmp_descending(&self, other: &Self) -> Ordering {
        use MetricValue::*;
        match (self, other) {
            (Infinite, Infinite) | (Indeterminate, Indeterminate) => Ordering::Equal,
            (Infinite, _) | (_, Indeterminate) => Ordering::Less,
            (_, Infinite) | (Indeterminate, _) => Ordering::Greater,
            (Defined(a), Defined(b)) => b.total_cmp(a),
        }
    }

    /// Percentage with two decimals.
    pub fn format_percent(self) -> String {
        match self {
            MetricValue::Defined(v) => format!("{:.2}%", v * 100.0),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Defined(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            MetricValue::Infinite => write!(f, "inf"),
            MetricValue::Indeterminate => write!(f, "NaN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub cagr: MetricValue,
    pub sharpe_ratio: MetricValue,
    pub sortino_ratio: MetricValue,
    pub max_drawdown: MetricValue,
    pub calmar_ratio: MetricValue,
    pub cumulative_return: MetricValue,
    pub annualized_volatility: MetricValue,
    pub total_trades: MetricValue,
}

impl Metrics {
    pub const LABELS: [&'static str; 8] = [
        "CAGR",
        "Annualized Sharpe Ratio",
        "Annualized Sortino Ratio",
        "Max Drawdown",
        "Calmar Ratio",
        "Cumulative Return",
        "Annualized Volatility",
        "Total Trades",
    ];

    pub fn compute(trajectory: &Trajectory, risk_free_rate: f64) -> Self {
        if trajectory.is_empty() {
            tracing::warn!("cannot compute metrics on an empty trajectory");
            return Self::indeterminate();
        }

        let equity_curve = trajectory.equity_curve();
        let returns = trajectory.strategy_returns();

        let cagr = cagr(&equity_curve);
        let max_drawdown = max_drawdown(&equity_curve);

        Metrics {
            cagr,
            sharpe_ratio: sharpe_ratio(&returns, risk_free_rate),
            sortino_ratio: sortino_ratio(&returns, risk_free_rate),
            max_drawdown,
            calmar_ratio: calmar_ratio(cagr, max_drawdown),
            cumulative_return: cumulative_return(&equity_curve),
            annualized_volatility: annualized_volatility(&returns),
            total_trades: total_trades(&trajectory.positions()),
        }
    }

    /// Record for a configuration that could not be evaluated.
    pub fn indeterminate() -> Self {
        Metrics {
            cagr: MetricValue::Indeterminate,
            sharpe_ratio: MetricValue::Indeterminate,
            sortino_ratio: MetricValue::Indeterminate,
            max_drawdown: MetricValue::Indeterminate,
            calmar_ratio: MetricValue::Indeterminate,
            cumulative_return: MetricValue::Indeterminate,
            annualized_volatility: MetricValue::Indeterminate,
            total_trades: MetricValue::Indeterminate,
        }
    }

    /// Named values in [`Metrics::LABELS`] order.
    pub fn entries(&self) -> [(&'static str, MetricValue); 8] {
        let [cagr, sharpe, sortino, drawdown, calmar, cumulative, volatility, trades] =
            Self::LABELS;
        [
            (cagr, self.cagr),
            (sharpe, self.sharpe_ratio),
            (sortino, self.sortino_ratio),
            (drawdown, self.max_drawdown),
            (calmar, self.calmar_ratio),
            (cumulative, self.cumulative_return),
            (volatility, self.annualized_volatility),
            (trades, self.total_trades),
        ]
    }
}

pub fn compute_metrics(trajectory: &Trajectory, risk_free_rate: f64) -> Metrics {
    Metrics::compute(trajectory, risk_free_rate)
}

pub fn cagr(equity_curve: &[EquityPoint]) -> MetricValue {
    let (first, last) = match (equity_curve.first(), equity_curve.last()) {
        (Some(first), Some(last)) if equity_curve.len() >= 2 => (first, last),
        _ => return MetricValue::Indeterminate,
    };
    if first.equity <= 0.0 {
        return MetricValue::Indeterminate;
    }
    let years = (last.date - first.date).num_days() as f64 / DAYS_PER_YEAR;
    if years <= 0.0 {
        return MetricValue::Indeterminate;
    }
    let growth = last.equity.signum() * (last.equity / first.equity).abs();
    // a negative base with a fractional exponent yields NaN
    MetricValue::from_f64(growth.powf(1.0 / years) - 1.0)
}

pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> MetricValue {
    let excess = excess_returns(returns, risk_free_rate);
    if excess.len() < 2 {
        return MetricValue::Indeterminate;
    }
    match sample_stddev(&excess) {
        Some(sd) if sd > 0.0 && sd.is_finite() => {
            MetricValue::from_f64(mean(&excess) / sd * TRADING_DAYS_PER_YEAR.sqrt())
        }
        _ => MetricValue::Indeterminate,
    }
}

pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> MetricValue {
    let excess = excess_returns(returns, risk_free_rate);
    if excess.len() < 2 {
        return MetricValue::Indeterminate;
    }
    let mean_excess = mean(&excess);
    let downside: Vec<f64> = excess.iter().copied().filter(|&r| r < 0.0).collect();

    match sample_stddev(&downside) {
        Some(dd) if dd > 0.0 && dd.is_finite() => {
            MetricValue::from_f64(mean_excess / dd * TRADING_DAYS_PER_YEAR.sqrt())
        }
        _ if mean_excess > 0.0 => MetricValue::Infinite,
        _ => MetricValue::Indeterminate,
    }
}

/// Most negative peak-to-trough decline of the normalised curve, in [-1, 0].
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> MetricValue {
    if equity_curve.len() < 2 {
        return MetricValue::Indeterminate;
    }
    if let Some(bad) = equity_curve.iter().find(|p| p.equity <= 0.0) {
        tracing::warn!(
            date = %bad.date,
            equity = bad.equity,
            "non-positive equity, max drawdown is not computable"
        );
        return MetricValue::Indeterminate;
    }

    let base = equity_curve[0].equity;
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for point in equity_curve {
        let value = point.equity / base;
        peak = peak.max(value);
        worst = worst.min((value - peak) / peak);
    }
    MetricValue::from_f64(worst)
}

pub fn calmar_ratio(cagr: MetricValue, max_drawdown: MetricValue) -> MetricValue {
    match (cagr, max_drawdown) {
        (MetricValue::Defined(c), MetricValue::Defined(dd)) if dd != 0.0 => {
            MetricValue::from_f64(c / dd.abs())
        }
        _ => MetricValue::Indeterminate,
    }
}

pub fn cumulative_return(equity_curve: &[EquityPoint]) -> MetricValue {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(first), Some(last)) if first.equity != 0.0 => {
            MetricValue::from_f64(last.equity / first.equity - 1.0)
        }
        _ => MetricValue::Indeterminate,
    }
}

pub fn annualized_volatility(returns: &[f64]) -> MetricValue {
    let finite: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
    match sample_stddev(&finite) {
        Some(sd) => MetricValue::from_f64(sd * TRADING_DAYS_PER_YEAR.sqrt()),
        None => MetricValue::Indeterminate,
    }
}

/// Units of exposure opened or closed, halved so a round trip counts once.
/// The trajectory is treated as starting and ending flat: a position open on
/// the first date is counted as opened, one still open on the last date as
/// closed at the final mark.
pub fn total_trades(positions: &[f64]) -> MetricValue {
    let (first, last) = match (positions.first(), positions.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return MetricValue::Defined(0.0),
    };
    let changes: f64 = positions.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    MetricValue::from_f64((first.abs() + changes + last.abs()) / 2.0)
}

fn excess_returns(returns: &[f64], risk_free_rate: f64) -> Vec<f64> {
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    returns
        .iter()
        .filter(|r| r.is_finite())
        .map(|r| r - daily_rf)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
