//! Vectorised single-instrument simulator.
//!
//! The position held during date t comes from the signal of date t-1, so a
//! decision taken at the close of day d earns returns from day d+1 onward.
//! Shorting policy is enforced here and nowhere else.

use std::collections::BTreeMap;

use super::error::SigsweepError;
use super::price_series::PriceSeries;
use super::signal::{Signal, SignalSeries};
use super::trajectory::{Trajectory, TrajectoryPoint};

/// Exposure for a signal under the shorting policy.
pub fn position_for(signal: Signal, allow_shorting: bool) -> f64 {
    match signal {
        Signal::Long => 1.0,
        Signal::Short if allow_shorting => -1.0,
        _ => 0.0,
    }
}

pub fn simulate(
    prices: &PriceSeries,
    signals: &SignalSeries,
    initial_capital: f64,
    allow_shorting: bool,
) -> Result<Trajectory, SigsweepError> {
    if prices.is_empty() {
        return Err(SigsweepError::EmptyPriceSeries);
    }
    if signals.is_empty() {
        return Err(SigsweepError::EmptySignals);
    }

    let by_date: BTreeMap<_, _> = signals.points.iter().map(|p| (p.date, p.signal)).collect();
    let aligned: Vec<(chrono::NaiveDate, f64, Signal)> = prices
        .points()
        .iter()
        .filter_map(|p| by_date.get(&p.date).map(|&s| (p.date, p.adj_close, s)))
        .collect();
    if aligned.is_empty() {
        return Err(SigsweepError::NoOverlap);
    }

    let mut points = Vec::with_capacity(aligned.len());
    let mut cumulative_market = 1.0;
    let mut cumulative_strategy = 1.0;
    for (i, &(date, price, signal)) in aligned.iter().enumerate() {
        let (market_return, position) = if i == 0 {
            (0.0, 0.0)
        } else {
            let (_, prev_price, prev_signal) = aligned[i - 1];
            let r = price / prev_price - 1.0;
            (
                if r.is_finite() { r } else { 0.0 },
                position_for(prev_signal, allow_shorting),
            )
        };
        let strategy_return = position * market_return;

        cumulative_market *= 1.0 + market_return;
        cumulative_strategy *= 1.0 + strategy_return;

        points.push(TrajectoryPoint {
            date,
            price,
            signal,
            position,
            market_return,
            strategy_return,
            cumulative_market,
            cumulative_strategy,
            equity: initial_capital * cumulative_strategy,
        });
    }

    let first_valid = points
        .iter()
        .position(|p| p.strategy_return.is_finite())
        .ok_or(SigsweepError::NoValidReturns)?;
    points.drain(..first_valid);

    let trajectory = Trajectory {
        initial_capital,
        points,
    };
    tracing::debug!(
        dates = trajectory.points.len(),
        final_equity = ?trajectory.final_equity(),
        "simulation complete"
    );
    Ok(trajectory)
}
