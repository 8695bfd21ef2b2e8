//! Mean reversion on a rolling z-score.
//!
//! z[t] = (C[t] - MEAN(n)[t]) / STDDEV(n)[t], where the rolling statistics
//! accept a partial window of at least 80% of n and a zero deviation is
//! undefined. Rules see z lagged by one period.
//!
//! Each day starts flat, then:
//! - z < -entry_z enters long, z > entry_z enters short
//! - yesterday long and z > -exit_z flattens
//! - yesterday short and z < exit_z flattens
//!
//! "Yesterday" is the final signal of the previous day, so the sequence is a
//! one-step recurrence and must be evaluated in date order.

use super::MeanReversionParams;
use crate::domain::indicator::lag;
use crate::domain::indicator::stddev::{rolling_mean, rolling_stddev};
use crate::domain::signal::Signal;

const MIN_PERIODS_FRACTION: f64 = 0.8;

pub fn mean_reversion_signals(closes: &[f64], params: &MeanReversionParams) -> Vec<Signal> {
    let lagged = lag(&z_scores(closes, params.window), 1);

    let mut signals = Vec::with_capacity(closes.len());
    let mut previous = Signal::Flat;
    for z in lagged {
        let signal = match z {
            Some(z) => next_signal(previous, z, params),
            None => Signal::Flat,
        };
        signals.push(signal);
        previous = signal;
    }
    signals
}

fn next_signal(previous: Signal, z: f64, params: &MeanReversionParams) -> Signal {
    let mut signal = Signal::Flat;
    if z < -params.entry_z {
        signal = Signal::Long;
    }
    if z > params.entry_z {
        signal = Signal::Short;
    }
    if previous == Signal::Long && z > -params.exit_z {
        signal = Signal::Flat;
    }
    if previous == Signal::Short && z < params.exit_z {
        signal = Signal::Flat;
    }
    signal
}

/// Unlagged z-score per date.
pub fn z_scores(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let min_periods = (window as f64 * MIN_PERIODS_FRACTION) as usize;
    let means = rolling_mean(closes, window, min_periods);
    let stddevs = rolling_stddev(closes, window, min_periods);

    closes
        .iter()
        .zip(means.iter().zip(&stddevs))
        .map(|(&close, pair)| match pair {
            (Some(mean), Some(sd)) if *sd != 0.0 => Some((close - mean) / sd),
            _ => None,
        })
        .collect()
}
