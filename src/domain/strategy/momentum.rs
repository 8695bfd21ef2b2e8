//! Momentum: sign of the `window`-period rate of change, lagged one period.
//!
//! signal[t] = sign(C[t-1] / C[t-1-n] - 1); undefined or zero change is flat.

use super::MomentumParams;
use crate::domain::indicator::{lag, roc::percent_change};
use crate::domain::signal::Signal;

pub fn momentum_signals(closes: &[f64], params: &MomentumParams) -> Vec<Signal> {
    let change = percent_change(closes, params.window);
    lag(&change, 1)
        .into_iter()
        .map(|m| m.map_or(Signal::Flat, Signal::from_sign))
        .collect()
}
