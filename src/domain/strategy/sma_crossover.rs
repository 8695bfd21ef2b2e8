//! Short/long simple moving average crossover.
//!
//! A crossover at t compares the averages at t-1 against t-2: short moving
//! above long enters long, moving below enters short. Until the next crossover
//! the previous signal is held, starting flat. A date where only one side of
//! the comparison at t-2 is defined counts as "not already above/below", so the
//! first ordered pair after warm-up is itself a crossover.
//!
//! After holding, a held long flattens on any date where the unlagged short
//! average is below the long one, and a held short flattens where it is above.

use std::cmp::Ordering;

use super::SmaCrossoverParams;
use crate::domain::indicator::sma::simple_moving_average;
use crate::domain::signal::Signal;

pub fn sma_crossover_signals(closes: &[f64], params: &SmaCrossoverParams) -> Vec<Signal> {
    let short = simple_moving_average(closes, params.short_window);
    let long = simple_moving_average(closes, params.long_window);
    let relation: Vec<Option<Ordering>> = short
        .iter()
        .zip(&long)
        .map(|pair| match pair {
            (Some(s), Some(l)) => s.partial_cmp(l),
            _ => None,
        })
        .collect();

    let held = hold_crossovers(&relation);

    let mut long_checked = held.clone();
    for t in 1..held.len() {
        if held[t - 1] == Signal::Long && relation[t] == Some(Ordering::Less) {
            long_checked[t] = Signal::Flat;
        }
    }

    let mut signals = long_checked.clone();
    for t in 1..long_checked.len() {
        if long_checked[t - 1] == Signal::Short && relation[t] == Some(Ordering::Greater) {
            signals[t] = Signal::Flat;
        }
    }
    signals
}

fn hold_crossovers(relation: &[Option<Ordering>]) -> Vec<Signal> {
    let mut held = Signal::Flat;
    (0..relation.len())
        .map(|t| {
            if t >= 1 {
                let prev = relation[t - 1];
                let before = if t >= 2 { relation[t - 2] } else { None };
                if prev == Some(Ordering::Greater) && before != Some(Ordering::Greater) {
                    held = Signal::Long;
                } else if prev == Some(Ordering::Less) && before != Some(Ordering::Less) {
                    held = Signal::Short;
                }
            }
            held
        })
        .collect()
}
