//! Position signal sequence produced by a strategy.

use chrono::NaiveDate;
use std::fmt;

/// Directional decision for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signal {
    Short,
    #[default]
    Flat,
    Long,
}

impl Signal {
    pub fn value(self) -> f64 {
        match self {
            Signal::Short => -1.0,
            Signal::Flat => 0.0,
            Signal::Long => 1.0,
        }
    }

    /// Sign of `x`; zero and NaN map to flat.
    pub fn from_sign(x: f64) -> Self {
        if x > 0.0 {
            Signal::Long
        } else if x < 0.0 {
            Signal::Short
        } else {
            Signal::Flat
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalSeries {
    pub points: Vec<SignalPoint>,
}

impl SignalSeries {
    pub fn new(dates: &[NaiveDate], signals: &[Signal]) -> Self {
        let points = dates
            .iter()
            .zip(signals)
            .map(|(&date, &signal)| SignalPoint { date, signal })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.points.iter().map(|p| p.signal).collect()
    }

    /// Copy with every short replaced by flat.
    pub fn without_shorts(&self) -> Self {
        let points = self
            .points
            .iter()
            .map(|p| SignalPoint {
                date: p.date,
                signal: if p.signal == Signal::Short {
                    Signal::Flat
                } else {
                    p.signal
                },
            })
            .collect();
        Self { points }
    }
}
