//! Simulated portfolio trajectory and equity tracking.

use chrono::NaiveDate;

use super::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// One simulated date. `position` is the exposure held during `date`,
/// derived from the previous date's signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub signal: Signal,
    pub position: f64,
    pub market_return: f64,
    pub strategy_return: f64,
    pub cumulative_market: f64,
    pub cumulative_strategy: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub initial_capital: f64,
    pub points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn equity_curve(&self) -> Vec<EquityPoint> {
        self.points
            .iter()
            .map(|p| EquityPoint {
                date: p.date,
                equity: p.equity,
            })
            .collect()
    }

    /// Buy-and-hold equity from the same starting capital.
    pub fn benchmark_curve(&self) -> Vec<EquityPoint> {
        self.points
            .iter()
            .map(|p| EquityPoint {
                date: p.date,
                equity: self.initial_capital * p.cumulative_market,
            })
            .collect()
    }

    pub fn strategy_returns(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.strategy_return).collect()
    }

    pub fn positions(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.position).collect()
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.points.last().map(|p| p.equity)
    }
}
