#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use sigsweep::domain::error::SigsweepError;
use sigsweep::domain::price_series::{PricePoint, PriceSeries};
use sigsweep::domain::signal::{Signal, SignalSeries};
use sigsweep::domain::sweep::SweepResult;
use sigsweep::ports::data_port::DataPort;
use sigsweep::ports::report_port::ReportPort;
use std::cell::RefCell;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days starting 2024-01-01.
pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + Duration::days(i as i64)
}

pub fn series(closes: &[f64]) -> PriceSeries {
    let pairs: Vec<_> = closes.iter().enumerate().map(|(i, &c)| (day(i), c)).collect();
    PriceSeries::from_pairs(&pairs).unwrap()
}

pub fn signals(values: &[Signal]) -> SignalSeries {
    let dates: Vec<_> = (0..values.len()).map(day).collect();
    SignalSeries::new(&dates, values)
}

pub fn signal_from_int(v: i8) -> Signal {
    match v {
        v if v < 0 => Signal::Short,
        0 => Signal::Flat,
        _ => Signal::Long,
    }
}

/// Trending series with a deterministic wobble, long enough for every grid window.
pub fn wavy_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            100.0 + 0.2 * x + 5.0 * (x * 0.15).sin() + 2.0 * (x * 0.9).cos()
        })
        .collect()
}

pub fn price_csv(closes: &[f64]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for (i, close) in closes.iter().enumerate() {
        out.push_str(&format!(
            "{},{c},{c},{c},{c},{c},1000\n",
            day(i),
            c = close
        ));
    }
    out
}

pub struct MockDataPort {
    pub points: Vec<PricePoint>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(closes: &[f64]) -> Self {
        Self {
            points: series(closes).points().to_vec(),
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            points: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, SigsweepError> {
        if let Some(reason) = &self.error {
            return Err(SigsweepError::DataSource {
                reason: reason.clone(),
            });
        }
        let points = self
            .points
            .iter()
            .filter(|p| start_date.is_none_or(|s| p.date >= s))
            .filter(|p| end_date.is_none_or(|e| p.date <= e))
            .copied()
            .collect();
        PriceSeries::new(points)
    }
}

/// Records what the pipeline asked to persist.
#[derive(Default)]
pub struct RecordingReportPort {
    pub rows: RefCell<Vec<SweepResult>>,
    pub charts: RefCell<Vec<String>>,
}

impl ReportPort for RecordingReportPort {
    fn write_results(&self, results: &[SweepResult]) -> Result<(), SigsweepError> {
        self.rows.borrow_mut().extend_from_slice(results);
        Ok(())
    }

    fn write_best_chart(&self, best: &SweepResult) -> Result<(), SigsweepError> {
        self.charts.borrow_mut().push(best.config.to_string());
        Ok(())
    }
}
