//! CSV adapters: price history input and sweep results output.
//!
//! Prices come from a daily history with a `Date` column and an `Adj Close`
//! column; other columns are ignored. Rows with a blank adjusted close are
//! skipped.

use crate::adapters::svg_chart;
use crate::domain::error::SigsweepError;
use crate::domain::metrics::Metrics;
use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::domain::strategy::StrategyConfig;
use crate::domain::sweep::SweepResult;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub const DATE_COLUMN: &str = "Date";
pub const ADJ_CLOSE_COLUMN: &str = "Adj Close";
pub const RESULTS_FILE: &str = "all_backtest_results.csv";

const PARAMETER_COLUMNS: [&str; 8] = [
    "strategy_type",
    "allow_shorting",
    "momentum_window",
    "mean_reversion_window",
    "mean_reversion_entry_z",
    "mean_reversion_exit_z",
    "sma_short_window",
    "sma_long_window",
];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, SigsweepError> {
        let content = fs::read_to_string(&self.path).map_err(|e| SigsweepError::DataSource {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut points = parse_prices(&content)?;
        points.retain(|p| {
            start_date.is_none_or(|start| p.date >= start) && end_date.is_none_or(|end| p.date <= end)
        });
        points.sort_by_key(|p| p.date);

        if points.is_empty() {
            return Err(SigsweepError::DataSource {
                reason: format!("no prices in {} for the requested range", self.path.display()),
            });
        }
        tracing::info!(
            file = %self.path.display(),
            rows = points.len(),
            first = %points[0].date,
            last = %points[points.len() - 1].date,
            "prices loaded"
        );
        PriceSeries::new(points)
    }
}

/// Parse CSV text into unsorted price points.
pub fn parse_prices(content: &str) -> Result<Vec<PricePoint>, SigsweepError> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr.headers().map_err(|e| SigsweepError::DataSource {
        reason: format!("CSV header error: {}", e),
    })?;
    let date_idx = column_index(headers, DATE_COLUMN)?;
    let close_idx = column_index(headers, ADJ_CLOSE_COLUMN)?;

    let mut points = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| SigsweepError::DataSource {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = record.get(date_idx).unwrap_or_default();
        let date = parse_date(date_str).ok_or_else(|| SigsweepError::DataSource {
            reason: format!("invalid date '{}' on row {}", date_str, line + 1),
        })?;

        let close_str = record.get(close_idx).unwrap_or_default().trim();
        if close_str.is_empty() {
            tracing::warn!(%date, "skipping row without adjusted close");
            continue;
        }
        let adj_close: f64 = close_str.parse().map_err(|e| SigsweepError::DataSource {
            reason: format!("invalid adjusted close '{}' on {}: {}", close_str, date, e),
        })?;

        points.push(PricePoint { date, adj_close });
    }
    Ok(points)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, SigsweepError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| SigsweepError::DataSource {
            reason: format!("'{}' column not found", name),
        })
}

/// `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.split([' ', 'T']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Writes the results table and the best configuration's chart into one directory.
pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(RESULTS_FILE)
    }

    pub fn chart_path(&self, strategy: &StrategyConfig) -> PathBuf {
        self.output_dir
            .join(format!("best_strategy_plot_{}.svg", strategy.name()))
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_results(&self, results: &[SweepResult]) -> Result<(), SigsweepError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.results_path();
        let mut wtr = csv::Writer::from_path(&path).map_err(csv_error)?;

        let header: Vec<&str> = PARAMETER_COLUMNS
            .iter()
            .chain(Metrics::LABELS.iter())
            .copied()
            .chain(["error"])
            .collect();
        wtr.write_record(&header).map_err(csv_error)?;

        for result in results {
            let mut row = parameter_cells(result);
            row.extend(
                result
                    .metrics
                    .entries()
                    .iter()
                    .map(|(_, value)| format!("{:.4}", value)),
            );
            row.push(result.error.clone().unwrap_or_default());
            wtr.write_record(&row).map_err(csv_error)?;
        }
        wtr.flush()?;
        tracing::info!(file = %path.display(), rows = results.len(), "results written");
        Ok(())
    }

    fn write_best_chart(&self, best: &SweepResult) -> Result<(), SigsweepError> {
        let Some(trajectory) = &best.trajectory else {
            return Ok(());
        };
        let title = format!(
            "Best Strategy: {} (Sharpe: {:.2})",
            title_case(best.config.strategy.name()),
            best.metrics.sharpe_ratio
        );
        svg_chart::write_equity_chart(&self.chart_path(&best.config.strategy), trajectory, &title)
    }
}

fn parameter_cells(result: &SweepResult) -> Vec<String> {
    let mut cells = vec![String::new(); PARAMETER_COLUMNS.len()];
    cells[0] = result.config.strategy.name().to_string();
    cells[1] = result.config.allow_shorting.to_string();
    match result.config.strategy {
        StrategyConfig::Momentum(p) => cells[2] = p.window.to_string(),
        StrategyConfig::MeanReversion(p) => {
            cells[3] = p.window.to_string();
            cells[4] = p.entry_z.to_string();
            cells[5] = p.exit_z.to_string();
        }
        StrategyConfig::SmaCrossover(p) => {
            cells[6] = p.short_window.to_string();
            cells[7] = p.long_window.to_string();
        }
    }
    cells
}

/// `sma_crossover` becomes `Sma Crossover`.
pub fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn csv_error(e: csv::Error) -> SigsweepError {
    SigsweepError::Io(std::io::Error::other(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::MetricValue;
    use crate::domain::sweep::SweepConfig;
    use tempfile::TempDir;

    const YAHOO: &str = "Date,Open,High,Low,Close,Adj Close,Volume\n\
        2024-01-17,110.0,120.0,105.0,115.0,114.5,55000\n\
        2024-01-15,100.0,110.0,90.0,105.0,104.5,50000\n\
        2024-01-16,105.0,115.0,100.0,110.0,109.5,60000\n";

    fn setup(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("SPY.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn reads_and_sorts_adjusted_closes() {
        let (_dir, path) = setup(YAHOO);
        let series = CsvAdapter::new(path).fetch_prices(None, None).unwrap();
        assert_eq!(series.dates(), vec![d(15), d(16), d(17)]);
        assert_eq!(series.closes(), vec![104.5, 109.5, 114.5]);
    }

    #[test]
    fn filters_inclusive_range() {
        let (_dir, path) = setup(YAHOO);
        let adapter = CsvAdapter::new(path);
        let series = adapter.fetch_prices(Some(d(16)), Some(d(17))).unwrap();
        assert_eq!(series.dates(), vec![d(16), d(17)]);
        let series = adapter.fetch_prices(None, Some(d(15))).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn empty_range_is_an_error() {
        let (_dir, path) = setup(YAHOO);
        let err = CsvAdapter::new(path)
            .fetch_prices(Some(d(20)), None)
            .unwrap_err();
        assert!(matches!(err, SigsweepError::DataSource { .. }));
    }

    #[test]
    fn missing_adj_close_column() {
        let (_dir, path) = setup("Date,Close\n2024-01-15,100.0\n");
        let err = CsvAdapter::new(path).fetch_prices(None, None).unwrap_err();
        assert!(matches!(err, SigsweepError::DataSource { reason } if reason.contains("Adj Close")));
    }

    #[test]
    fn missing_file() {
        let err = CsvAdapter::new(PathBuf::from("/nonexistent/prices.csv"))
            .fetch_prices(None, None)
            .unwrap_err();
        assert!(matches!(err, SigsweepError::DataSource { .. }));
    }

    #[test]
    fn skips_blank_adjusted_close() {
        let points =
            parse_prices("Date,Adj Close\n2024-01-15,100.0\n2024-01-16,\n2024-01-17,101.0\n")
                .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].date, d(17));
    }

    #[test]
    fn accepts_timestamps() {
        let points = parse_prices(
            "Date,Adj Close\n2024-01-15 00:00:00-05:00,100.0\n2024-01-16T00:00:00,101.0\n",
        )
        .unwrap();
        assert_eq!(points[0].date, d(15));
        assert_eq!(points[1].date, d(16));
    }

    #[test]
    fn rejects_bad_number() {
        let err = parse_prices("Date,Adj Close\n2024-01-15,abc\n").unwrap_err();
        assert!(matches!(err, SigsweepError::DataSource { .. }));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let (_dir, path) = setup("Date,Adj Close\n2024-01-15,100.0\n2024-01-15,101.0\n");
        let err = CsvAdapter::new(path).fetch_prices(None, None).unwrap_err();
        assert!(matches!(err, SigsweepError::UnorderedDates { .. }));
    }

    fn result(strategy: StrategyConfig, sharpe: MetricValue, error: Option<&str>) -> SweepResult {
        let mut metrics = Metrics::indeterminate();
        metrics.sharpe_ratio = sharpe;
        metrics.cagr = MetricValue::Defined(0.123456);
        SweepResult {
            config: SweepConfig {
                strategy,
                allow_shorting: true,
            },
            metrics,
            trajectory: None,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn writes_results_table() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvReportAdapter::new(dir.path().join("out"));
        let results = vec![
            result(StrategyConfig::sma_crossover(20, 50), MetricValue::Defined(1.5), None),
            result(StrategyConfig::mean_reversion(20, 1.5, 0.5), MetricValue::Infinite, None),
            result(
                StrategyConfig::momentum(500),
                MetricValue::Indeterminate,
                Some("insufficient data"),
            ),
        ];
        adapter.write_results(&results).unwrap();

        let content = fs::read_to_string(adapter.results_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("strategy_type,allow_shorting,momentum_window"));
        assert!(lines[0].contains("Annualized Sharpe Ratio"));
        assert!(lines[0].ends_with(",error"));
        assert!(lines[1].starts_with("sma_crossover,true,,,,,20,50,0.1235,1.5000,"));
        assert!(lines[2].starts_with("mean_reversion,true,,20,1.5,0.5,,,0.1235,inf,"));
        assert!(lines[3].starts_with("momentum,true,500,"));
        assert!(lines[3].ends_with("NaN,insufficient data"));
    }

    #[test]
    fn chart_path_names_strategy() {
        let adapter = CsvReportAdapter::new(PathBuf::from("results"));
        assert_eq!(
            adapter.chart_path(&StrategyConfig::momentum(20)),
            PathBuf::from("results/best_strategy_plot_momentum.svg")
        );
    }

    #[test]
    fn chart_skipped_without_trajectory() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvReportAdapter::new(dir.path().to_path_buf());
        let best = result(StrategyConfig::momentum(5), MetricValue::Defined(1.0), None);
        adapter.write_best_chart(&best).unwrap();
        assert!(!adapter.chart_path(&best.config.strategy).exists());
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("mean_reversion"), "Mean Reversion");
        assert_eq!(title_case("momentum"), "Momentum");
    }
}
