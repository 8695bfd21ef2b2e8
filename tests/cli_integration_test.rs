//! CLI-level tests: config loading, grid building and the sweep pipeline
//! against real files in temporary directories.

mod common;

use clap::Parser;
use common::*;
use sigsweep::adapters::csv_adapter::{CsvAdapter, CsvReportAdapter, RESULTS_FILE};
use sigsweep::adapters::file_config_adapter::FileConfigAdapter;
use sigsweep::cli::{self, Cli};
use sigsweep::domain::config_validation::{validate_backtest_config, validate_sweep_config};
use sigsweep::domain::error::SigsweepError;
use sigsweep::domain::metrics::MetricValue;
use sigsweep::domain::strategy::StrategyConfig;
use sigsweep::domain::sweep::{SweepConfig, SweepSettings};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn sweep_ini(data_path: &Path, output_dir: &Path) -> String {
    format!(
        r#"
[backtest]
data_path = {}
initial_capital = 100000.0
risk_free_rate = 0.02
output_dir = {}
top = 3

[sweep]
strategies = momentum, mean_reversion, sma_crossover
allow_shorting = false, true
momentum_window = 10, 20
mean_reversion_window = 20
mean_reversion_entry_z = 1.0, 1.5
mean_reversion_exit_z = 0.5
sma_short_window = 5, 40
sma_long_window = 20, 40
"#,
        data_path.display(),
        output_dir.display()
    )
}

fn is_success(code: ExitCode) -> bool {
    format!("{:?}", code) == format!("{:?}", ExitCode::SUCCESS)
}

mod config_loading {
    use super::*;

    #[test]
    fn loads_and_validates_full_config() {
        let file = write_temp_ini(&sweep_ini(Path::new("prices.csv"), Path::new("out")));
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        validate_backtest_config(&adapter).unwrap();
        let grid = validate_sweep_config(&adapter).unwrap();
        // per shorting flag: 2 momentum + 2 mean reversion + 2 crossover (5/20, 5/40)
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.iter().filter(|c| c.allow_shorting).count(), 6);
    }

    #[test]
    fn settings_come_from_backtest_section() {
        let file = write_temp_ini(&sweep_ini(Path::new("prices.csv"), Path::new("out")));
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let settings = cli::build_run_settings(&adapter, None, None, None).unwrap();
        assert_eq!(settings.data_path, PathBuf::from("prices.csv"));
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert_eq!(settings.top, 3);
        assert_eq!(settings.sweep.risk_free_rate, 0.02);
    }

    #[test]
    fn missing_config_file() {
        let err = FileConfigAdapter::from_file("/nonexistent/sweep.ini").unwrap_err();
        assert!(matches!(err, SigsweepError::ConfigParse { .. }));
    }
}

mod pipeline {
    use super::*;

    fn settings(top: usize) -> cli::RunSettings {
        cli::RunSettings {
            data_path: PathBuf::from("unused.csv"),
            start_date: None,
            end_date: None,
            output_dir: PathBuf::from("unused"),
            top,
            sweep: SweepSettings {
                initial_capital: 50_000.0,
                risk_free_rate: 0.0,
            },
        }
    }

    fn grid() -> Vec<SweepConfig> {
        [
            StrategyConfig::momentum(5),
            StrategyConfig::mean_reversion(10, 1.0, 0.0),
            StrategyConfig::sma_crossover(5, 20),
            StrategyConfig::sma_crossover(50, 500),
        ]
        .into_iter()
        .map(|strategy| SweepConfig {
            strategy,
            allow_shorting: true,
        })
        .collect()
    }

    #[test]
    fn ranks_and_reports_results() {
        let data = MockDataPort::new(&wavy_closes(200));
        let report = RecordingReportPort::default();
        let results = cli::run_sweep_pipeline(&data, &report, &grid(), &settings(2)).unwrap();

        assert_eq!(results.len(), 4);
        let rows = report.rows.borrow();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.last().unwrap().config.strategy, StrategyConfig::sma_crossover(50, 500));
        assert_eq!(rows.last().unwrap().metrics.sharpe_ratio, MetricValue::Indeterminate);

        let charts = report.charts.borrow();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0], results[0].config.to_string());
    }

    #[test]
    fn data_errors_abort_the_sweep() {
        let data = MockDataPort::failing("feed offline");
        let report = RecordingReportPort::default();
        let err = cli::run_sweep_pipeline(&data, &report, &grid(), &settings(5)).unwrap_err();
        assert!(matches!(err, SigsweepError::DataSource { reason } if reason == "feed offline"));
        assert!(report.rows.borrow().is_empty());
    }

    #[test]
    fn no_successful_run_writes_no_chart() {
        let data = MockDataPort::new(&wavy_closes(30));
        let report = RecordingReportPort::default();
        let only_failing = vec![SweepConfig {
            strategy: StrategyConfig::momentum(100),
            allow_shorting: false,
        }];
        cli::run_sweep_pipeline(&data, &report, &only_failing, &settings(5)).unwrap();
        assert_eq!(report.rows.borrow().len(), 1);
        assert!(report.charts.borrow().is_empty());
    }

    #[test]
    fn date_filter_is_applied() {
        let data = MockDataPort::new(&wavy_closes(120));
        let report = RecordingReportPort::default();
        let mut s = settings(1);
        s.start_date = Some(day(20));
        s.end_date = Some(day(99));
        let results = cli::run_sweep_pipeline(&data, &report, &grid()[..1], &s).unwrap();
        let trajectory = results[0].trajectory.as_ref().unwrap();
        assert_eq!(trajectory.points.first().unwrap().date, day(20));
        assert_eq!(trajectory.points.last().unwrap().date, day(99));
    }

    #[test]
    fn single_run_returns_metrics() {
        let data = MockDataPort::new(&[100.0, 102.0, 101.0, 105.0, 110.0]);
        let config = SweepConfig {
            strategy: StrategyConfig::momentum(2),
            allow_shorting: false,
        };
        let settings = SweepSettings {
            initial_capital: 10_000.0,
            risk_free_rate: 0.0,
        };
        let metrics = cli::run_single(&data, &config, &settings, (None, None), None).unwrap();
        assert_eq!(metrics.total_trades, MetricValue::Defined(1.0));
    }

    #[test]
    fn single_run_propagates_validation_errors() {
        let data = MockDataPort::new(&[100.0, 101.0]);
        let config = SweepConfig {
            strategy: StrategyConfig::sma_crossover(20, 50),
            allow_shorting: false,
        };
        let settings = SweepSettings {
            initial_capital: 10_000.0,
            risk_free_rate: 0.0,
        };
        let err = cli::run_single(&data, &config, &settings, (None, None), None).unwrap_err();
        assert!(matches!(err, SigsweepError::InsufficientData { .. }));
    }

    #[test]
    fn single_run_rejects_bad_settings_before_loading() {
        let data = MockDataPort::failing("must not be read");
        let config = SweepConfig {
            strategy: StrategyConfig::momentum(2),
            allow_shorting: false,
        };
        let negative_capital = SweepSettings {
            initial_capital: -1_000.0,
            risk_free_rate: 0.02,
        };
        let err =
            cli::run_single(&data, &config, &negative_capital, (None, None), None).unwrap_err();
        assert!(
            matches!(err, SigsweepError::ConfigInvalid { key, .. } if key == "initial_capital")
        );

        let settings = SweepSettings {
            initial_capital: 10_000.0,
            risk_free_rate: 0.02,
        };
        let err = cli::run_single(
            &data,
            &config,
            &settings,
            (Some(date(2024, 1, 1)), Some(date(2023, 1, 1))),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SigsweepError::ConfigInvalid { key, .. } if key == "start_date"));
    }
}

mod end_to_end {
    use super::*;

    #[test]
    fn sweep_command_writes_results_and_chart() {
        let dir = tempfile::TempDir::new().unwrap();
        let data_path = dir.path().join("prices.csv");
        fs::write(&data_path, price_csv(&wavy_closes(300))).unwrap();
        let output_dir = dir.path().join("results");
        let ini = write_temp_ini(&sweep_ini(&data_path, &output_dir));

        let cli = Cli::try_parse_from([
            "sigsweep",
            "sweep",
            "--config",
            ini.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(is_success(cli::run(cli)));

        let results = fs::read_to_string(output_dir.join(RESULTS_FILE)).unwrap();
        // header + 12 configurations
        assert_eq!(results.lines().count(), 13);
        let charts: Vec<_> = fs::read_dir(&output_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("best_strategy_plot_") && name.ends_with(".svg"))
            .collect();
        assert_eq!(charts.len(), 1);
    }

    #[test]
    fn csv_adapters_round_through_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let data_path = dir.path().join("prices.csv");
        fs::write(&data_path, price_csv(&wavy_closes(150))).unwrap();

        let data = CsvAdapter::new(data_path);
        let report = CsvReportAdapter::new(dir.path().join("out"));
        let settings = cli::RunSettings {
            data_path: PathBuf::new(),
            start_date: Some(day(10)),
            end_date: None,
            output_dir: dir.path().join("out"),
            top: 5,
            sweep: SweepSettings {
                initial_capital: 100_000.0,
                risk_free_rate: 0.02,
            },
        };
        let grid = vec![SweepConfig {
            strategy: StrategyConfig::sma_crossover(5, 20),
            allow_shorting: false,
        }];
        let results = cli::run_sweep_pipeline(&data, &report, &grid, &settings).unwrap();
        assert_eq!(results.len(), 1);
        assert!(report.results_path().exists());
        assert!(report.chart_path(&grid[0].strategy).exists());
    }

    #[test]
    fn validate_command_rejects_bad_grid() {
        let ini = write_temp_ini(
            "[backtest]\ndata_path = x.csv\n\n[sweep]\nstrategies = momentum\nmomentum_window = 0\n",
        );
        let cli = Cli::try_parse_from([
            "sigsweep",
            "validate",
            "--config",
            ini.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(!is_success(cli::run(cli)));
    }

    #[test]
    fn validate_command_accepts_good_config() {
        let ini = write_temp_ini(&sweep_ini(Path::new("x.csv"), Path::new("out")));
        let cli = Cli::try_parse_from([
            "sigsweep",
            "validate",
            "--config",
            ini.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(is_success(cli::run(cli)));
    }

    #[test]
    fn run_command_with_chart() {
        let dir = tempfile::TempDir::new().unwrap();
        let data_path = dir.path().join("prices.csv");
        fs::write(&data_path, price_csv(&wavy_closes(120))).unwrap();
        let chart = dir.path().join("chart.svg");

        let cli = Cli::try_parse_from([
            "sigsweep",
            "run",
            "--data",
            data_path.to_str().unwrap(),
            "--strategy",
            "sma-crossover",
            "--short-window",
            "5",
            "--long-window",
            "30",
            "--allow-shorting",
            "--chart",
            chart.to_str().unwrap(),
        ])
        .unwrap();
        assert!(is_success(cli::run(cli)));
        assert!(fs::read_to_string(chart).unwrap().contains("<polyline"));
    }

    #[test]
    fn run_command_rejects_negative_capital() {
        let dir = tempfile::TempDir::new().unwrap();
        let data_path = dir.path().join("prices.csv");
        fs::write(&data_path, price_csv(&wavy_closes(60))).unwrap();

        let cli = Cli::try_parse_from([
            "sigsweep",
            "run",
            "--data",
            data_path.to_str().unwrap(),
            "--strategy",
            "momentum",
            "--initial-capital=-1000",
        ])
        .unwrap();
        assert_eq!(format!("{:?}", cli::run(cli)), format!("{:?}", ExitCode::from(2)));
    }
}
