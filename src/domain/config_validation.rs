//! Configuration validation.
//!
//! Checks the `[backtest]` and `[sweep]` sections before any data is loaded,
//! so a bad config fails fast with the offending key named.

use crate::domain::error::SigsweepError;
use crate::domain::param_grid::{self, build_param_grid};
use crate::domain::sweep::{SweepConfig, SweepSettings};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const BACKTEST: &str = "backtest";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SigsweepError> {
    validate_initial_capital(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    validate_top(config)?;
    Ok(())
}

/// Builds the grid and checks every configuration in it.
pub fn validate_sweep_config(config: &dyn ConfigPort) -> Result<Vec<SweepConfig>, SigsweepError> {
    let grid = build_param_grid(config)?;
    if grid.is_empty() {
        return Err(invalid(
            param_grid::SECTION,
            "strategies",
            "parameter grid is empty".into(),
        ));
    }
    for entry in &grid {
        entry.strategy.validate().map_err(|e| {
            invalid(param_grid::SECTION, entry.strategy.name(), e.to_string())
        })?;
    }
    Ok(grid)
}

/// The same capital, rate and date-order checks for settings that did not
/// come from a config file.
pub fn validate_run_settings(
    settings: &SweepSettings,
    (start, end): (Option<NaiveDate>, Option<NaiveDate>),
) -> Result<(), SigsweepError> {
    check_initial_capital(settings.initial_capital)?;
    check_risk_free_rate(settings.risk_free_rate)?;
    check_date_order(start, end)
}

/// Optional `start_date`/`end_date` pair; a present value must parse.
pub fn parse_date_range(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), SigsweepError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;
    Ok((start, end))
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SigsweepError> {
    check_initial_capital(parse_number(config, "initial_capital")?.unwrap_or(100_000.0))
}

fn check_initial_capital(value: f64) -> Result<(), SigsweepError> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(invalid(
            BACKTEST,
            "initial_capital",
            "initial_capital must be positive".into(),
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), SigsweepError> {
    check_risk_free_rate(parse_number(config, "risk_free_rate")?.unwrap_or(0.02))
}

fn check_risk_free_rate(value: f64) -> Result<(), SigsweepError> {
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            BACKTEST,
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1".into(),
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SigsweepError> {
    let (start, end) = parse_date_range(config)?;
    check_date_order(start, end)
}

fn check_date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), SigsweepError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid(
                BACKTEST,
                "start_date",
                "start_date must be before end_date".into(),
            ));
        }
    }
    Ok(())
}

fn validate_top(config: &dyn ConfigPort) -> Result<(), SigsweepError> {
    let Some(raw) = config.get_string(BACKTEST, "top") else {
        return Ok(());
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(()),
        _ => Err(invalid(BACKTEST, "top", "top must be at least 1".into())),
    }
}

fn parse_number(config: &dyn ConfigPort, key: &str) -> Result<Option<f64>, SigsweepError> {
    config
        .get_string(BACKTEST, key)
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| invalid(BACKTEST, key, format!("'{raw}' is not a number")))
        })
        .transpose()
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, SigsweepError> {
    config
        .get_string(BACKTEST, key)
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
                invalid(
                    BACKTEST,
                    key,
                    format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            })
        })
        .transpose()
}

fn invalid(section: &str, key: &str, reason: String) -> SigsweepError {
    SigsweepError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
