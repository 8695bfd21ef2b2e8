//! Parameter grid built from the `[sweep]` config section.
//!
//! The grid is always supplied by the caller; there is no built-in default.
//! Per strategy the cartesian product iterates `allow_shorting` outermost,
//! then the strategy's parameters in declaration order. Crossover pairs with
//! short >= long are dropped.

use std::fmt;
use std::str::FromStr;

use super::error::SigsweepError;
use super::strategy::StrategyConfig;
use super::sweep::SweepConfig;
use crate::ports::config_port::{ConfigPort, parse_bool};

pub const SECTION: &str = "sweep";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Momentum,
    MeanReversion,
    SmaCrossover,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "momentum" => Ok(StrategyKind::Momentum),
            "mean_reversion" => Ok(StrategyKind::MeanReversion),
            "sma_crossover" => Ok(StrategyKind::SmaCrossover),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Momentum => "momentum",
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::SmaCrossover => "sma_crossover",
        };
        write!(f, "{name}")
    }
}

pub fn build_param_grid(config: &dyn ConfigPort) -> Result<Vec<SweepConfig>, SigsweepError> {
    let kinds: Vec<StrategyKind> = required_list(config, "strategies")?;
    let shorting: Vec<bool> = match config.get_list(SECTION, "allow_shorting") {
        Some(items) => parse_items(&items, "allow_shorting", |s| {
            parse_bool(s).ok_or_else(|| "expected true or false".to_string())
        })?,
        None => vec![false],
    };

    let mut grid = Vec::new();
    for kind in kinds {
        let strategies = strategies_for(config, kind)?;
        for &allow_shorting in &shorting {
            grid.extend(strategies.iter().map(|&strategy| SweepConfig {
                strategy,
                allow_shorting,
            }));
        }
    }
    Ok(grid)
}

fn strategies_for(
    config: &dyn ConfigPort,
    kind: StrategyKind,
) -> Result<Vec<StrategyConfig>, SigsweepError> {
    let mut out = Vec::new();
    match kind {
        StrategyKind::Momentum => {
            for window in required_list::<usize>(config, "momentum_window")? {
                out.push(StrategyConfig::momentum(window));
            }
        }
        StrategyKind::MeanReversion => {
            let windows: Vec<usize> = required_list(config, "mean_reversion_window")?;
            let entries: Vec<f64> = required_list(config, "mean_reversion_entry_z")?;
            let exits: Vec<f64> = required_list(config, "mean_reversion_exit_z")?;
            for &window in &windows {
                for &entry_z in &entries {
                    for &exit_z in &exits {
                        out.push(StrategyConfig::mean_reversion(window, entry_z, exit_z));
                    }
                }
            }
        }
        StrategyKind::SmaCrossover => {
            let shorts: Vec<usize> = required_list(config, "sma_short_window")?;
            let longs: Vec<usize> = required_list(config, "sma_long_window")?;
            for &short in &shorts {
                for &long in longs.iter().filter(|&&long| short < long) {
                    out.push(StrategyConfig::sma_crossover(short, long));
                }
            }
        }
    }
    Ok(out)
}

fn required_list<T>(config: &dyn ConfigPort, key: &str) -> Result<Vec<T>, SigsweepError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let items = config
        .get_list(SECTION, key)
        .ok_or_else(|| SigsweepError::ConfigMissing {
            section: SECTION.into(),
            key: key.into(),
        })?;
    parse_items(&items, key, |s| s.parse::<T>().map_err(|e| e.to_string()))
}

fn parse_items<T, F>(items: &[String], key: &str, parse: F) -> Result<Vec<T>, SigsweepError>
where
    F: Fn(&str) -> Result<T, String>,
{
    if items.is_empty() {
        return Err(SigsweepError::ConfigInvalid {
            section: SECTION.into(),
            key: key.into(),
            reason: "list is empty".into(),
        });
    }
    items
        .iter()
        .map(|item| {
            parse(item).map_err(|reason| SigsweepError::ConfigInvalid {
                section: SECTION.into(),
                key: key.into(),
                reason: format!("'{item}': {reason}"),
            })
        })
        .collect()
}
