//! Signal generators.
//!
//! A closed set of rules, each turning a price series into one [`Signal`] per
//! date. Parameters and data length are validated when a [`Strategy`] is built,
//! before any signal is computed.

pub mod mean_reversion;
pub mod momentum;
pub mod sma_crossover;

use chrono::NaiveDate;
use std::fmt;

use super::error::SigsweepError;
use super::price_series::PriceSeries;
use super::signal::SignalSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumParams {
    pub window: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanReversionParams {
    pub window: usize,
    pub entry_z: f64,
    pub exit_z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmaCrossoverParams {
    pub short_window: usize,
    pub long_window: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyConfig {
    Momentum(MomentumParams),
    MeanReversion(MeanReversionParams),
    SmaCrossover(SmaCrossoverParams),
}

impl StrategyConfig {
    pub fn momentum(window: usize) -> Self {
        StrategyConfig::Momentum(MomentumParams { window })
    }

    pub fn mean_reversion(window: usize, entry_z: f64, exit_z: f64) -> Self {
        StrategyConfig::MeanReversion(MeanReversionParams {
            window,
            entry_z,
            exit_z,
        })
    }

    pub fn sma_crossover(short_window: usize, long_window: usize) -> Self {
        StrategyConfig::SmaCrossover(SmaCrossoverParams {
            short_window,
            long_window,
        })
    }

    /// Identifier used in config files and result tables.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::Momentum(_) => "momentum",
            StrategyConfig::MeanReversion(_) => "mean_reversion",
            StrategyConfig::SmaCrossover(_) => "sma_crossover",
        }
    }

    /// Fewest prices the rule accepts.
    pub fn minimum_length(&self) -> usize {
        match self {
            StrategyConfig::Momentum(p) => p.window + 1,
            StrategyConfig::MeanReversion(p) => p.window,
            StrategyConfig::SmaCrossover(p) => p.long_window,
        }
    }

    pub fn validate(&self) -> Result<(), SigsweepError> {
        let invalid = |reason: &str| SigsweepError::InvalidParameter {
            strategy: self.name().to_string(),
            reason: reason.to_string(),
        };
        match self {
            StrategyConfig::Momentum(p) => {
                if p.window == 0 {
                    return Err(invalid("window must be at least 1"));
                }
            }
            StrategyConfig::MeanReversion(p) => {
                if p.window == 0 {
                    return Err(invalid("window must be at least 1"));
                }
                if !p.entry_z.is_finite() || p.entry_z < 0.0 {
                    return Err(invalid("entry_z must be a non-negative number"));
                }
                if !p.exit_z.is_finite() || p.exit_z < 0.0 {
                    return Err(invalid("exit_z must be a non-negative number"));
                }
            }
            StrategyConfig::SmaCrossover(p) => {
                if p.short_window == 0 {
                    return Err(invalid("short window must be at least 1"));
                }
                if p.short_window >= p.long_window {
                    return Err(invalid("short window must be less than long window"));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyConfig::Momentum(p) => write!(f, "momentum(window={})", p.window),
            StrategyConfig::MeanReversion(p) => write!(
                f,
                "mean_reversion(window={}, entry_z={}, exit_z={})",
                p.window, p.entry_z, p.exit_z
            ),
            StrategyConfig::SmaCrossover(p) => write!(
                f,
                "sma_crossover(short={}, long={})",
                p.short_window, p.long_window
            ),
        }
    }
}

/// A validated rule bound to its own copy of the price history.
#[derive(Debug, Clone)]
pub struct Strategy {
    config: StrategyConfig,
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
}

impl Strategy {
    pub fn new(config: StrategyConfig, prices: &PriceSeries) -> Result<Self, SigsweepError> {
        if prices.is_empty() {
            return Err(SigsweepError::EmptyPriceSeries);
        }
        config.validate()?;
        let minimum = config.minimum_length();
        if prices.len() < minimum {
            return Err(SigsweepError::InsufficientData {
                strategy: config.name().to_string(),
                bars: prices.len(),
                minimum,
            });
        }
        Ok(Self {
            config,
            dates: prices.dates(),
            closes: prices.closes(),
        })
    }

    pub fn generate_signals(&self) -> SignalSeries {
        let signals = match &self.config {
            StrategyConfig::Momentum(p) => momentum::momentum_signals(&self.closes, p),
            StrategyConfig::MeanReversion(p) => {
                mean_reversion::mean_reversion_signals(&self.closes, p)
            }
            StrategyConfig::SmaCrossover(p) => {
                sma_crossover::sma_crossover_signals(&self.closes, p)
            }
        };
        tracing::debug!(strategy = %self.config, dates = signals.len(), "signals generated");
        SignalSeries::new(&self.dates, &signals)
    }
}

/// Validate `config` against `prices` and produce its signal sequence.
pub fn generate_signals(
    config: &StrategyConfig,
    prices: &PriceSeries,
) -> Result<SignalSeries, SigsweepError> {
    Ok(Strategy::new(*config, prices)?.generate_signals())
}
