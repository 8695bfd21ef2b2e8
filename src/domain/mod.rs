//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod param_grid;
pub mod price_series;
pub mod signal;
pub mod strategy;
pub mod sweep;
pub mod trajectory;
