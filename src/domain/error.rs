//! Domain error types.
//!
//! Validation variants are configuration errors raised before any numeric work
//! happens. Indeterminate statistics are never errors; see [`crate::domain::metrics`].

/// Top-level error type for sigsweep.
#[derive(Debug, thiserror::Error)]
pub enum SigsweepError {
    #[error("price series is empty")]
    EmptyPriceSeries,

    #[error("price series dates must be strictly increasing: {date} follows {previous}")]
    UnorderedDates {
        previous: chrono::NaiveDate,
        date: chrono::NaiveDate,
    },

    #[error("non-finite adjusted close on {date}")]
    NonFinitePrice { date: chrono::NaiveDate },

    #[error("insufficient data for {strategy}: have {bars} prices, need {minimum}")]
    InsufficientData {
        strategy: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid {strategy} parameters: {reason}")]
    InvalidParameter { strategy: String, reason: String },

    #[error("signal sequence is empty")]
    EmptySignals,

    #[error("prices and signals have no dates in common")]
    NoOverlap,

    #[error("simulation produced no valid strategy returns")]
    NoValidReturns,

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigsweepError {
    /// True for errors a sweep converts into an all-indeterminate result.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SigsweepError::EmptyPriceSeries
                | SigsweepError::UnorderedDates { .. }
                | SigsweepError::NonFinitePrice { .. }
                | SigsweepError::InsufficientData { .. }
                | SigsweepError::InvalidParameter { .. }
                | SigsweepError::EmptySignals
                | SigsweepError::NoOverlap
                | SigsweepError::NoValidReturns
        )
    }
}

impl From<&SigsweepError> for std::process::ExitCode {
    fn from(err: &SigsweepError) -> Self {
        let code: u8 = match err {
            SigsweepError::Io(_) => 1,
            SigsweepError::ConfigParse { .. }
            | SigsweepError::ConfigMissing { .. }
            | SigsweepError::ConfigInvalid { .. } => 2,
            SigsweepError::DataSource { .. } => 3,
            _ => 4,
        };
        std::process::ExitCode::from(code)
    }
}
