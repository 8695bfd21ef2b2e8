//! Report output port trait.

use crate::domain::error::SigsweepError;
use crate::domain::sweep::SweepResult;

/// Port for persisting sweep results.
pub trait ReportPort {
    /// One row per result, in the order given.
    fn write_results(&self, results: &[SweepResult]) -> Result<(), SigsweepError>;

    /// Equity chart of the winning configuration; a result without a
    /// trajectory writes nothing.
    fn write_best_chart(&self, best: &SweepResult) -> Result<(), SigsweepError>;
}
