//! Price history source port trait.

use crate::domain::error::SigsweepError;
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Adjusted closes inside the inclusive date range; `None` leaves that side open.
    fn fetch_prices(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, SigsweepError>;
}
