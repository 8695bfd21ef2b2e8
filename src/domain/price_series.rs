//! Date-indexed adjusted close history.

use chrono::NaiveDate;

use super::error::SigsweepError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: f64,
}

/// Ordered, duplicate-free price history. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Dates must be strictly increasing and every close finite.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SigsweepError> {
        if points.is_empty() {
            return Err(SigsweepError::EmptyPriceSeries);
        }
        for (i, point) in points.iter().enumerate() {
            if !point.adj_close.is_finite() {
                return Err(SigsweepError::NonFinitePrice { date: point.date });
            }
            if i > 0 && point.date <= points[i - 1].date {
                return Err(SigsweepError::UnorderedDates {
                    previous: points[i - 1].date,
                    date: point.date,
                });
            }
        }
        Ok(Self { points })
    }

    pub fn from_pairs(pairs: &[(NaiveDate, f64)]) -> Result<Self, SigsweepError> {
        Self::new(
            pairs
                .iter()
                .map(|&(date, adj_close)| PricePoint { date, adj_close })
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.adj_close).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }
}
