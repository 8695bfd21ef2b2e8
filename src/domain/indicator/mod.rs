//! Rolling-window indicators over a close series.
//!
//! Every function returns one entry per input value; `None` marks a position
//! where the indicator is not computable (warm-up or degenerate window).

pub mod roc;
pub mod sma;
pub mod stddev;

/// Shift `values` forward by `periods`, filling the head with `None`.
pub fn lag<T: Copy>(values: &[Option<T>], periods: usize) -> Vec<Option<T>> {
    (0..values.len())
        .map(|i| if i >= periods { values[i - periods] } else { None })
        .collect()
}
