//! Rolling mean and sample standard deviation with a minimum sample count.
//!
//! The window at i covers C[max(0, i-n+1)..=i]. A value is produced once the
//! window holds at least `min_periods` observations, so the head of the series
//! is usable before the window is full.
//! STDDEV uses the n-1 denominator and needs two observations.

pub fn rolling_mean(closes: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    rolling(closes, window, min_periods, |w| {
        Some(w.iter().sum::<f64>() / w.len() as f64)
    })
}

pub fn rolling_stddev(closes: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    rolling(closes, window, min_periods, sample_stddev)
}

/// Sample standard deviation; `None` for fewer than two values.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    Some(variance.sqrt())
}

fn rolling<F>(closes: &[f64], window: usize, min_periods: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    if window == 0 {
        return vec![None; closes.len()];
    }
    let min_periods = min_periods.clamp(1, window);
    (0..closes.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &closes[start..=i];
            if slice.len() < min_periods {
                None
            } else {
                f(slice)
            }
        })
        .collect()
}
