//! Simple moving average with full-window validity.
//!
//! SMA(n)[i] = sum(C[i-n+1..=i]) / n
//! Warmup: first (n-1) values undefined.

pub fn simple_moving_average(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }
    (0..closes.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &closes[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}
