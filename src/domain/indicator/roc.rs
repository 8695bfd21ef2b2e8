//! Fractional rate of change.
//!
//! ROC(n)[i] = C[i] / C[i-n] - 1
//! Warmup: first n values undefined. A zero base or non-finite result is undefined.

pub fn percent_change(closes: &[f64], periods: usize) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|i| {
            if periods == 0 || i < periods {
                return None;
            }
            let base = closes[i - periods];
            if base == 0.0 {
                return None;
            }
            let change = closes[i] / base - 1.0;
            change.is_finite().then_some(change)
        })
        .collect()
}
