//! Trailing-window helpers shared by the windowed indicators.
//!
//! Each helper returns one entry per input value; entries before the window
//! is fully populated are `None`.

pub fn rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

fn rolling<F>(values: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                Some(f(&values[i + 1 - window..=i]))
            }
        })
        .collect()
}
