//! Numeric helpers shared by aggregators and resamplers
//!
//! All functions return `None` for inputs where the statistic is undefined
//! instead of producing NaN.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; the average of the two middle elements for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population variance (divides by N).
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let squared: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some(squared / values.len() as f64)
}

/// Sample variance (divides by N - 1); undefined below two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let squared: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some(squared / (values.len() - 1) as f64)
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
